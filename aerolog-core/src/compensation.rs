//! Vendor fixed-point compensation
//!
//! Pure functions turning raw ADC values and calibration constants into
//! temperature, pressure, and humidity. The arithmetic is bit-for-bit the
//! Bosch reference algorithm: temperature and humidity in signed 32-bit,
//! pressure in signed 64-bit, arithmetic right shifts on signed values,
//! truncating division, and wraparound instead of promotion. Sized-integer
//! behavior is load-bearing; anything wider silently diverges from the
//! reference outputs.
//!
//! Stage ordering is enforced by construction: [`compensate_temperature`]
//! is the only producer of [`FineTemp`], and the pressure and humidity
//! stages take it by value, so they cannot run without the temperature
//! stage having run first.
//!
//! There is no error path. The engine is total over its input domain; the
//! only conditional branches are the pressure zero-guard and the humidity
//! clamp, both part of the reference algorithm.

use crate::calibration::CalibrationCoefficients;
use crate::measurement::RawSample;

/// Humidity clamp bound, 100 %RH in pre-shift fixed point (102400 << 12)
const HUMIDITY_CLAMP_MAX: i32 = 419_430_400;

/// Intermediate "fine temperature" produced by the temperature stage
///
/// Consumed by the pressure and humidity formulas; never persisted. There
/// is no way to construct one except by running the temperature stage, so
/// the downstream stages cannot be called without it:
///
/// ```compile_fail
/// use aerolog_core::compensation::compensate_pressure;
/// # let calib = unimplemented!();
/// // a bare i32 is not a fine temperature
/// compensate_pressure(415_148, 128_422i32, &calib);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FineTemp(i32);

impl FineTemp {
    /// Raw fine-temperature value
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Compensated outputs in the reference fixed-point encodings
///
/// Conversions to physical units happen at the edge so the persisted floats
/// are exactly the reference divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compensated {
    /// Temperature in centi-degrees Celsius
    pub temperature_centi: i32,
    /// Pressure in pascal, Q24.8 (value is Pa * 256)
    pub pressure_q24_8: u32,
    /// Relative humidity in percent, Q22.10 (value is %RH * 1024)
    pub humidity_q22_10: u32,
}

impl Compensated {
    /// Temperature in degrees Celsius
    pub fn temperature_c(&self) -> f64 {
        f64::from(self.temperature_centi) / 100.0
    }

    /// Pressure in hectopascal
    pub fn pressure_hpa(&self) -> f64 {
        f64::from(self.pressure_q24_8) / 256.0 / 100.0
    }

    /// Relative humidity in percent
    pub fn humidity_pct(&self) -> f64 {
        f64::from(self.humidity_q22_10) / 1024.0
    }
}

/// Temperature stage
///
/// `raw` is the 20-bit ADC value. Returns the fine temperature consumed by
/// the other two stages and the temperature in centi-degrees Celsius.
pub fn compensate_temperature(raw: u32, calib: &CalibrationCoefficients) -> (FineTemp, i32) {
    let raw = raw as i32;
    let t1 = i32::from(calib.t1);
    let t2 = i32::from(calib.t2);
    let t3 = i32::from(calib.t3);

    let var1 = (raw >> 3).wrapping_sub(t1 << 1).wrapping_mul(t2) >> 11;
    let d = (raw >> 4).wrapping_sub(t1);
    let var2 = (d.wrapping_mul(d) >> 12).wrapping_mul(t3) >> 14;

    let t_fine = var1.wrapping_add(var2);
    let centi = t_fine.wrapping_mul(5).wrapping_add(128) >> 8;
    (FineTemp(t_fine), centi)
}

/// Pressure stage
///
/// `raw` is the 20-bit ADC value. Returns pressure in Pa * 256. When the
/// intermediate denominator collapses to zero the stage returns 0 - a
/// documented degenerate case, not an error; it never divides.
pub fn compensate_pressure(raw: u32, t_fine: FineTemp, calib: &CalibrationCoefficients) -> u32 {
    let p1 = i64::from(calib.p1);
    let p2 = i64::from(calib.p2);
    let p3 = i64::from(calib.p3);
    let p4 = i64::from(calib.p4);
    let p5 = i64::from(calib.p5);
    let p6 = i64::from(calib.p6);
    let p7 = i64::from(calib.p7);
    let p8 = i64::from(calib.p8);
    let p9 = i64::from(calib.p9);

    let mut var1 = i64::from(t_fine.0) - 128_000;
    let mut var2 = var1.wrapping_mul(var1).wrapping_mul(p6);
    var2 = var2.wrapping_add(var1.wrapping_mul(p5).wrapping_shl(17));
    var2 = var2.wrapping_add(p4 << 35);
    var1 = (var1.wrapping_mul(var1).wrapping_mul(p3) >> 8)
        .wrapping_add(var1.wrapping_mul(p2).wrapping_shl(12));
    var1 = (1i64 << 47).wrapping_add(var1).wrapping_mul(p1) >> 33;

    if var1 == 0 {
        return 0;
    }

    let mut p = 1_048_576 - i64::from(raw);
    p = p
        .wrapping_shl(31)
        .wrapping_sub(var2)
        .wrapping_mul(3125)
        .wrapping_div(var1);
    var1 = p9.wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
    var2 = p8.wrapping_mul(p) >> 19;
    p = (p.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add(p7 << 4);
    p as u32
}

/// Humidity stage
///
/// `raw` is the 16-bit ADC value. Returns relative humidity in %RH * 1024.
/// The clamp to `[0, 419430400]` applies before the final shift, capping the
/// reported value at 100 %RH.
pub fn compensate_humidity(raw: u16, t_fine: FineTemp, calib: &CalibrationCoefficients) -> u32 {
    let raw = i32::from(raw);
    let h1 = i32::from(calib.h1);
    let h2 = i32::from(calib.h2);
    let h3 = i32::from(calib.h3);
    let h4 = i32::from(calib.h4);
    let h5 = i32::from(calib.h5);
    let h6 = i32::from(calib.h6);

    let h = t_fine.0.wrapping_sub(76_800);
    let a = (raw << 14)
        .wrapping_sub(h4.wrapping_shl(20))
        .wrapping_sub(h5.wrapping_mul(h))
        .wrapping_add(16_384)
        >> 15;
    let b = ((h.wrapping_mul(h6) >> 10)
        .wrapping_mul((h.wrapping_mul(h3) >> 11).wrapping_add(32_768))
        >> 10)
        .wrapping_add(2_097_152)
        .wrapping_mul(h2)
        .wrapping_add(8_192)
        >> 14;
    let h = a.wrapping_mul(b);
    let h = h.wrapping_sub(((h >> 15).wrapping_mul(h >> 15) >> 7).wrapping_mul(h1) >> 4);

    let h = h.clamp(0, HUMIDITY_CLAMP_MAX);
    (h >> 12) as u32
}

/// Run all three stages on one raw sample, temperature first
pub fn compensate(sample: &RawSample, calib: &CalibrationCoefficients) -> Compensated {
    let (t_fine, temperature_centi) = compensate_temperature(sample.temperature, calib);
    Compensated {
        temperature_centi,
        pressure_q24_8: compensate_pressure(sample.pressure, t_fine, calib),
        humidity_q22_10: compensate_humidity(sample.humidity, t_fine, calib),
    }
}
