//! Raw samples and persisted readings
//!
//! A [`RawSample`] is transient: it exists only within one acquisition cycle,
//! unpacked from the single 8-byte block read at 0xF7. The slicing boundary
//! inside that block is fixed by the sensor: pressure first (3 bytes), then
//! temperature (3 bytes), then humidity (2 bytes).

use crate::registers::DATA_LEN;
use crate::time::Timestamp;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unpacked ADC values from one measurement block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// 20-bit raw pressure
    pub pressure: u32,
    /// 20-bit raw temperature
    pub temperature: u32,
    /// 16-bit raw humidity
    pub humidity: u16,
}

impl RawSample {
    /// Unpack the 8-byte measurement block
    ///
    /// 20-bit channels assemble as `(msb << 12) | (lsb << 4) | (xlsb >> 4)`,
    /// the 16-bit humidity as `(msb << 8) | lsb`.
    pub fn from_block(block: &[u8; DATA_LEN]) -> Self {
        Self {
            pressure: ((block[0] as u32) << 12) | ((block[1] as u32) << 4) | ((block[2] as u32) >> 4),
            temperature: ((block[3] as u32) << 12)
                | ((block[4] as u32) << 4)
                | ((block[5] as u32) >> 4),
            humidity: ((block[6] as u16) << 8) | block[7] as u16,
        }
    }
}

/// One timestamped, compensated reading - the tuple handed to the
/// persistence sink
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Temperature in degrees Celsius
    pub temperature_c: f64,
    /// Relative humidity in percent
    pub humidity_pct: f64,
    /// Pressure in hectopascal
    pub pressure_hpa: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_fixed_slicing_boundaries() {
        let block = [0x5A, 0x5A, 0x00, 0x80, 0x00, 0x00, 0x80, 0x00];
        let raw = RawSample::from_block(&block);
        assert_eq!(raw.pressure, 0x5A5A0);
        assert_eq!(raw.temperature, 0x80000);
        assert_eq!(raw.humidity, 0x8000);
    }

    #[test]
    fn xlsb_contributes_high_nibble_only() {
        let block = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let raw = RawSample::from_block(&block);
        assert_eq!(raw.pressure, 0xFFFFF);
        assert_eq!(raw.temperature, 0xFFFFF);
        assert_eq!(raw.humidity, 0xFFFF);
    }
}
