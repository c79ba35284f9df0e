//! Factory calibration constants
//!
//! Every BME280 carries unit-specific trimming values programmed at the
//! factory. They live in two register blocks (26 bytes at 0x88, 16 bytes at
//! 0xE1) and are read exactly once per power-on; the compensation formulas
//! apply them to every raw measurement afterwards.
//!
//! The humidity constants straddle the two blocks: H1 sits at the tail of
//! the first block (register 0xA1), the rest in the second, with H4 and H5
//! sharing the two nibbles of register 0xE5. All 42 calibration bytes come
//! from the two block reads; nothing is re-read byte-wise.

use crate::bus::SensorBus;
use crate::errors::DeviceError;
use crate::registers::{CALIB00_LEN, CALIB26_LEN, REG_CALIB00, REG_CALIB26};

/// Trimming values, parsed once and immutable for the device's operating
/// lifetime (reloaded only after a sensor reset)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationCoefficients {
    /// Temperature trimming, dig_T1
    pub t1: u16,
    /// Temperature trimming, dig_T2
    pub t2: i16,
    /// Temperature trimming, dig_T3
    pub t3: i16,
    /// Pressure trimming, dig_P1
    pub p1: u16,
    /// Pressure trimming, dig_P2
    pub p2: i16,
    /// Pressure trimming, dig_P3
    pub p3: i16,
    /// Pressure trimming, dig_P4
    pub p4: i16,
    /// Pressure trimming, dig_P5
    pub p5: i16,
    /// Pressure trimming, dig_P6
    pub p6: i16,
    /// Pressure trimming, dig_P7
    pub p7: i16,
    /// Pressure trimming, dig_P8
    pub p8: i16,
    /// Pressure trimming, dig_P9
    pub p9: i16,
    /// Humidity trimming, dig_H1
    pub h1: u8,
    /// Humidity trimming, dig_H2
    pub h2: i16,
    /// Humidity trimming, dig_H3
    pub h3: u8,
    /// Humidity trimming, dig_H4 (12-bit, nibble-packed with H5)
    pub h4: i16,
    /// Humidity trimming, dig_H5 (12-bit, nibble-packed with H4)
    pub h5: i16,
    /// Humidity trimming, dig_H6
    pub h6: i8,
}

impl CalibrationCoefficients {
    /// Assemble coefficients from the two raw register blocks
    ///
    /// 16-bit constants are little-endian in the register file and
    /// reinterpreted as signed or unsigned per the datasheet table. The
    /// 12-bit H4/H5 pair splits the shared byte 0xE5:
    /// `H4 = (0xE4 << 4) | low nibble`, `H5 = (0xE6 << 4) | high nibble`.
    pub fn from_blocks(block1: &[u8; CALIB00_LEN], block2: &[u8; CALIB26_LEN]) -> Self {
        Self {
            t1: u16::from_le_bytes([block1[0], block1[1]]),
            t2: i16::from_le_bytes([block1[2], block1[3]]),
            t3: i16::from_le_bytes([block1[4], block1[5]]),
            p1: u16::from_le_bytes([block1[6], block1[7]]),
            p2: i16::from_le_bytes([block1[8], block1[9]]),
            p3: i16::from_le_bytes([block1[10], block1[11]]),
            p4: i16::from_le_bytes([block1[12], block1[13]]),
            p5: i16::from_le_bytes([block1[14], block1[15]]),
            p6: i16::from_le_bytes([block1[16], block1[17]]),
            p7: i16::from_le_bytes([block1[18], block1[19]]),
            p8: i16::from_le_bytes([block1[20], block1[21]]),
            p9: i16::from_le_bytes([block1[22], block1[23]]),
            h1: block1[25],
            h2: i16::from_le_bytes([block2[0], block2[1]]),
            h3: block2[2],
            h4: ((block2[3] as i16) << 4) | (block2[4] & 0x0F) as i16,
            h5: ((block2[5] as i16) << 4) | ((block2[4] >> 4) & 0x0F) as i16,
            h6: block2[6] as i8,
        }
    }

    /// Load calibration from the sensor: exactly two block reads
    ///
    /// A short read of either block is fatal at startup
    /// ([`DeviceError::CalibrationShortRead`]).
    pub fn read_from<B: SensorBus>(bus: &mut B) -> Result<Self, DeviceError> {
        let mut block1 = [0u8; CALIB00_LEN];
        let got = bus.read_block(REG_CALIB00, &mut block1)?;
        if got != CALIB00_LEN {
            return Err(DeviceError::CalibrationShortRead {
                register: REG_CALIB00,
                expected: CALIB00_LEN,
                got,
            });
        }

        let mut block2 = [0u8; CALIB26_LEN];
        let got = bus.read_block(REG_CALIB26, &mut block2)?;
        if got != CALIB26_LEN {
            return Err(DeviceError::CalibrationShortRead {
                register: REG_CALIB26,
                expected: CALIB26_LEN,
                got,
            });
        }

        Ok(Self::from_blocks(&block1, &block2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::sim::{SimBus, REFERENCE_CALIB_BLOCK1, REFERENCE_CALIB_BLOCK2};
    use crate::errors::BusError;

    #[test]
    fn parses_reference_blocks() {
        let calib =
            CalibrationCoefficients::from_blocks(&REFERENCE_CALIB_BLOCK1, &REFERENCE_CALIB_BLOCK2);
        assert_eq!(calib.t1, 27504);
        assert_eq!(calib.t2, 26435);
        assert_eq!(calib.t3, -1000);
        assert_eq!(calib.p1, 36477);
        assert_eq!(calib.p2, -10685);
        assert_eq!(calib.p3, 3024);
        assert_eq!(calib.p4, 2855);
        assert_eq!(calib.p5, 140);
        assert_eq!(calib.p6, -7);
        assert_eq!(calib.p7, 15500);
        assert_eq!(calib.p8, -14600);
        assert_eq!(calib.p9, 6000);
        assert_eq!(calib.h1, 75);
        assert_eq!(calib.h2, 355);
        assert_eq!(calib.h3, 0);
        assert_eq!(calib.h4, 333);
        assert_eq!(calib.h5, 50);
        assert_eq!(calib.h6, 30);
    }

    #[test]
    fn negative_sixteen_bit_constants_reinterpret() {
        let mut block1 = REFERENCE_CALIB_BLOCK1;
        // T2 = 0x8001 -> -32767 when reinterpreted as signed
        block1[2] = 0x01;
        block1[3] = 0x80;
        let calib = CalibrationCoefficients::from_blocks(&block1, &REFERENCE_CALIB_BLOCK2);
        assert_eq!(calib.t2, -32767);
        // T1 stays unsigned
        assert_eq!(calib.t1, 27504);
    }

    #[test]
    fn nibble_packed_h4_h5_do_not_sign_extend() {
        let mut block2 = REFERENCE_CALIB_BLOCK2;
        block2[3] = 0xFF; // H4 msb
        block2[4] = 0xFF; // shared nibble byte
        block2[5] = 0xFF; // H5 msb
        let calib = CalibrationCoefficients::from_blocks(&REFERENCE_CALIB_BLOCK1, &block2);
        // 12-bit values top out at 4095; the assembly never produces negatives
        assert_eq!(calib.h4, 4095);
        assert_eq!(calib.h5, 4095);
    }

    #[test]
    fn h6_is_signed_eight_bit() {
        let mut block2 = REFERENCE_CALIB_BLOCK2;
        block2[6] = 0xE2;
        let calib = CalibrationCoefficients::from_blocks(&REFERENCE_CALIB_BLOCK1, &block2);
        assert_eq!(calib.h6, -30);
    }

    #[test]
    fn loads_with_exactly_two_block_reads() {
        let mut bus = SimBus::with_defaults();
        let calib = CalibrationCoefficients::read_from(&mut bus).unwrap();
        assert_eq!(calib.t1, 27504);
        assert_eq!(calib.h6, 30);
    }

    #[test]
    fn short_block_read_is_fatal() {
        let mut bus = SimBus::with_defaults();
        bus.truncate_block_reads(20);
        let err = CalibrationCoefficients::read_from(&mut bus).unwrap_err();
        assert_eq!(
            err,
            DeviceError::CalibrationShortRead {
                register: REG_CALIB00,
                expected: 26,
                got: 20
            }
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn bus_fault_propagates() {
        let mut bus = SimBus::with_defaults();
        bus.inject_fault(REG_CALIB26, BusError::Nack);
        let err = CalibrationCoefficients::read_from(&mut bus).unwrap_err();
        assert_eq!(err, DeviceError::Bus(BusError::Nack));
    }
}
