//! BME280 register map and control-byte packing
//!
//! Addresses are bit-exact per the Bosch datasheet and must not be altered.
//! Register layout:
//! - `CONFIG`: standby[7:5] | filter[4:2] | spi3w_en[0]
//! - `CTRL_MEAS`: osrs_t[7:5] | osrs_p[4:2] | mode[1:0]
//! - `CTRL_HUM`: osrs_h[2:0] - takes effect on the next CTRL_MEAS write
//! - `STATUS`: measuring[3] | im_update[0]

/// ID register, read-only; a BME280 answers [`CHIP_ID`]
pub const REG_ID: u8 = 0xD0;
/// Soft-reset register, write-only; accepts [`RESET_COMMAND`]
pub const REG_RESET: u8 = 0xE0;
/// Humidity oversampling control
pub const REG_CTRL_HUM: u8 = 0xF2;
/// Status register
pub const REG_STATUS: u8 = 0xF3;
/// Temperature/pressure oversampling and mode control
pub const REG_CTRL_MEAS: u8 = 0xF4;
/// Standby/filter/SPI configuration
pub const REG_CONFIG: u8 = 0xF5;
/// First calibration block, 26 bytes (0x88..=0xA1)
pub const REG_CALIB00: u8 = 0x88;
/// Second calibration block, 16 bytes (0xE1..=0xF0)
pub const REG_CALIB26: u8 = 0xE1;
/// Raw measurement block, 8 contiguous bytes: press msb..xlsb,
/// temp msb..xlsb, hum msb..lsb
pub const REG_DATA: u8 = 0xF7;

/// Expected ID register value
pub const CHIP_ID: u8 = 0x60;
/// Word written to [`REG_RESET`] to trigger a power-on reset
pub const RESET_COMMAND: u8 = 0xB6;

/// Length of the first calibration block
pub const CALIB00_LEN: usize = 26;
/// Length of the second calibration block
pub const CALIB26_LEN: usize = 16;
/// Length of the raw measurement block
pub const DATA_LEN: usize = 8;

/// STATUS bit set while a conversion is running
pub const STATUS_MEASURING: u8 = 1 << 3;
/// STATUS bit set while NVM data is being copied
pub const STATUS_IM_UPDATE: u8 = 1 << 0;

/// Sensor power mode, bits [1:0] of CTRL_MEAS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    /// No measurements, lowest power
    Sleep = 0b00,
    /// One measurement, then back to sleep automatically
    Forced = 0b01,
    /// Continuous measurement at the configured standby interval
    Normal = 0b11,
}

/// Oversampling setting for any of the three measurement channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Oversampling {
    /// Channel disabled, output fixed at 0x80000 / 0x8000
    Skipped = 0b000,
    /// x1 oversampling
    X1 = 0b001,
    /// x2 oversampling
    X2 = 0b010,
    /// x4 oversampling
    X4 = 0b011,
    /// x8 oversampling
    X8 = 0b100,
    /// x16 oversampling
    X16 = 0b101,
}

/// Pack a CTRL_MEAS byte from oversampling settings and mode
pub const fn ctrl_meas(osrs_t: Oversampling, osrs_p: Oversampling, mode: Mode) -> u8 {
    ((osrs_t as u8) << 5) | ((osrs_p as u8) << 2) | mode as u8
}

/// Pack a CTRL_HUM byte from the humidity oversampling setting
pub const fn ctrl_hum(osrs_h: Oversampling) -> u8 {
    osrs_h as u8
}

/// CTRL_HUM value used by the acquisition loop: humidity x16
pub const CTRL_HUM_DEFAULT: u8 = ctrl_hum(Oversampling::X16);
/// CTRL_MEAS value used by the acquisition loop: temp/pressure x16, forced
pub const CTRL_MEAS_DEFAULT: u8 = ctrl_meas(Oversampling::X16, Oversampling::X16, Mode::Forced);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_bytes_match_datasheet() {
        // x16 humidity oversampling
        assert_eq!(CTRL_HUM_DEFAULT, 0b0000_0101);
        // x16 temp/pressure oversampling, forced mode
        assert_eq!(CTRL_MEAS_DEFAULT, 0b1011_0101);
    }

    #[test]
    fn mode_bits() {
        assert_eq!(ctrl_meas(Oversampling::X1, Oversampling::X1, Mode::Normal), 0b0010_0111);
        assert_eq!(ctrl_meas(Oversampling::Skipped, Oversampling::Skipped, Mode::Sleep), 0);
    }
}
