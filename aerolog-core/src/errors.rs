//! Error types for bus transport and device-level failures
//!
//! Errors follow the same rules as the rest of the crate's hot path:
//! small, `Copy`, no heap allocation, and enough context to decide between
//! "abort startup" and "skip this cycle". The acquisition loop treats
//! [`BusError`] and the cycle-level [`DeviceError`] variants as recoverable;
//! [`DeviceError::ChipIdMismatch`] and [`DeviceError::CalibrationShortRead`]
//! are fatal at startup.

use thiserror_no_std::Error;

/// Transport-level failure on the sensor bus
///
/// The bus layer performs no retries; the caller owns retry policy.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// No device at the address, or the device nacked the transfer
    #[error("device nack or missing device")]
    Nack,

    /// The transfer did not complete within the transport's own timeout
    #[error("bus transfer timed out")]
    Timeout,
}

/// Device-level failure while probing, configuring, or sampling the sensor
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// ID register did not read back 0x60; wrong or absent chip. Fatal.
    #[error("chip id mismatch: expected 0x60, found {found:#04x}")]
    ChipIdMismatch {
        /// Byte read from the ID register
        found: u8,
    },

    /// A calibration block read returned fewer bytes than expected. Fatal.
    #[error("calibration block at {register:#04x} returned {got} of {expected} bytes")]
    CalibrationShortRead {
        /// Register the block read started at
        register: u8,
        /// Bytes the block should contain
        expected: usize,
        /// Bytes actually returned
        got: usize,
    },

    /// The raw measurement block read returned fewer bytes than expected
    #[error("measurement block returned {got} of {expected} bytes")]
    MeasurementShortRead {
        /// Bytes the block should contain
        expected: usize,
        /// Bytes actually returned
        got: usize,
    },

    /// The STATUS measuring bit never cleared within the poll budget
    #[error("measurement did not complete within {polls} polls")]
    MeasurementTimeout {
        /// Number of status polls performed before giving up
        polls: u32,
    },

    /// Measurement requested before calibration was loaded
    #[error("device not initialized: calibration not loaded")]
    NotInitialized,

    /// Underlying bus transport failure
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
}

impl DeviceError {
    /// Whether the acquisition loop may skip the cycle and continue
    ///
    /// Startup-only failures (wrong chip, short calibration read, missing
    /// init) are fatal; everything that can happen mid-cycle is recoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            DeviceError::ChipIdMismatch { .. }
                | DeviceError::CalibrationShortRead { .. }
                | DeviceError::NotInitialized
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_error_converts() {
        let err: DeviceError = BusError::Timeout.into();
        assert_eq!(err, DeviceError::Bus(BusError::Timeout));
        assert!(err.is_recoverable());
    }

    #[test]
    fn startup_errors_are_fatal() {
        assert!(!DeviceError::ChipIdMismatch { found: 0x58 }.is_recoverable());
        assert!(!DeviceError::CalibrationShortRead {
            register: 0x88,
            expected: 26,
            got: 20
        }
        .is_recoverable());
        assert!(DeviceError::MeasurementTimeout { polls: 100 }.is_recoverable());
    }

    #[cfg(feature = "std")]
    #[test]
    fn chip_id_mismatch_display() {
        let err = DeviceError::ChipIdMismatch { found: 0x58 };
        assert_eq!(
            format!("{}", err),
            "chip id mismatch: expected 0x60, found 0x58"
        );
    }
}
