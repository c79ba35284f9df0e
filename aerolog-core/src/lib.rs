//! BME280 driver core for Aerolog
//!
//! Reads a Bosch BME280 environmental sensor over a register-addressed bus,
//! converts the raw register bytes into temperature, pressure, and humidity
//! with the vendor's fixed-point compensation algorithm, and hands each
//! timestamped reading to a persistence sink.
//!
//! Key constraints:
//! - Compensation is bit-for-bit the vendor reference algorithm: sized
//!   two's-complement integers, arithmetic right shifts, wraparound
//! - Single-threaded and blocking; the only suspension point is the
//!   inter-cycle sleep
//! - All I/O goes through the [`bus::SensorBus`] and [`sink::RecordSink`]
//!   seams, so the whole acquisition path runs against simulated hardware
//!   in tests
//!
//! ```no_run
//! use aerolog_core::{Bme280, Sampler, SamplerConfig};
//! use aerolog_core::bus::sim::SimBus;
//! use aerolog_core::sink::MemorySink;
//! use aerolog_core::time::MockClock;
//!
//! let mut device = Bme280::new(SimBus::with_defaults());
//! let clock = MockClock::new(0);
//! device.init(&clock).expect("sensor present");
//!
//! let config = SamplerConfig::default().max_cycles(1);
//! let mut sampler = Sampler::new(device, MemorySink::<16>::new(), clock, config);
//! sampler.run().expect("startup succeeded");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

pub mod bus;
pub mod calibration;
pub mod compensation;
pub mod device;
pub mod errors;
pub mod measurement;
pub mod registers;
pub mod sampler;
pub mod sink;
pub mod time;

// Public API
pub use bus::SensorBus;
pub use calibration::CalibrationCoefficients;
pub use compensation::{Compensated, FineTemp};
pub use device::Bme280;
pub use errors::{BusError, DeviceError};
pub use measurement::{RawSample, Reading};
pub use sampler::{Sampler, SamplerConfig};
pub use sink::RecordSink;
pub use time::{Clock, Timestamp};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
