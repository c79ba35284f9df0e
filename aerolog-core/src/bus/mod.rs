//! Bus access primitives for sensor registers
//!
//! [`SensorBus`] is the seam between the driver and the transport (I2C on
//! the Raspberry Pi, a register-file simulation in tests). It exposes byte-
//! and block-level read/write against sensor registers and nothing else: no
//! retries, no timeouts beyond what the transport itself enforces, no
//! interpretation of the bytes. Retry policy belongs to the caller.
//!
//! ## Module Organization
//!
//! - Core trait (this file)
//! - `sim` - simulated BME280 register file for testing

use crate::errors::BusError;

pub mod sim;

pub use sim::SimBus;

/// Synchronous, blocking access to a register-addressed sensor
///
/// All operations block the calling thread for their duration. Transport
/// failures surface as [`BusError`], distinguishing a nack (absent or
/// unresponsive device) from a transfer timeout; the caller decides whether
/// that is fatal.
pub trait SensorBus {
    /// Read one byte from `register`
    fn read_byte(&mut self, register: u8) -> Result<u8, BusError>;

    /// Write one byte to `register`
    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), BusError>;

    /// Read a contiguous block starting at `register` into `buf`
    ///
    /// Returns the number of bytes actually read, which a correct transport
    /// fills to `buf.len()`. Callers must treat anything shorter as a failed
    /// read of that block.
    fn read_block(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, BusError>;
}
