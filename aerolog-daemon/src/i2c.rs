//! rppal-backed sensor bus
//!
//! Adapts the Raspberry Pi's `/dev/i2c-N` interface to the
//! [`SensorBus`] contract: SMBus byte transfers for the registers, an I2C
//! block read for the calibration and measurement blocks. No retries here;
//! the acquisition loop owns that policy.

use std::io;

use rppal::i2c::I2c;

use aerolog_core::bus::SensorBus;
use aerolog_core::errors::BusError;

/// BME280 on a Raspberry Pi I2C bus
pub struct RppalBus {
    i2c: I2c,
}

impl RppalBus {
    /// Open `/dev/i2c-<bus>` and address the sensor
    pub fn open(bus: u8, address: u16) -> Result<Self, rppal::i2c::Error> {
        let mut i2c = I2c::with_bus(bus)?;
        i2c.set_slave_address(address)?;
        Ok(Self { i2c })
    }
}

/// Collapse transport errors into the bus contract's two categories
///
/// The Linux I2C driver reports an absent or nacking device as an I/O error
/// (EREMOTEIO/ENXIO); only a genuine timeout maps to [`BusError::Timeout`].
fn map_err(err: rppal::i2c::Error) -> BusError {
    match err {
        rppal::i2c::Error::Io(ref io_err) if io_err.kind() == io::ErrorKind::TimedOut => {
            BusError::Timeout
        }
        _ => BusError::Nack,
    }
}

impl SensorBus for RppalBus {
    fn read_byte(&mut self, register: u8) -> Result<u8, BusError> {
        self.i2c.smbus_read_byte(register).map_err(map_err)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), BusError> {
        self.i2c.smbus_write_byte(register, value).map_err(map_err)
    }

    fn read_block(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, BusError> {
        self.i2c.block_read(register, buf).map_err(map_err)?;
        Ok(buf.len())
    }
}
