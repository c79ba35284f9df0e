//! Device context
//!
//! [`Bme280`] owns the bus handle exclusively and stores the calibration
//! constants once loaded - no module-level globals. It knows the register
//! protocol (probe, reset, trigger, poll, read) but delegates all byte
//! transport to the [`SensorBus`] and all number crunching to the
//! compensation module.

use core::time::Duration;

use crate::bus::SensorBus;
use crate::calibration::CalibrationCoefficients;
use crate::compensation::{self, Compensated};
use crate::errors::DeviceError;
use crate::measurement::RawSample;
use crate::registers as reg;
use crate::time::Clock;

/// Settle time after a soft reset before the register file is usable
const RESET_DELAY: Duration = Duration::from_millis(2);

/// Interval between STATUS polls while a conversion is running
pub const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Default number of STATUS polls before giving up on a conversion
pub const DEFAULT_POLL_BUDGET: u32 = 100;

/// A BME280 behind a [`SensorBus`]
pub struct Bme280<B: SensorBus> {
    bus: B,
    calibration: Option<CalibrationCoefficients>,
}

impl<B: SensorBus> Bme280<B> {
    /// Wrap a bus handle; no I/O happens until [`init`](Self::init)
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            calibration: None,
        }
    }

    /// Startup sequence: probe the chip id, soft-reset, load calibration
    ///
    /// Any failure here is fatal; the acquisition loop must not start.
    pub fn init<C: Clock>(&mut self, clock: &C) -> Result<(), DeviceError> {
        self.probe_chip_id()?;
        self.soft_reset(clock)?;
        self.load_calibration()?;
        Ok(())
    }

    /// Verify the ID register answers 0x60
    pub fn probe_chip_id(&mut self) -> Result<(), DeviceError> {
        let found = self.bus.read_byte(reg::REG_ID)?;
        if found != reg::CHIP_ID {
            return Err(DeviceError::ChipIdMismatch { found });
        }
        log_debug!("chip id {:#04x} verified", found);
        Ok(())
    }

    /// Power-on reset; invalidates any previously loaded calibration
    pub fn soft_reset<C: Clock>(&mut self, clock: &C) -> Result<(), DeviceError> {
        self.bus.write_byte(reg::REG_RESET, reg::RESET_COMMAND)?;
        self.calibration = None;
        clock.sleep(RESET_DELAY);
        Ok(())
    }

    /// Read both calibration blocks and store the parsed coefficients
    pub fn load_calibration(&mut self) -> Result<&CalibrationCoefficients, DeviceError> {
        let calib = CalibrationCoefficients::read_from(&mut self.bus)?;
        log_debug!("calibration loaded: {:?}", calib);
        Ok(self.calibration.insert(calib))
    }

    /// Calibration constants, if loaded
    pub fn calibration(&self) -> Option<&CalibrationCoefficients> {
        self.calibration.as_ref()
    }

    /// Kick off one forced measurement: CTRL_HUM, then CTRL_MEAS
    ///
    /// CTRL_HUM only takes effect on the CTRL_MEAS write, so the order is
    /// mandatory. The sensor returns to sleep by itself afterwards, which is
    /// why every cycle rewrites both registers.
    pub fn trigger_forced_measurement(&mut self) -> Result<(), DeviceError> {
        self.bus.write_byte(reg::REG_CTRL_HUM, reg::CTRL_HUM_DEFAULT)?;
        self.bus
            .write_byte(reg::REG_CTRL_MEAS, reg::CTRL_MEAS_DEFAULT)?;
        Ok(())
    }

    /// Whether a conversion is currently running (STATUS bit 3)
    pub fn is_measuring(&mut self) -> Result<bool, DeviceError> {
        let status = self.bus.read_byte(reg::REG_STATUS)?;
        Ok(status & reg::STATUS_MEASURING != 0)
    }

    /// Read the 8-byte raw measurement block
    pub fn read_raw_sample(&mut self) -> Result<RawSample, DeviceError> {
        let mut block = [0u8; reg::DATA_LEN];
        let got = self.bus.read_block(reg::REG_DATA, &mut block)?;
        if got != reg::DATA_LEN {
            return Err(DeviceError::MeasurementShortRead {
                expected: reg::DATA_LEN,
                got,
            });
        }
        Ok(RawSample::from_block(&block))
    }

    /// One complete forced measurement: trigger, poll for completion, read,
    /// compensate (temperature first)
    ///
    /// Polls the STATUS measuring bit every [`POLL_INTERVAL`] rather than
    /// relying on incidental delay; `poll_budget` bounds the wait.
    pub fn measure<C: Clock>(
        &mut self,
        clock: &C,
        poll_budget: u32,
    ) -> Result<Compensated, DeviceError> {
        let calib = self.calibration.ok_or(DeviceError::NotInitialized)?;

        self.trigger_forced_measurement()?;
        let mut polls = 0;
        while self.is_measuring()? {
            polls += 1;
            if polls >= poll_budget {
                return Err(DeviceError::MeasurementTimeout { polls });
            }
            clock.sleep(POLL_INTERVAL);
        }

        let raw = self.read_raw_sample()?;
        log_debug!("raw sample after {} polls: {:?}", polls, raw);
        Ok(compensation::compensate(&raw, &calib))
    }

    /// Hand the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Borrow the bus, e.g. to steer a simulated one between cycles
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::sim::SimBus;
    use crate::errors::BusError;
    use crate::time::MockClock;

    fn ready_device() -> Bme280<SimBus> {
        let clock = MockClock::new(0);
        let mut device = Bme280::new(SimBus::with_defaults());
        device.init(&clock).unwrap();
        device
    }

    #[test]
    fn init_probes_resets_and_loads_calibration() {
        let device = ready_device();
        let calib = device.calibration().unwrap();
        assert_eq!(calib.t1, 27504);
    }

    #[test]
    fn wrong_chip_id_aborts_startup() {
        let clock = MockClock::new(0);
        let mut bus = SimBus::with_defaults();
        bus.set_chip_id(0x58); // a BMP280
        let mut device = Bme280::new(bus);
        let err = device.init(&clock).unwrap_err();
        assert_eq!(err, DeviceError::ChipIdMismatch { found: 0x58 });
        assert!(!err.is_recoverable());
    }

    #[test]
    fn trigger_writes_hum_before_meas() {
        let mut device = ready_device();
        device.trigger_forced_measurement().unwrap();
        let writes = device.bus_mut().writes().to_vec();
        let hum = writes
            .iter()
            .position(|w| *w == (reg::REG_CTRL_HUM, 0b0000_0101))
            .unwrap();
        let meas = writes
            .iter()
            .position(|w| *w == (reg::REG_CTRL_MEAS, 0b1011_0101))
            .unwrap();
        assert!(hum < meas);
    }

    #[test]
    fn measure_polls_until_complete() {
        let clock = MockClock::new(0);
        let mut device = ready_device();
        device.bus_mut().set_conversion_polls(3);

        let out = device.measure(&clock, DEFAULT_POLL_BUDGET).unwrap();
        assert_eq!(out.temperature_centi, 2646);
        // three polls saw the measuring bit, each followed by a 2 ms sleep
        assert_eq!(clock.sleep_log().as_slice(), &[2, 2, 2]);
    }

    #[test]
    fn measure_times_out_when_bit_never_clears() {
        let clock = MockClock::new(0);
        let mut device = ready_device();
        device.bus_mut().set_conversion_polls(u8::MAX);

        let err = device.measure(&clock, 5).unwrap_err();
        assert_eq!(err, DeviceError::MeasurementTimeout { polls: 5 });
        assert!(err.is_recoverable());
    }

    #[test]
    fn measure_without_init_is_rejected() {
        let clock = MockClock::new(0);
        let mut device = Bme280::new(SimBus::with_defaults());
        assert_eq!(
            device.measure(&clock, DEFAULT_POLL_BUDGET).unwrap_err(),
            DeviceError::NotInitialized
        );
    }

    #[test]
    fn raw_block_timeout_propagates() {
        let clock = MockClock::new(0);
        let mut device = ready_device();
        device.bus_mut().inject_fault(reg::REG_DATA, BusError::Timeout);

        let err = device.measure(&clock, DEFAULT_POLL_BUDGET).unwrap_err();
        assert_eq!(err, DeviceError::Bus(BusError::Timeout));
        assert!(err.is_recoverable());
    }

    #[test]
    fn short_raw_block_is_an_error() {
        let mut device = ready_device();
        device.bus_mut().truncate_block_reads(6);
        assert_eq!(
            device.read_raw_sample().unwrap_err(),
            DeviceError::MeasurementShortRead { expected: 8, got: 6 }
        );
    }
}
