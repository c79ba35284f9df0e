//! Acquisition loop
//!
//! One [`Sampler`] owns the device context, the persistence sink, and the
//! clock for the process lifetime. A cycle is strictly sequential: trigger a
//! forced measurement, poll for completion, read the raw block, compensate
//! (temperature first), timestamp, append to the sink, sleep until the next
//! cycle. One cycle's persistence completes or is reported failed before the
//! next cycle's trigger is issued; there is no overlap.
//!
//! Error policy:
//! - bus transport failures mid-cycle are recoverable: log, skip the cycle,
//!   continue after the sleep
//! - sink failures are recoverable: log, proceed to sleep; no retry queue
//! - startup failures (chip id, calibration) never reach this loop - they
//!   abort in [`Bme280::init`] before the first cycle
//!
//! Cancellation is external (process termination). For tests,
//! [`SamplerConfig::max_cycles`] bounds the run instead.

use core::time::Duration;

use crate::bus::SensorBus;
use crate::device::{Bme280, DEFAULT_POLL_BUDGET};
use crate::errors::DeviceError;
use crate::measurement::Reading;
use crate::sink::RecordSink;
use crate::time::Clock;

/// Acquisition loop settings
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// Sleep between cycles; default 300 seconds
    pub interval: Duration,
    /// STATUS polls per measurement before giving up
    pub poll_budget: u32,
    /// Stop after this many cycles; `None` runs until terminated
    pub cycle_limit: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            poll_budget: DEFAULT_POLL_BUDGET,
            cycle_limit: None,
        }
    }
}

impl SamplerConfig {
    /// Set the inter-cycle sleep
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the per-measurement poll budget
    pub fn poll_budget(mut self, budget: u32) -> Self {
        self.poll_budget = budget;
        self
    }

    /// Bound the number of cycles (tests; production runs unbounded)
    pub fn max_cycles(mut self, cycles: u64) -> Self {
        self.cycle_limit = Some(cycles);
        self
    }
}

/// What one cycle did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Measured and appended to the sink
    Persisted(Reading),
    /// Measurement failed; nothing was handed to the sink
    SkippedMeasurement,
    /// Measurement succeeded but the sink rejected the append
    SkippedPersistence,
}

/// The acquisition loop: device + sink + clock, owned exclusively
pub struct Sampler<B: SensorBus, S: RecordSink, C: Clock> {
    device: Bme280<B>,
    sink: S,
    clock: C,
    config: SamplerConfig,
    cycles: u64,
}

impl<B: SensorBus, S: RecordSink, C: Clock> Sampler<B, S, C> {
    /// Assemble a loop around an initialized device
    pub fn new(device: Bme280<B>, sink: S, clock: C, config: SamplerConfig) -> Self {
        Self {
            device,
            sink,
            clock,
            config,
            cycles: 0,
        }
    }

    /// Run cycles until the limit is reached or a fatal error occurs
    ///
    /// Recoverable failures are logged and skipped; the loop keeps its
    /// schedule. Only errors that indicate the device was never usable
    /// propagate.
    pub fn run(&mut self) -> Result<(), DeviceError> {
        loop {
            match self.run_cycle() {
                Ok(CycleOutcome::Persisted(reading)) => {
                    log_info!(
                        "persisted reading: {:.2} degC, {:.2} %RH, {:.2} hPa",
                        reading.temperature_c,
                        reading.humidity_pct,
                        reading.pressure_hpa
                    );
                }
                Ok(outcome) => {
                    log_warn!("cycle {} skipped: {:?}", self.cycles, outcome);
                }
                Err(err) if err.is_recoverable() => {
                    log_warn!("cycle {} skipped: {}", self.cycles, err);
                }
                Err(err) => return Err(err),
            }

            self.cycles += 1;
            if let Some(limit) = self.config.cycle_limit {
                if self.cycles >= limit {
                    return Ok(());
                }
            }
            self.clock.sleep(self.config.interval);
        }
    }

    /// One acquisition cycle, without the inter-cycle sleep
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, DeviceError> {
        let compensated = match self.device.measure(&self.clock, self.config.poll_budget) {
            Ok(out) => out,
            Err(err) if err.is_recoverable() => {
                log_warn!("measurement failed: {}", err);
                return Ok(CycleOutcome::SkippedMeasurement);
            }
            Err(err) => return Err(err),
        };

        let reading = Reading {
            timestamp: self.clock.now(),
            temperature_c: compensated.temperature_c(),
            humidity_pct: compensated.humidity_pct(),
            pressure_hpa: compensated.pressure_hpa(),
        };

        match self.sink.append(&reading) {
            Ok(()) => Ok(CycleOutcome::Persisted(reading)),
            Err(err) => {
                log_warn!("sink rejected reading: {}", err);
                Ok(CycleOutcome::SkippedPersistence)
            }
        }
    }

    /// Cycles attempted so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Borrow the sink, e.g. to inspect a [`MemorySink`](crate::sink::MemorySink)
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Borrow the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Borrow the device, e.g. to steer a simulated bus between cycles
    pub fn device_mut(&mut self) -> &mut Bme280<B> {
        &mut self.device
    }

    /// Tear the loop apart, handing back device, sink, and clock
    pub fn into_parts(self) -> (Bme280<B>, S, C) {
        (self.device, self.sink, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::sim::SimBus;
    use crate::errors::BusError;
    use crate::registers::REG_DATA;
    use crate::sink::MemorySink;
    use crate::time::MockClock;

    fn ready_sampler(
        config: SamplerConfig,
    ) -> Sampler<SimBus, MemorySink<16>, MockClock> {
        let clock = MockClock::new(1_000_000);
        let mut device = Bme280::new(SimBus::with_defaults());
        device.init(&clock).unwrap();
        Sampler::new(device, MemorySink::new(), clock, config)
    }

    #[test]
    fn persists_one_reading_per_cycle() {
        let config = SamplerConfig::default()
            .interval(Duration::from_secs(300))
            .max_cycles(2);
        let mut sampler = ready_sampler(config);
        sampler.run().unwrap();

        let records = sampler.sink().records();
        assert_eq!(records.len(), 2);
        assert!((records[0].temperature_c - 26.46).abs() < 1e-9);
        assert!((records[0].humidity_pct - 62.1201171875).abs() < 1e-9);
        assert!((records[0].pressure_hpa - 1086.732578125).abs() < 1e-9);
    }

    #[test]
    fn sleeps_the_configured_interval_between_cycles() {
        let config = SamplerConfig::default()
            .interval(Duration::from_secs(300))
            .max_cycles(2);
        let mut sampler = ready_sampler(config);
        sampler.run().unwrap();

        // per cycle: one 2 ms poll sleep, then the 300 s interval after the
        // first cycle only (the run stops at the limit)
        let sleeps = sampler.clock().sleep_log();
        assert!(sleeps.contains(&300_000));
    }

    #[test]
    fn bus_timeout_skips_cycle_then_recovers() {
        let config = SamplerConfig::default().max_cycles(2);
        let mut sampler = ready_sampler(config);
        sampler
            .device_mut()
            .bus_mut()
            .inject_fault(REG_DATA, BusError::Timeout);

        sampler.run().unwrap();
        // first cycle skipped, nothing persisted for it; second succeeded
        assert_eq!(sampler.sink().records().len(), 1);
        assert_eq!(sampler.cycles(), 2);
    }

    #[test]
    fn sink_failure_is_recoverable() {
        let config = SamplerConfig::default().max_cycles(2);
        let mut sampler = ready_sampler(config);
        sampler.sink.fail_next_append();

        sampler.run().unwrap();
        assert_eq!(sampler.sink().records().len(), 1);
    }

    #[test]
    fn uninitialized_device_is_fatal() {
        let clock = MockClock::new(0);
        let device = Bme280::new(SimBus::with_defaults());
        let mut sampler = Sampler::new(
            device,
            MemorySink::<4>::new(),
            clock,
            SamplerConfig::default().max_cycles(1),
        );
        assert_eq!(sampler.run().unwrap_err(), DeviceError::NotInitialized);
    }

    #[test]
    fn timestamps_come_from_the_clock() {
        let config = SamplerConfig::default().max_cycles(1);
        let mut sampler = ready_sampler(config);
        sampler.run().unwrap();
        let ts = sampler.sink().records()[0].timestamp;
        // started at 1_000_000 ms; only poll sleeps elapsed before capture
        assert!(ts >= 1_000_000 && ts < 1_001_000);
    }
}
