//! Shared fixtures for the acquisition integration tests

#![allow(dead_code)]

use aerolog_core::bus::sim::SimBus;
use aerolog_core::sink::MemorySink;
use aerolog_core::time::MockClock;
use aerolog_core::{Bme280, CalibrationCoefficients, Sampler, SamplerConfig};

/// Datasheet worked-example trimming values with the synthetic humidity set
pub fn reference_calibration() -> CalibrationCoefficients {
    CalibrationCoefficients {
        t1: 27504,
        t2: 26435,
        t3: -1000,
        p1: 36477,
        p2: -10685,
        p3: 3024,
        p4: 2855,
        p5: 140,
        p6: -7,
        p7: 15500,
        p8: -14600,
        p9: 6000,
        h1: 75,
        h2: 355,
        h3: 0,
        h4: 333,
        h5: 50,
        h6: 30,
    }
}

/// Initialized device over a default simulated sensor
pub fn ready_device() -> Bme280<SimBus> {
    let clock = MockClock::new(0);
    let mut device = Bme280::new(SimBus::with_defaults());
    device.init(&clock).expect("simulated sensor present");
    device
}

/// Full acquisition stack: device, 16-slot memory sink, mock clock
pub fn ready_sampler(config: SamplerConfig) -> Sampler<SimBus, MemorySink<16>, MockClock> {
    Sampler::new(ready_device(), MemorySink::new(), MockClock::new(1_700_000_000_000), config)
}
