//! Aerolog daemon
//!
//! Reads a BME280 on the Pi's I2C bus every configured interval and appends
//! each reading to the configured sink. Runs until terminated; each cycle's
//! persistence completes before the next trigger, so killing the process
//! loses at most the in-flight record.
//!
//! ```bash
//! RUST_LOG=info aerologd [config.json]
//! ```

use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use log::{error, info};

use aerolog_connectors::{HttpConfig, HttpSink, JsonlSink};
use aerolog_core::sink::RecordSink;
use aerolog_core::time::WallClock;
use aerolog_core::{Bme280, Sampler, SamplerConfig};

mod config;
mod i2c;

use config::{DaemonConfig, SinkConfig};
use i2c::RppalBus;

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        error!("fatal: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = DaemonConfig::load(config_path.as_deref())?;
    info!(
        "aerolog {} starting: bus {}, address {:#04x}, interval {}s",
        aerolog_core::VERSION,
        config.i2c_bus,
        config.device_address,
        config.interval_secs
    );

    let bus = RppalBus::open(config.i2c_bus, config.device_address)?;
    let clock = WallClock;
    let mut device = Bme280::new(bus);
    // chip-id mismatch and calibration failures abort here, before any cycle
    device.init(&clock)?;
    info!("sensor initialized, calibration loaded");

    let sampler_config =
        SamplerConfig::default().interval(Duration::from_secs(config.interval_secs));

    match config.sink {
        SinkConfig::Jsonl { path } => {
            run_loop(device, JsonlSink::open(path)?, clock, sampler_config)
        }
        SinkConfig::Http { url, bearer } => {
            let mut http = HttpConfig::new(url);
            if let Some(token) = bearer {
                http = http.bearer_token(token);
            }
            run_loop(device, HttpSink::new(http)?, clock, sampler_config)
        }
    }
}

fn run_loop<S>(
    device: Bme280<RppalBus>,
    sink: S,
    clock: WallClock,
    config: SamplerConfig,
) -> Result<(), Box<dyn Error>>
where
    S: RecordSink,
{
    let mut sampler = Sampler::new(device, sink, clock, config);
    sampler.run()?;
    Ok(())
}
