//! Daemon configuration
//!
//! Defaults mirror the deployment this grew out of: I2C bus 1, device
//! address 0x76, one reading every 300 seconds, JSON-lines file next to the
//! binary. An optional JSON file overrides any of it:
//!
//! ```json
//! {
//!     "i2c_bus": 1,
//!     "device_address": 118,
//!     "interval_secs": 300,
//!     "sink": { "type": "http", "url": "https://collector.local/readings" }
//! }
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use aerolog_connectors::ConnectorError;

/// Where readings go
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    /// Append to a JSON-lines file
    Jsonl {
        /// File path, created if missing
        path: PathBuf,
    },
    /// POST each reading to a collection endpoint
    Http {
        /// Endpoint URL
        url: String,
        /// Optional bearer token
        #[serde(default)]
        bearer: Option<String>,
    },
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::Jsonl {
            path: PathBuf::from("aerolog.jsonl"),
        }
    }
}

/// Top-level daemon settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// I2C bus number (`/dev/i2c-N`)
    pub i2c_bus: u8,
    /// Sensor address; 0x76 with SDO low, 0x77 with SDO high
    pub device_address: u16,
    /// Inter-cycle sleep in seconds
    pub interval_secs: u64,
    /// Persistence sink
    pub sink: SinkConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            device_address: 0x76,
            interval_secs: 300,
            sink: SinkConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load from a JSON file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConnectorError> {
        match path {
            Some(path) => {
                let file = File::open(path)?;
                Ok(serde_json::from_reader(file)?)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = DaemonConfig::default();
        assert_eq!(config.i2c_bus, 1);
        assert_eq!(config.device_address, 0x76);
        assert_eq!(config.interval_secs, 300);
        assert_eq!(
            config.sink,
            SinkConfig::Jsonl {
                path: PathBuf::from("aerolog.jsonl")
            }
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: DaemonConfig =
            serde_json::from_str(r#"{ "interval_secs": 60 }"#).unwrap();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.device_address, 0x76);
    }

    #[test]
    fn http_sink_parses() {
        let config: DaemonConfig = serde_json::from_str(
            r#"{ "sink": { "type": "http", "url": "https://collector.local/r", "bearer": "token" } }"#,
        )
        .unwrap();
        assert_eq!(
            config.sink,
            SinkConfig::Http {
                url: "https://collector.local/r".into(),
                bearer: Some("token".into())
            }
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<DaemonConfig>(r#"{ "intervall": 60 }"#).is_err());
    }
}
