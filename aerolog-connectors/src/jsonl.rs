//! JSON-lines file sink
//!
//! Appends one JSON object per reading to a file opened in append mode.
//! Each record carries both the raw millisecond timestamp the loop captured
//! and an RFC 3339 rendering of it, so the file is useful without a schema:
//!
//! ```text
//! {"timestamp":1700000000000,"time":"2023-11-14T22:13:20.000Z","temperature_c":26.46,"humidity_pct":62.12,"pressure_hpa":1086.73}
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use aerolog_core::measurement::Reading;
use aerolog_core::sink::RecordSink;

use crate::{ConnectorError, SinkStats};

/// On-disk record layout
#[derive(Debug, Serialize)]
struct Record {
    timestamp: u64,
    time: String,
    temperature_c: f64,
    humidity_pct: f64,
    pressure_hpa: f64,
}

/// Append-only JSON-lines sink
pub struct JsonlSink {
    path: PathBuf,
    file: File,
    stats: SinkStats,
}

impl JsonlSink {
    /// Open (or create) the file at `path` for appending
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConnectorError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::info!("jsonl sink appending to {}", path.display());
        Ok(Self {
            path,
            file,
            stats: SinkStats::default(),
        })
    }

    /// Path the sink writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append statistics so far
    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    fn write_record(&mut self, reading: &Reading) -> Result<u64, ConnectorError> {
        let time = DateTime::<Utc>::from_timestamp_millis(reading.timestamp as i64)
            .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH)
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut line = serde_json::to_vec(&Record {
            timestamp: reading.timestamp,
            time,
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
            pressure_hpa: reading.pressure_hpa,
        })?;
        line.push(b'\n');

        self.file.write_all(&line)?;
        // one flush per record: a crash loses at most the in-flight line
        self.file.sync_data()?;
        Ok(line.len() as u64)
    }
}

impl RecordSink for JsonlSink {
    type Error = ConnectorError;

    fn append(&mut self, reading: &Reading) -> Result<(), Self::Error> {
        match self.write_record(reading) {
            Ok(bytes) => {
                self.stats.records_written += 1;
                self.stats.bytes_written += bytes;
                Ok(())
            }
            Err(err) => {
                self.stats.records_failed += 1;
                Err(err)
            }
        }
    }
}
