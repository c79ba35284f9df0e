//! Persistence sinks for Aerolog readings
//!
//! ## Overview
//!
//! The acquisition loop in `aerolog-core` talks to an abstract
//! [`RecordSink`](aerolog_core::sink::RecordSink); this crate provides the
//! durable implementations. Both are append-only - the sink contract has no
//! update or delete - and both stay synchronous and blocking, matching the
//! loop's single-threaded resource model.
//!
//! ## Sink Selection Guide
//!
//! ### JSON lines (`jsonl`)
//!
//! **When to use:**
//! - The sensor host owns its storage (SD card, USB disk)
//! - Downstream tooling ingests files
//!
//! **Characteristics:**
//! - One self-describing JSON object per line
//! - Flushed after every record; a crash loses at most the record being
//!   written
//! - No rotation; external tooling owns retention
//!
//! ### HTTP (`http`, feature-gated)
//!
//! **When to use:**
//! - A collection service owns the database
//! - The host has a reliable network
//!
//! **Characteristics:**
//! - One POST per reading, JSON body
//! - Bearer-token auth, configurable timeout
//! - A failed POST fails the cycle's append; the loop logs and moves on
//!   (no retry queue)

pub mod jsonl;

#[cfg(feature = "http")]
pub mod http;

pub use jsonl::JsonlSink;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpSink};

use thiserror::Error;

/// Common sink errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// File-level failure
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading could not be encoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server rejected the append
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// Network-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Bad sink configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Append statistics common to all sinks
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkStats {
    /// Records appended successfully
    pub records_written: u64,
    /// Records that failed to append
    pub records_failed: u64,
    /// Payload bytes written
    pub bytes_written: u64,
}
