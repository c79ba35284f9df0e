//! Persistence sink contract
//!
//! The acquisition loop hands each timestamped reading to a [`RecordSink`]
//! and never looks back: append-only, no update or delete. Real sinks live
//! in the connectors crate; [`MemorySink`] ships here for tests and for
//! buffering on targets without storage.

use core::fmt;

use heapless::Vec;

use crate::measurement::Reading;

/// Durable, append-only destination for readings
pub trait RecordSink {
    /// Failure reporting type; the loop logs it and moves on
    type Error: fmt::Display;

    /// Append one reading durably
    fn append(&mut self, reading: &Reading) -> Result<(), Self::Error>;
}

/// Error from [`MemorySink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySinkError {
    /// Capacity exhausted
    Full,
    /// Failure injected by a test
    Injected,
}

impl fmt::Display for MemorySinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "memory sink full"),
            Self::Injected => write!(f, "injected sink failure"),
        }
    }
}

/// Bounded in-memory sink
///
/// Holds up to `N` readings. Doubles as the loop tests' observation point
/// and as a failure-injection site.
#[derive(Debug, Default)]
pub struct MemorySink<const N: usize> {
    records: Vec<Reading, N>,
    fail_next: bool,
}

impl<const N: usize> MemorySink<N> {
    /// Empty sink
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            fail_next: false,
        }
    }

    /// Make the next append fail with [`MemorySinkError::Injected`]
    pub fn fail_next_append(&mut self) {
        self.fail_next = true;
    }

    /// Readings appended so far, oldest first
    pub fn records(&self) -> &[Reading] {
        &self.records
    }
}

impl<const N: usize> RecordSink for MemorySink<N> {
    type Error = MemorySinkError;

    fn append(&mut self, reading: &Reading) -> Result<(), Self::Error> {
        if self.fail_next {
            self.fail_next = false;
            return Err(MemorySinkError::Injected);
        }
        self.records
            .push(*reading)
            .map_err(|_| MemorySinkError::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ts: u64) -> Reading {
        Reading {
            timestamp: ts,
            temperature_c: 21.5,
            humidity_pct: 40.0,
            pressure_hpa: 1013.25,
        }
    }

    #[test]
    fn appends_in_order() {
        let mut sink = MemorySink::<4>::new();
        sink.append(&reading(1)).unwrap();
        sink.append(&reading(2)).unwrap();
        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.records()[0].timestamp, 1);
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut sink = MemorySink::<4>::new();
        sink.fail_next_append();
        assert_eq!(sink.append(&reading(1)), Err(MemorySinkError::Injected));
        assert!(sink.append(&reading(2)).is_ok());
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn reports_full() {
        let mut sink = MemorySink::<1>::new();
        sink.append(&reading(1)).unwrap();
        assert_eq!(sink.append(&reading(2)), Err(MemorySinkError::Full));
    }
}
