//! Time and sleep abstraction
//!
//! The acquisition loop never touches the system clock directly: it goes
//! through [`Clock`], so the 300-second inter-cycle sleep and the capture
//! timestamps are testable without real-time waiting. [`WallClock`] is the
//! production implementation; [`MockClock`] advances instantly and records
//! every sleep it was asked for.

use core::cell::{Cell, RefCell};
use core::time::Duration;

use heapless::Vec;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Source of time and sleep for the acquisition loop
pub trait Clock {
    /// Current wall-clock timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// System wall clock (requires `std`)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct WallClock;

#[cfg(feature = "std")]
impl Clock for WallClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Deterministic clock for testing
///
/// `sleep` advances the current time by the requested duration instead of
/// blocking, and keeps a log of the requested durations in milliseconds.
#[derive(Debug, Default)]
pub struct MockClock {
    now_ms: Cell<Timestamp>,
    sleeps: RefCell<Vec<u64, 32>>,
}

impl MockClock {
    /// Clock starting at `start_ms`
    pub fn new(start_ms: Timestamp) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    /// Move the clock forward without recording a sleep
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    /// Number of sleeps requested so far
    pub fn sleep_count(&self) -> usize {
        self.sleeps.borrow().len()
    }

    /// Requested sleep durations in milliseconds, oldest first
    pub fn sleep_log(&self) -> Vec<u64, 32> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        self.now_ms.get()
    }

    fn sleep(&self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        self.now_ms.set(self.now_ms.get() + ms);
        let _ = self.sleeps.borrow_mut().push(ms);
    }
}
