//! # Time Sources
//!
//! The ledger never reads an ambient clock directly. The host supplies a
//! [`TimeSource`], and every mutating operation samples it exactly once,
//! so a single operation's lock checks cannot flip between steps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Host-supplied current time, in seconds. Expected to be monotonically
/// non-decreasing across operations.
pub trait TimeSource {
    fn now(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// System wall clock, seconds since the Unix epoch
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

/// Deterministic time source for tests and simulations
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::Relaxed);
    }

    /// Move the clock forward
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::Relaxed);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}
