//! Monotonic timestamp source for fault entries.
//!
//! The collector captures one timestamp per report; the source must be
//! steady (non-decreasing across calls within one producer). Injecting the
//! clock keeps timing deterministic under test and in simulation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic microsecond source.
pub trait Clock: Send + Sync {
    /// Microseconds since an arbitrary, fixed origin.
    fn now_us(&self) -> u64;
}

impl<T: Clock> Clock for std::sync::Arc<T> {
    #[inline]
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Wall clock anchored at construction, backed by [`Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Hand-driven clock for tests and simulation runs.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_us: AtomicU64,
}

impl ManualClock {
    pub fn new(start_us: u64) -> Self {
        Self {
            now_us: AtomicU64::new(start_us),
        }
    }

    /// Advance the clock by `delta_us` microseconds.
    pub fn advance(&self, delta_us: u64) {
        self.now_us.fetch_add(delta_us, Ordering::Relaxed);
    }

    /// Jump the clock to an absolute value.
    pub fn set(&self, value_us: u64) {
        self.now_us.store(value_us, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_us(&self) -> u64 {
        self.now_us.load(Ordering::Relaxed)
    }
}
