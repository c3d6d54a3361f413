//! Aggregate fault condition state machine.
//!
//! Lifecycle: Idle → Active on the first report, Active ↔ Degraded around
//! critical faults, Active/Degraded → Shutdown on request. Shutdown is
//! terminal within a lifetime; only [`GlobalHsm::reset`] leaves it.
//!
//! The state is derived purely from the dispatched event sequence, never
//! inferred from the active bitmap.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use tracing::trace;

/// Aggregate fault condition.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalState {
    /// No fault has been reported since the last clear.
    Idle = 0,
    /// Faults present, normal processing.
    Active = 1,
    /// A critical-priority fault has been admitted.
    Degraded = 2,
    /// Shutdown requested by a hook; terminal.
    Shutdown = 3,
}

impl GlobalState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Active,
            2 => Self::Degraded,
            _ => Self::Shutdown,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Active => "Active",
            Self::Degraded => "Degraded",
            Self::Shutdown => "Shutdown",
        }
    }
}

/// Event consumed by the global machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalEvent {
    /// First fault reported while Idle.
    FaultReported,
    /// Active fault count dropped to zero.
    AllCleared,
    /// Critical-priority fault admitted.
    CriticalDetected,
    /// A hook returned the shutdown verdict.
    ShutdownReq,
    /// Critical condition resolved by the user.
    DegradeRecovered,
}

/// Global fault condition machine with atomic state.
#[derive(Debug)]
pub struct GlobalHsm {
    state: AtomicU8,
    critical_count: AtomicU32,
    shutdown_requested: AtomicBool,
}

impl GlobalHsm {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(GlobalState::Idle as u8),
            critical_count: AtomicU32::new(0),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Dispatch an event; returns whether a transition was taken.
    ///
    /// Events that do not match the current state are ignored.
    pub fn dispatch(&self, event: GlobalEvent) -> bool {
        use GlobalEvent as E;
        use GlobalState as S;

        loop {
            let current = GlobalState::from_u8(self.state.load(Ordering::Acquire));
            let next = match (current, event) {
                (S::Idle, E::FaultReported) => S::Active,
                (S::Active, E::AllCleared) => S::Idle,
                (S::Active, E::CriticalDetected) => S::Degraded,
                (S::Active, E::ShutdownReq) | (S::Degraded, E::ShutdownReq) => S::Shutdown,
                (S::Degraded, E::DegradeRecovered) => S::Active,
                _ => return false,
            };
            if self
                .state
                .compare_exchange(current as u8, next as u8, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                match event {
                    E::AllCleared => self.critical_count.store(0, Ordering::Relaxed),
                    E::ShutdownReq => self.shutdown_requested.store(true, Ordering::Relaxed),
                    _ => {}
                }
                trace!(from = current.as_str(), to = next.as_str(), "global state transition");
                return true;
            }
        }
    }

    pub fn state(&self) -> GlobalState {
        GlobalState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_idle(&self) -> bool {
        self.state() == GlobalState::Idle
    }

    pub fn is_active(&self) -> bool {
        self.state() == GlobalState::Active
    }

    pub fn is_degraded(&self) -> bool {
        self.state() == GlobalState::Degraded
    }

    pub fn is_shutdown(&self) -> bool {
        self.state() == GlobalState::Shutdown
    }

    /// Critical faults admitted since the last clear/reset.
    pub fn critical_count(&self) -> u32 {
        self.critical_count.load(Ordering::Relaxed)
    }

    /// Note one more admitted critical fault.
    pub fn record_critical(&self) {
        self.critical_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Relaxed)
    }

    /// Return to Idle and zero the context.
    pub fn reset(&self) {
        self.state.store(GlobalState::Idle as u8, Ordering::Release);
        self.critical_count.store(0, Ordering::Relaxed);
        self.shutdown_requested.store(false, Ordering::Relaxed);
    }
}

impl Default for GlobalHsm {
    fn default() -> Self {
        Self::new()
    }
}
