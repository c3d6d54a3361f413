//! Individual fault lifecycle state machine.
//!
//! Bound to exactly one fault index at configuration time, with a
//! confirmation threshold copied at bind. Detection events accumulate an
//! occurrence count; `Confirmed` promotes Detected → Active only once the
//! count reaches the threshold, and is a no-op below it.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Lifecycle of one tracked fault.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerFaultState {
    /// Not observed since the last full clear.
    Dormant = 0,
    /// Reported, below the confirmation threshold.
    Detected = 1,
    /// Confirmed (threshold reached).
    Active = 2,
    /// Recovery procedure in progress.
    Recovering = 3,
    /// Resolved; one more clear returns to Dormant.
    Cleared = 4,
}

impl PerFaultState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Dormant,
            1 => Self::Detected,
            2 => Self::Active,
            3 => Self::Recovering,
            _ => Self::Cleared,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dormant => "Dormant",
            Self::Detected => "Detected",
            Self::Active => "Active",
            Self::Recovering => "Recovering",
            Self::Cleared => "Cleared",
        }
    }
}

/// Event consumed by a per-fault machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerFaultEvent {
    /// Fault occurrence observed (dispatched at report time).
    Detected,
    /// Threshold check passed at process time.
    Confirmed,
    /// Recovery procedure started.
    RecoveryStart,
    /// Recovery procedure finished.
    RecoveryDone,
    /// Fault cleared by hook or user.
    ClearFault,
}

/// Per-fault lifecycle machine with atomic state.
#[derive(Debug)]
pub struct PerFaultHsm {
    state: AtomicU8,
    occurrence_count: AtomicU32,
    fault_index: u16,
    threshold: u32,
}

impl PerFaultHsm {
    /// An unbound slot; the collector only routes events to bound slots.
    pub(crate) fn unbound() -> Self {
        Self {
            state: AtomicU8::new(PerFaultState::Dormant as u8),
            occurrence_count: AtomicU32::new(0),
            fault_index: 0,
            threshold: 1,
        }
    }

    /// Bind to a fault index with a confirmation threshold (0 clamps to 1).
    pub(crate) fn bind(&mut self, fault_index: u16, threshold: u32) {
        self.fault_index = fault_index;
        self.threshold = threshold.max(1);
        *self.occurrence_count.get_mut() = 0;
        *self.state.get_mut() = PerFaultState::Dormant as u8;
    }

    /// Dispatch an event; returns whether it was consumed.
    ///
    /// Unmatched events (and `Confirmed` below threshold) are no-ops.
    pub fn dispatch(&self, event: PerFaultEvent) -> bool {
        use PerFaultEvent as E;
        use PerFaultState as S;

        loop {
            let current = PerFaultState::from_u8(self.state.load(Ordering::Acquire));

            // Internal transition: repeat detection while already Detected.
            if current == S::Detected && event == E::Detected {
                self.occurrence_count.fetch_add(1, Ordering::Relaxed);
                return true;
            }

            let next = match (current, event) {
                (S::Dormant, E::Detected) => S::Detected,
                (S::Detected, E::Confirmed) => {
                    if self.occurrence_count.load(Ordering::Relaxed) < self.threshold {
                        return false;
                    }
                    S::Active
                }
                (S::Detected, E::ClearFault) => S::Cleared,
                (S::Active, E::RecoveryStart) => S::Recovering,
                (S::Active, E::ClearFault) => S::Cleared,
                (S::Recovering, E::RecoveryDone) => S::Cleared,
                (S::Cleared, E::ClearFault) => S::Dormant,
                _ => return false,
            };
            if self
                .state
                .compare_exchange(current as u8, next as u8, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                match (current, event) {
                    (S::Dormant, E::Detected) => self.occurrence_count.store(1, Ordering::Relaxed),
                    (S::Cleared, E::ClearFault) => self.occurrence_count.store(0, Ordering::Relaxed),
                    _ => {}
                }
                return true;
            }
        }
    }

    pub fn state(&self) -> PerFaultState {
        PerFaultState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_dormant(&self) -> bool {
        self.state() == PerFaultState::Dormant
    }

    pub fn is_detected(&self) -> bool {
        self.state() == PerFaultState::Detected
    }

    pub fn is_active(&self) -> bool {
        self.state() == PerFaultState::Active
    }

    pub fn is_recovering(&self) -> bool {
        self.state() == PerFaultState::Recovering
    }

    pub fn is_cleared(&self) -> bool {
        self.state() == PerFaultState::Cleared
    }

    /// Detections accumulated since the last clear.
    pub fn occurrence_count(&self) -> u32 {
        self.occurrence_count.load(Ordering::Relaxed)
    }

    /// The fault index this machine is bound to.
    pub fn fault_index(&self) -> u16 {
        self.fault_index
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Return to Dormant and zero the count.
    pub fn reset(&self) {
        self.state.store(PerFaultState::Dormant as u8, Ordering::Release);
        self.occurrence_count.store(0, Ordering::Relaxed);
    }
}
