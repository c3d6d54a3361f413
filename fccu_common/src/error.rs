//! Value-returned failure taxonomy for collector operations.
//!
//! None of these propagate as panics; producers decide whether to retry,
//! escalate, or drop on `QueueFull`.

use thiserror::Error;

/// Failure codes returned by collector operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FccuError {
    /// Fault index outside the configured table range.
    #[error("fault index out of range")]
    InvalidIndex,

    /// Operation requires a registered fault point.
    #[error("fault point not registered")]
    NotRegistered,

    /// Fault point was already registered; registration is once-only.
    #[error("fault point already registered")]
    AlreadyRegistered,

    /// Report rejected: target queue physically full, or refused by the
    /// priority admission policy (the two are not distinguished here).
    #[error("fault queue full")]
    QueueFull,

    /// Reserved: admission rejection currently reports as [`QueueFull`](Self::QueueFull).
    #[error("admission denied by priority policy")]
    AdmissionDenied,

    /// All per-fault state machine slots are bound.
    #[error("no free per-fault state machine slot")]
    HsmSlotFull,
}
