//! Prelude module for common re-exports.
//!
//! ```rust
//! use fccu_common::prelude::*;
//! ```

// ─── Payloads & Enums ───────────────────────────────────────────────
pub use crate::types::{
    BackpressureLevel, FaultEntry, FaultEvent, FaultPriority, HookAction, RecentFaultInfo,
};

// ─── Callback Types ─────────────────────────────────────────────────
pub use crate::types::{BusNotifier, FaultHook, OverflowHook, ShutdownHook};

// ─── Attributes & Errors ────────────────────────────────────────────
pub use crate::attr::FaultAttr;
pub use crate::error::FccuError;

// ─── Statistics ─────────────────────────────────────────────────────
pub use crate::stats::FaultStatistics;

// ─── Clock ──────────────────────────────────────────────────────────
pub use crate::clock::{Clock, ManualClock, MonotonicClock};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, FaultPointConfig, FccuConfig};

// ─── Limits ─────────────────────────────────────────────────────────
pub use crate::consts::{MAX_FAULT_POINTS, RECENT_RING_SIZE};
