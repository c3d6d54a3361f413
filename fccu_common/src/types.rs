//! Fault payload types shared between producers and the collector.
//!
//! `FaultEntry` is the queued wire form (trivially copyable, fixed layout),
//! `FaultEvent` the enriched form synthesized at process time and handed to
//! hooks and bus notifiers.

use serde::{Deserialize, Serialize};
use static_assertions::{const_assert, const_assert_eq};

use crate::consts::{
    BACKPRESSURE_CRITICAL_PCT, BACKPRESSURE_FULL_PCT, BACKPRESSURE_WARNING_PCT, PRIORITY_COUNT,
};

// ─── Priorities ─────────────────────────────────────────────────────

/// Fault report priority. Lower discriminant = more urgent.
///
/// The discriminant doubles as the queue level index; priorities beyond the
/// configured level count clamp to the lowest level via [`level`](Self::level).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPriority {
    /// Always admitted; drives the Degraded global state.
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl FaultPriority {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Critical),
            1 => Some(Self::High),
            2 => Some(Self::Medium),
            3 => Some(Self::Low),
            _ => None,
        }
    }

    /// Queue level for this priority under a `levels`-deep queue set.
    #[inline]
    pub const fn level(&self, levels: usize) -> usize {
        let raw = *self as usize;
        if raw < levels {
            raw
        } else {
            levels - 1
        }
    }

    /// Next-higher priority (toward Critical); `None` at Critical.
    #[inline]
    pub const fn raise(&self) -> Option<Self> {
        match self {
            Self::Critical => None,
            Self::High => Some(Self::Critical),
            Self::Medium => Some(Self::High),
            Self::Low => Some(Self::Medium),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Default for FaultPriority {
    fn default() -> Self {
        Self::Medium
    }
}

const_assert!(PRIORITY_COUNT == 4);

// ─── Hook Actions ───────────────────────────────────────────────────

/// Verdict returned by a fault hook, driving the fault's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Fault is resolved: clear the active bit.
    Handled,
    /// Re-enqueue the entry one priority level higher.
    Escalate,
    /// Leave the fault active; the caller clears or re-reports later.
    Defer,
    /// Latch the shutdown flag and stop further processing.
    Shutdown,
}

// ─── Backpressure ───────────────────────────────────────────────────

/// Coarse load classification derived from total queue fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackpressureLevel {
    Normal,
    Warning,
    Critical,
    Full,
}

impl BackpressureLevel {
    /// Classify a total fill percentage.
    #[inline]
    pub const fn from_fill_pct(pct: u32) -> Self {
        if pct >= BACKPRESSURE_FULL_PCT {
            Self::Full
        } else if pct >= BACKPRESSURE_CRITICAL_PCT {
            Self::Critical
        } else if pct >= BACKPRESSURE_WARNING_PCT {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

// ─── Payloads ───────────────────────────────────────────────────────

/// Queued fault report, as published by the producer.
///
/// Fixed 16-byte layout, no indirections: entries are copied in and out of
/// the priority rings.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultEntry {
    /// Registered fault point index.
    pub fault_index: u16,
    /// Priority the producer reported at.
    pub priority: FaultPriority,
    /// Opaque 32-bit user datum.
    pub detail: u32,
    /// Monotonic microseconds, captured once at report time.
    pub timestamp_us: u64,
}

const_assert_eq!(core::mem::size_of::<FaultEntry>(), 16);
const_assert_eq!(core::mem::align_of::<FaultEntry>(), 8);

/// Processed fault event, synthesized by the consumer.
///
/// Extends the queued entry with the descriptor's classification code, the
/// post-increment occurrence count, and a first-occurrence marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEvent {
    pub fault_index: u16,
    pub priority: FaultPriority,
    /// User-assigned classification code from the descriptor.
    pub fault_code: u32,
    pub detail: u32,
    pub timestamp_us: u64,
    /// Occurrences since the last clear, including this one.
    pub occurrence_count: u32,
    /// True iff this is the first occurrence since the last clear.
    pub is_first: bool,
}

/// One slot of the recent-event ring, as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecentFaultInfo {
    pub fault_index: u16,
    pub detail: u32,
    pub priority: FaultPriority,
    pub timestamp_us: u64,
}

// ─── Callback Types ─────────────────────────────────────────────────
//
// Boxed at configuration time only; the report/process hot paths merely
// invoke them. No exceptions or panics may cross a callback.

/// Per-fault (or default) hook: inspects an event, returns its verdict.
pub type FaultHook = Box<dyn Fn(&FaultEvent) -> HookAction + Send + Sync>;

/// Invoked when a report is rejected by admission or physical capacity.
pub type OverflowHook = Box<dyn Fn(u16, FaultPriority) + Send + Sync>;

/// Invoked once when a hook latches the shutdown flag.
pub type ShutdownHook = Box<dyn Fn() + Send + Sync>;

/// Invoked by the consumer once per processed entry; must not re-enter
/// the reporting path.
pub type BusNotifier = Box<dyn Fn(&FaultEvent) + Send + Sync>;
