//! Numeric limits and policy thresholds for the FCCU workspace.
//!
//! Every sizing bound and percentage cutoff lives here; other crates
//! import these instead of restating them.

use static_assertions::const_assert;

/// Hard upper limit on registrable fault points.
pub const MAX_FAULT_POINTS: usize = 256;

/// Maximum number of priority queue levels.
pub const MAX_QUEUE_LEVELS: usize = 8;

/// Maximum number of per-fault state machine slots.
pub const MAX_FAULT_HSM_SLOTS: usize = 16;

/// Number of named fault priorities (Critical..Low).
pub const PRIORITY_COUNT: usize = 4;

/// Capacity of the recent-event ring.
pub const RECENT_RING_SIZE: usize = 16;

/// Words in the active bitmap, sized for [`MAX_FAULT_POINTS`].
pub const BITMAP_WORDS: usize = MAX_FAULT_POINTS / 64;

// ─── Admission Policy ───────────────────────────────────────────────
//
// A report at level N is admitted while the target queue's fill stays
// below (depth * pct) / 100. Level 0 is always admitted.

/// Admission cutoff for level 1 (High) [%].
pub const ADMIT_HIGH_PCT: usize = 99;

/// Admission cutoff for level 2 (Medium) [%].
pub const ADMIT_MEDIUM_PCT: usize = 80;

/// Admission cutoff for level 3 and below (Low) [%].
pub const ADMIT_LOW_PCT: usize = 60;

// ─── Backpressure Thresholds ────────────────────────────────────────

/// Total fill at or above which backpressure reports `Full` [%].
pub const BACKPRESSURE_FULL_PCT: u32 = 95;

/// Total fill at or above which backpressure reports `Critical` [%].
pub const BACKPRESSURE_CRITICAL_PCT: u32 = 80;

/// Total fill at or above which backpressure reports `Warning` [%].
pub const BACKPRESSURE_WARNING_PCT: u32 = 60;

const_assert!(MAX_FAULT_POINTS % 64 == 0);
const_assert!(RECENT_RING_SIZE.is_power_of_two());
const_assert!(PRIORITY_COUNT <= MAX_QUEUE_LEVELS);
