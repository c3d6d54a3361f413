//! Statistics snapshot for the collector.
//!
//! The live counters are lock-free atomics owned by the collector; this is
//! the coherent-enough copy handed to observers and diagnostic exports.

use serde::Serialize;

use crate::consts::PRIORITY_COUNT;
use crate::types::FaultPriority;

/// Point-in-time copy of the collector's monotonic counters.
///
/// Per-priority arrays are indexed by priority tier 0..=3 (Critical..Low),
/// regardless of how few queue levels the collector is configured with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FaultStatistics {
    /// Reports admitted into the queue set.
    pub total_reported: u64,
    /// Entries drained and run through the processing pipeline.
    pub total_processed: u64,
    /// Reports rejected by admission or physical capacity, plus failed
    /// escalation re-enqueues.
    pub total_dropped: u64,
    pub priority_reported: [u64; PRIORITY_COUNT],
    pub priority_dropped: [u64; PRIORITY_COUNT],
}

impl FaultStatistics {
    /// Reports admitted at the given priority.
    #[inline]
    pub fn reported_at(&self, priority: FaultPriority) -> u64 {
        self.priority_reported[priority as usize]
    }

    /// Reports dropped at the given priority.
    #[inline]
    pub fn dropped_at(&self, priority: FaultPriority) -> u64 {
        self.priority_dropped[priority as usize]
    }

    /// True iff the per-priority arrays sum to their totals.
    pub fn totals_consistent(&self) -> bool {
        self.priority_reported.iter().sum::<u64>() == self.total_reported
            && self.priority_dropped.iter().sum::<u64>() == self.total_dropped
    }
}
