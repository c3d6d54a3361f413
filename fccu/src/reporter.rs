//! Detached fault reporting injection point.
//!
//! Producers that must not see the collector type (drivers, protocol
//! plumbing) receive a [`FaultReporter`] and report through it. A
//! default-constructed reporter is a no-op, so reporting paths need no
//! wired-up check.

use std::fmt;

use fccu_common::error::FccuError;
use fccu_common::types::FaultPriority;

/// The capability a reporter forwards to: anything that accepts fault
/// reports. Implemented by the collector.
pub trait ReportSink: Send + Sync {
    fn report_fault(
        &self,
        fault_index: u16,
        detail: u32,
        priority: FaultPriority,
    ) -> Result<(), FccuError>;
}

/// Lightweight, copyable handle forwarding reports into a sink.
///
/// Lifetime-bound to the collector it came from.
#[derive(Clone, Copy, Default)]
pub struct FaultReporter<'a> {
    sink: Option<&'a dyn ReportSink>,
}

impl<'a> FaultReporter<'a> {
    pub fn new(sink: &'a dyn ReportSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// A reporter wired to nothing; every report is a no-op.
    pub const fn unbound() -> Self {
        Self { sink: None }
    }

    /// Forward a report; silently does nothing when unbound. The sink's
    /// verdict (queue full, unregistered, ...) is intentionally dropped:
    /// detached producers have no recovery path anyway.
    pub fn report(&self, fault_index: u16, detail: u32, priority: FaultPriority) {
        if let Some(sink) = self.sink {
            let _ = sink.report_fault(fault_index, detail, priority);
        }
    }

    pub fn is_bound(&self) -> bool {
        self.sink.is_some()
    }
}

impl fmt::Debug for FaultReporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultReporter")
            .field("bound", &self.is_bound())
            .finish()
    }
}
