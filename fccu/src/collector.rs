//! The fault collector: registration, priority-buffered reporting, and the
//! single-consumer processing pipeline.
//!
//! ## Phases
//!
//! Configuration (`&mut self`): register fault points, bind hooks and
//! per-fault state machines, install callbacks. Runtime (`&self`): one
//! producer reports, one consumer processes; all runtime state is atomic,
//! so the collector is `Sync` and both sides may live on different threads
//! under the SPSC contract.
//!
//! ## Processing pipeline
//!
//! For each drained entry: defensive index re-check → occurrence count →
//! event synthesis → recent ring → bus notifier → confirmation check →
//! hook → action (clear / escalate / defer / shutdown latch).

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use tracing::{debug, trace, warn};

use fccu_common::attr::FaultAttr;
use fccu_common::clock::{Clock, MonotonicClock};
use fccu_common::config::FccuConfig;
use fccu_common::consts::{
    MAX_FAULT_HSM_SLOTS, MAX_FAULT_POINTS, MAX_QUEUE_LEVELS, PRIORITY_COUNT, RECENT_RING_SIZE,
};
use fccu_common::error::FccuError;
use fccu_common::stats::FaultStatistics;
use fccu_common::types::{
    BackpressureLevel, BusNotifier, FaultEntry, FaultEvent, FaultHook, FaultPriority, HookAction,
    OverflowHook, RecentFaultInfo, ShutdownHook,
};

use crate::bitmap::ActiveBitmap;
use crate::hsm::global::{GlobalEvent, GlobalHsm};
use crate::hsm::per_fault::{PerFaultEvent, PerFaultHsm};
use crate::queue::FaultQueueSet;
use crate::reporter::{FaultReporter, ReportSink};
use crate::table::FaultTable;

// ─── Statistics Counters ────────────────────────────────────────────

/// Live monotonic counters; snapshot via [`FaultStatistics`].
struct StatCounters {
    total_reported: AtomicU64,
    total_processed: AtomicU64,
    total_dropped: AtomicU64,
    priority_reported: [AtomicU64; PRIORITY_COUNT],
    priority_dropped: [AtomicU64; PRIORITY_COUNT],
}

impl StatCounters {
    fn new() -> Self {
        Self {
            total_reported: AtomicU64::new(0),
            total_processed: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
            priority_reported: std::array::from_fn(|_| AtomicU64::new(0)),
            priority_dropped: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// `tier` is the raw priority discriminant (0..=3), not the clamped
    /// queue level, so per-priority attribution survives level clamping.
    fn note_reported(&self, tier: usize) {
        self.total_reported.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.priority_reported.get(tier) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn note_dropped(&self, tier: usize) {
        self.total_dropped.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.priority_dropped.get(tier) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn note_processed(&self) {
        self.total_processed.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FaultStatistics {
        FaultStatistics {
            total_reported: self.total_reported.load(Ordering::Relaxed),
            total_processed: self.total_processed.load(Ordering::Relaxed),
            total_dropped: self.total_dropped.load(Ordering::Relaxed),
            priority_reported: std::array::from_fn(|i| {
                self.priority_reported[i].load(Ordering::Relaxed)
            }),
            priority_dropped: std::array::from_fn(|i| {
                self.priority_dropped[i].load(Ordering::Relaxed)
            }),
        }
    }

    fn reset(&self) {
        self.total_reported.store(0, Ordering::Relaxed);
        self.total_processed.store(0, Ordering::Relaxed);
        self.total_dropped.store(0, Ordering::Relaxed);
        for counter in &self.priority_reported {
            counter.store(0, Ordering::Relaxed);
        }
        for counter in &self.priority_dropped {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

// ─── Recent Event Ring ──────────────────────────────────────────────

/// One recent-event slot, packed into two atomic words so concurrent
/// observers never see a torn word (a torn *pair* between meta and
/// timestamp is tolerated and documented).
struct RecentSlot {
    /// `[0..32)` detail, `[32..48)` fault index, `[48..56)` priority.
    meta: AtomicU64,
    timestamp_us: AtomicU64,
}

/// Fixed rotating buffer of the last [`RECENT_RING_SIZE`] processed events.
/// Written only by the consumer.
struct RecentRing {
    slots: [RecentSlot; RECENT_RING_SIZE],
    head: AtomicUsize,
    len: AtomicUsize,
}

impl RecentRing {
    fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| RecentSlot {
                meta: AtomicU64::new(0),
                timestamp_us: AtomicU64::new(0),
            }),
            head: AtomicUsize::new(0),
            len: AtomicUsize::new(0),
        }
    }

    fn record(&self, event: &FaultEvent) {
        let head = self.head.load(Ordering::Relaxed);
        let slot = &self.slots[head];
        let meta = (event.detail as u64)
            | ((event.fault_index as u64) << 32)
            | ((event.priority as u8 as u64) << 48);
        slot.meta.store(meta, Ordering::Relaxed);
        slot.timestamp_us.store(event.timestamp_us, Ordering::Relaxed);
        self.head.store((head + 1) % RECENT_RING_SIZE, Ordering::Release);
        let len = self.len.load(Ordering::Relaxed);
        if len < RECENT_RING_SIZE {
            self.len.store(len + 1, Ordering::Relaxed);
        }
    }

    /// Visit up to `max` slots, newest first.
    fn for_each(&self, max: usize, mut visit: impl FnMut(RecentFaultInfo)) {
        let head = self.head.load(Ordering::Acquire);
        let count = self.len.load(Ordering::Relaxed).min(max);
        for offset in 0..count {
            let index = (head + RECENT_RING_SIZE - 1 - offset) % RECENT_RING_SIZE;
            let slot = &self.slots[index];
            let meta = slot.meta.load(Ordering::Relaxed);
            visit(RecentFaultInfo {
                fault_index: ((meta >> 32) & 0xFFFF) as u16,
                detail: (meta & 0xFFFF_FFFF) as u32,
                priority: FaultPriority::from_u8(((meta >> 48) & 0xFF) as u8)
                    .unwrap_or(FaultPriority::Medium),
                timestamp_us: slot.timestamp_us.load(Ordering::Relaxed),
            });
        }
    }

    fn reset(&self) {
        self.head.store(0, Ordering::Relaxed);
        self.len.store(0, Ordering::Relaxed);
    }
}

// ─── Fault Collector ────────────────────────────────────────────────

/// Deterministic, bounded-memory fault collection and control unit.
///
/// Sizing is fixed at compile time:
/// - `MAX_FAULTS` — registrable fault points (1..=256)
/// - `QUEUE_DEPTH` — per-level ring capacity (power of two)
/// - `QUEUE_LEVELS` — priority levels (1..=8)
/// - `MAX_PER_FAULT_HSM` — per-fault state machine slots (<=16)
///
/// All buffers are pre-allocated in `new`; report and process paths never
/// allocate.
pub struct FaultCollector<
    const MAX_FAULTS: usize = 64,
    const QUEUE_DEPTH: usize = 32,
    const QUEUE_LEVELS: usize = 4,
    const MAX_PER_FAULT_HSM: usize = 8,
> {
    queues: FaultQueueSet<FaultEntry, QUEUE_LEVELS, QUEUE_DEPTH>,
    table: FaultTable<MAX_FAULTS>,
    active: ActiveBitmap,
    stats: StatCounters,
    global: GlobalHsm,
    fault_hsms: [PerFaultHsm; MAX_PER_FAULT_HSM],
    bound_hsms: usize,
    overflow_hook: Option<OverflowHook>,
    shutdown_hook: Option<ShutdownHook>,
    bus_notifier: Option<BusNotifier>,
    recent: RecentRing,
    shutdown_requested: AtomicBool,
    clock: Box<dyn Clock>,
}

impl<
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_PER_FAULT_HSM: usize,
    > FaultCollector<MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_PER_FAULT_HSM>
{
    /// Collector with the default monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(MonotonicClock::new()))
    }

    /// Collector with an injected timestamp source.
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        const {
            assert!(MAX_FAULTS >= 1 && MAX_FAULTS <= MAX_FAULT_POINTS, "1..=256 fault points");
            assert!(QUEUE_DEPTH.is_power_of_two(), "queue depth must be a power of two");
            assert!(QUEUE_LEVELS >= 1 && QUEUE_LEVELS <= MAX_QUEUE_LEVELS, "1..=8 queue levels");
            assert!(MAX_PER_FAULT_HSM <= MAX_FAULT_HSM_SLOTS, "at most 16 per-fault machines");
        }
        Self {
            queues: FaultQueueSet::new(),
            table: FaultTable::new(),
            active: ActiveBitmap::new(),
            stats: StatCounters::new(),
            global: GlobalHsm::new(),
            fault_hsms: std::array::from_fn(|_| PerFaultHsm::unbound()),
            bound_hsms: 0,
            overflow_hook: None,
            shutdown_hook: None,
            bus_notifier: None,
            recent: RecentRing::new(),
            shutdown_requested: AtomicBool::new(false),
            clock,
        }
    }

    // ─── Configuration ──────────────────────────────────────────────

    /// Register a fault point. Once-only per index; a zero threshold
    /// clamps to 1.
    pub fn register_fault(
        &mut self,
        fault_index: u16,
        code: u32,
        attr: FaultAttr,
        err_threshold: u32,
    ) -> Result<(), FccuError> {
        self.table.register(fault_index, code, attr, err_threshold)?;
        debug!(index = fault_index, code, "fault point registered");
        Ok(())
    }

    /// Bind (or replace) the hook invoked when this fault is processed.
    pub fn register_hook(&mut self, fault_index: u16, hook: FaultHook) -> Result<(), FccuError> {
        self.table.register_hook(fault_index, hook)
    }

    /// Fallback hook for descriptors without one. Absent both, processed
    /// entries are treated as handled.
    pub fn set_default_hook(&mut self, hook: FaultHook) {
        self.table.set_default_hook(hook);
    }

    /// Out-of-band observer for rejected reports; not a recovery path.
    pub fn set_overflow_callback(&mut self, hook: OverflowHook) {
        self.overflow_hook = Some(hook);
    }

    /// Invoked once when a hook latches the shutdown flag.
    pub fn set_shutdown_callback(&mut self, hook: ShutdownHook) {
        self.shutdown_hook = Some(hook);
    }

    /// Invoked by the consumer once per processed entry. Must not re-enter
    /// the reporting path.
    pub fn set_bus_notifier(&mut self, notifier: BusNotifier) {
        self.bus_notifier = Some(notifier);
    }

    /// Bind a per-fault state machine to `fault_index` with its own
    /// confirmation threshold.
    ///
    /// At most one machine binds a given index: binding an index that is
    /// already bound rebinds that machine in place (new threshold, state
    /// back to Dormant) without consuming another slot.
    pub fn bind_fault_hsm(&mut self, fault_index: u16, threshold: u32) -> Result<(), FccuError> {
        if fault_index as usize >= MAX_FAULTS {
            return Err(FccuError::InvalidIndex);
        }
        let bound = self.bound_hsms;
        if let Some(hsm) = self.fault_hsms[..bound]
            .iter_mut()
            .find(|hsm| hsm.fault_index() == fault_index)
        {
            hsm.bind(fault_index, threshold);
            debug!(index = fault_index, threshold, "per-fault state machine rebound");
            return Ok(());
        }
        if bound >= MAX_PER_FAULT_HSM {
            return Err(FccuError::HsmSlotFull);
        }
        self.fault_hsms[bound].bind(fault_index, threshold);
        self.bound_hsms += 1;
        debug!(index = fault_index, threshold, "per-fault state machine bound");
        Ok(())
    }

    /// Register every fault point a manifest declares.
    pub fn apply_config(&mut self, config: &FccuConfig) -> Result<(), FccuError> {
        for point in &config.faults {
            self.register_fault(
                point.index,
                point.code,
                FaultAttr::from_raw(point.attr),
                point.threshold,
            )?;
            if point.bind_hsm {
                self.bind_fault_hsm(point.index, point.hsm_threshold.unwrap_or(point.threshold))?;
            }
            trace!(index = point.index, name = %point.name, "fault point from manifest");
        }
        debug!(points = config.faults.len(), "fault manifest applied");
        Ok(())
    }

    // ─── Reporting (producer side, hot path) ────────────────────────

    /// Report a fault occurrence.
    ///
    /// Fails fast on unknown or unregistered indices. Rejection by the
    /// admission policy and physical overflow both return `QueueFull`,
    /// bump the drop counters, and fire the overflow callback.
    pub fn report_fault(
        &self,
        fault_index: u16,
        detail: u32,
        priority: FaultPriority,
    ) -> Result<(), FccuError> {
        self.table.lookup_registered(fault_index)?;

        let level = priority.level(QUEUE_LEVELS);
        let entry = FaultEntry {
            fault_index,
            priority,
            detail,
            timestamp_us: self.clock.now_us(),
        };

        if let Err(cause) = self.queues.push_with_admission(level, entry) {
            self.stats.note_dropped(priority as usize);
            trace!(index = fault_index, level, ?cause, "fault report dropped");
            if let Some(overflow) = &self.overflow_hook {
                overflow(fault_index, priority);
            }
            return Err(FccuError::QueueFull);
        }

        self.active.set(fault_index as usize);
        self.stats.note_reported(priority as usize);

        self.dispatch_fault_event(fault_index, PerFaultEvent::Detected);

        if self.global.is_idle() {
            self.global.dispatch(GlobalEvent::FaultReported);
        }
        if priority == FaultPriority::Critical && !self.global.is_degraded() {
            self.global.dispatch(GlobalEvent::CriticalDetected);
            self.global.record_critical();
        }

        Ok(())
    }

    // ─── Processing (consumer side) ─────────────────────────────────

    /// Drain the queue set to empty, running the pipeline on each entry.
    ///
    /// Returns the number of entries drained. Inert (returns 0 without
    /// draining) once a hook has requested shutdown, until [`reset`](Self::reset).
    pub fn process_faults(&self) -> usize {
        if self.shutdown_requested.load(Ordering::Acquire) {
            return 0;
        }
        let mut drained = 0;
        while let Some((entry, _level)) = self.queues.pop() {
            self.process_entry(&entry);
            drained += 1;
        }
        drained
    }

    fn process_entry(&self, entry: &FaultEntry) {
        let Some(slot) = self.table.get(entry.fault_index) else {
            return;
        };

        let previous = slot.record_occurrence();
        let event = FaultEvent {
            fault_index: entry.fault_index,
            priority: entry.priority,
            fault_code: slot.code(),
            detail: entry.detail,
            timestamp_us: entry.timestamp_us,
            occurrence_count: previous.wrapping_add(1),
            is_first: previous == 0,
        };

        self.recent.record(&event);

        if let Some(notify) = &self.bus_notifier {
            notify(&event);
        }

        if event.occurrence_count >= slot.err_threshold() {
            self.dispatch_fault_event(entry.fault_index, PerFaultEvent::Confirmed);
        }

        let action = self
            .table
            .hook_for(slot)
            .map_or(HookAction::Handled, |hook| hook(&event));

        match action {
            HookAction::Handled => {
                self.active.clear(entry.fault_index as usize);
                self.dispatch_fault_event(entry.fault_index, PerFaultEvent::ClearFault);
                if self.active.count_ones() == 0 {
                    self.global.dispatch(GlobalEvent::AllCleared);
                }
            }
            HookAction::Escalate => self.escalate(entry),
            HookAction::Defer => {}
            HookAction::Shutdown => {
                self.shutdown_requested.store(true, Ordering::Release);
                self.global.dispatch(GlobalEvent::ShutdownReq);
                warn!(index = entry.fault_index, "shutdown requested by fault hook");
                if let Some(shutdown) = &self.shutdown_hook {
                    shutdown();
                }
            }
        }

        self.stats.note_processed();
    }

    /// Re-enqueue one level higher, bypassing admission (the entry was
    /// already accepted once). At Critical this is a no-op.
    fn escalate(&self, entry: &FaultEntry) {
        let Some(raised) = entry.priority.raise() else {
            return;
        };
        let escalated = FaultEntry {
            priority: raised,
            timestamp_us: self.clock.now_us(),
            ..*entry
        };
        let level = raised.level(QUEUE_LEVELS);
        debug!(index = entry.fault_index, to = raised.as_str(), "fault escalated");
        if self.queues.push(level, escalated).is_err() {
            self.stats.note_dropped(raised as usize);
            warn!(index = entry.fault_index, "escalated entry dropped");
        }
    }

    fn dispatch_fault_event(&self, fault_index: u16, event: PerFaultEvent) {
        for hsm in &self.fault_hsms[..self.bound_hsms] {
            if hsm.fault_index() == fault_index {
                hsm.dispatch(event);
                return;
            }
        }
    }

    // ─── Queries & Clearing ─────────────────────────────────────────

    /// Whether `fault_index` is currently active (reported, not cleared).
    pub fn is_fault_active(&self, fault_index: u16) -> bool {
        (fault_index as usize) < MAX_FAULTS && self.active.is_set(fault_index as usize)
    }

    /// Number of currently-active fault indices.
    pub fn active_fault_count(&self) -> usize {
        self.active.count_ones()
    }

    /// Clear one fault: active bit, occurrence counter, bound state
    /// machine. Idempotent.
    pub fn clear_fault(&self, fault_index: u16) {
        if fault_index as usize >= MAX_FAULTS {
            return;
        }
        self.active.clear(fault_index as usize);
        if let Some(slot) = self.table.get(fault_index) {
            slot.reset_occurrences();
        }
        self.dispatch_fault_event(fault_index, PerFaultEvent::ClearFault);
        if self.active.count_ones() == 0 {
            self.global.dispatch(GlobalEvent::AllCleared);
        }
    }

    /// Clear everything: bitmap, every occurrence counter, every bound
    /// state machine; the global machine sees `AllCleared`.
    pub fn clear_all_faults(&self) {
        self.active.clear_all();
        self.table.reset_all_occurrences();
        for hsm in &self.fault_hsms[..self.bound_hsms] {
            hsm.reset();
        }
        self.global.dispatch(GlobalEvent::AllCleared);
        debug!("all faults cleared");
    }

    /// Snapshot of the monotonic counters.
    pub fn statistics(&self) -> FaultStatistics {
        self.stats.snapshot()
    }

    pub fn reset_statistics(&self) {
        self.stats.reset();
    }

    /// Coarse load classification over total queue fill.
    pub fn backpressure_level(&self) -> BackpressureLevel {
        let total = self.queues.total_len();
        let capacity = QUEUE_DEPTH * QUEUE_LEVELS;
        BackpressureLevel::from_fill_pct(((total * 100) / capacity) as u32)
    }

    /// Visit up to `max` recent events, newest first.
    pub fn for_each_recent(&self, max: usize, visit: impl FnMut(RecentFaultInfo)) {
        self.recent.for_each(max, visit);
    }

    /// Detached reporting handle for producers that must not see the
    /// collector type.
    pub fn reporter(&self) -> FaultReporter<'_> {
        FaultReporter::new(self)
    }

    pub fn global_hsm(&self) -> &GlobalHsm {
        &self.global
    }

    /// The per-fault state machine bound to `fault_index`, if any.
    pub fn fault_hsm(&self, fault_index: u16) -> Option<&PerFaultHsm> {
        self.fault_hsms[..self.bound_hsms]
            .iter()
            .find(|hsm| hsm.fault_index() == fault_index)
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Signal that the critical condition is resolved; the global machine
    /// leaves Degraded. Never synthesized internally: recovery stays under
    /// user control.
    pub fn notify_critical_resolved(&self) -> bool {
        self.global.dispatch(GlobalEvent::DegradeRecovered)
    }

    /// Clear the shutdown latch and return the global machine to Idle,
    /// making processing live again after a hook-initiated shutdown.
    pub fn reset(&self) {
        self.shutdown_requested.store(false, Ordering::Release);
        self.global.reset();
        self.recent.reset();
        debug!("collector reset");
    }
}

impl<
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_PER_FAULT_HSM: usize,
    > Default for FaultCollector<MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_PER_FAULT_HSM>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<
        const MAX_FAULTS: usize,
        const QUEUE_DEPTH: usize,
        const QUEUE_LEVELS: usize,
        const MAX_PER_FAULT_HSM: usize,
    > ReportSink for FaultCollector<MAX_FAULTS, QUEUE_DEPTH, QUEUE_LEVELS, MAX_PER_FAULT_HSM>
{
    fn report_fault(
        &self,
        fault_index: u16,
        detail: u32,
        priority: FaultPriority,
    ) -> Result<(), FccuError> {
        FaultCollector::report_fault(self, fault_index, detail, priority)
    }
}
