//! Fault descriptor registry.
//!
//! Dense array indexed by fault index. Registration and hook binding run in
//! the configuration phase (`&mut self`); after that the table is
//! read-dominated, with only the occurrence counters mutating.

use std::sync::atomic::{AtomicU32, Ordering};

use fccu_common::attr::FaultAttr;
use fccu_common::consts::MAX_FAULT_POINTS;
use fccu_common::error::FccuError;
use fccu_common::types::FaultHook;

/// One fault point descriptor.
pub struct FaultSlot {
    code: u32,
    attr: FaultAttr,
    err_threshold: u32,
    registered: bool,
    occurrence_count: AtomicU32,
    hook: Option<FaultHook>,
}

impl FaultSlot {
    fn vacant() -> Self {
        Self {
            code: 0,
            attr: FaultAttr::empty(),
            err_threshold: 1,
            registered: false,
            occurrence_count: AtomicU32::new(0),
            hook: None,
        }
    }

    /// User-assigned classification code.
    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn attr(&self) -> FaultAttr {
        self.attr
    }

    /// Occurrences required to confirm; always >= 1.
    pub fn err_threshold(&self) -> u32 {
        self.err_threshold
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Occurrences processed since the last clear. Wraps at `2^32`.
    pub fn occurrences(&self) -> u32 {
        self.occurrence_count.load(Ordering::Relaxed)
    }

    /// Post-increment the occurrence counter, returning the previous value.
    pub(crate) fn record_occurrence(&self) -> u32 {
        self.occurrence_count.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn reset_occurrences(&self) {
        self.occurrence_count.store(0, Ordering::Relaxed);
    }
}

/// Registry of up to `MAX_FAULTS` fault descriptors plus the default hook.
pub struct FaultTable<const MAX_FAULTS: usize> {
    slots: [FaultSlot; MAX_FAULTS],
    default_hook: Option<FaultHook>,
}

impl<const MAX_FAULTS: usize> FaultTable<MAX_FAULTS> {
    pub fn new() -> Self {
        const {
            assert!(
                MAX_FAULTS >= 1 && MAX_FAULTS <= MAX_FAULT_POINTS,
                "fault table size must be 1..=256"
            );
        }
        Self {
            slots: std::array::from_fn(|_| FaultSlot::vacant()),
            default_hook: None,
        }
    }

    /// Register a fault point; once-only per index. A zero threshold
    /// clamps to 1.
    pub fn register(
        &mut self,
        fault_index: u16,
        code: u32,
        attr: FaultAttr,
        err_threshold: u32,
    ) -> Result<(), FccuError> {
        let slot = self
            .slots
            .get_mut(fault_index as usize)
            .ok_or(FccuError::InvalidIndex)?;
        if slot.registered {
            return Err(FccuError::AlreadyRegistered);
        }
        slot.code = code;
        slot.attr = attr;
        slot.err_threshold = err_threshold.max(1);
        slot.registered = true;
        Ok(())
    }

    /// Bind (or replace) the hook of a registered fault point.
    pub fn register_hook(&mut self, fault_index: u16, hook: FaultHook) -> Result<(), FccuError> {
        let slot = self
            .slots
            .get_mut(fault_index as usize)
            .ok_or(FccuError::InvalidIndex)?;
        if !slot.registered {
            return Err(FccuError::NotRegistered);
        }
        slot.hook = Some(hook);
        Ok(())
    }

    /// Install the fallback hook used when a descriptor has none bound.
    pub fn set_default_hook(&mut self, hook: FaultHook) {
        self.default_hook = Some(hook);
    }

    /// Producer-side lookup: index must be in range and registered.
    pub fn lookup_registered(&self, fault_index: u16) -> Result<&FaultSlot, FccuError> {
        let slot = self
            .slots
            .get(fault_index as usize)
            .ok_or(FccuError::InvalidIndex)?;
        if !slot.registered {
            return Err(FccuError::NotRegistered);
        }
        Ok(slot)
    }

    /// Consumer-side lookup; range is re-checked defensively.
    pub(crate) fn get(&self, fault_index: u16) -> Option<&FaultSlot> {
        self.slots.get(fault_index as usize)
    }

    /// The hook to run for a slot: its own, else the default.
    pub(crate) fn hook_for<'a>(&'a self, slot: &'a FaultSlot) -> Option<&'a FaultHook> {
        slot.hook.as_ref().or(self.default_hook.as_ref())
    }

    pub(crate) fn reset_all_occurrences(&self) {
        for slot in &self.slots {
            slot.reset_occurrences();
        }
    }
}

impl<const MAX_FAULTS: usize> Default for FaultTable<MAX_FAULTS> {
    fn default() -> Self {
        Self::new()
    }
}
