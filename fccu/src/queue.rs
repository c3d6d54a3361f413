//! Priority-stratified fault entry buffering.
//!
//! [`SpscRing`] is a bounded lock-free ring for trivially copyable entries;
//! [`FaultQueueSet`] stacks one ring per priority level and applies the
//! admission policy on the producer side.
//!
//! ## Publication Protocol
//!
//! Each slot carries a sequence stamp: the producer claims a position,
//! writes the payload, then stores the stamp with release ordering; the
//! consumer's acquire load of the stamp is what makes the payload visible.
//! This is the same publish-then-stamp discipline as a seqcount-guarded
//! shared segment, applied per slot, and it keeps the safe API memory-safe
//! even if the single-producer/single-consumer contract is violated: a
//! rogue second consumer observes spurious empty, never a torn payload.
//!
//! Thread safety: exactly one producer and one consumer at any instant.
//! Size reads are approximations; the admission thresholds have slack for
//! that.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

use fccu_common::consts::{ADMIT_HIGH_PCT, ADMIT_LOW_PCT, ADMIT_MEDIUM_PCT, MAX_QUEUE_LEVELS};

/// Why a push was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushRejected {
    /// Target ring is at physical capacity.
    Full,
    /// Priority admission policy refused the entry.
    AdmissionDenied,
    /// Level index beyond the configured level count.
    InvalidLevel,
}

struct Slot<T> {
    /// Sequence stamp: `pos` = free, `pos + 1` = occupied.
    seq: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Bounded lock-free ring buffer for `Copy` payloads.
///
/// `N` must be a power of two (checked at compile time).
pub struct SpscRing<T, const N: usize> {
    slots: [Slot<T>; N],
    enqueue_pos: AtomicUsize,
    dequeue_pos: AtomicUsize,
}

// SAFETY: slots are only written by the position holder between claiming a
// position (CAS) and publishing the stamp (release store); readers only
// touch a slot after an acquire load of a published stamp.
unsafe impl<T: Send, const N: usize> Sync for SpscRing<T, N> {}
unsafe impl<T: Send, const N: usize> Send for SpscRing<T, N> {}

impl<T: Copy, const N: usize> SpscRing<T, N> {
    const MASK: usize = N - 1;

    pub fn new() -> Self {
        const {
            assert!(N > 0 && N.is_power_of_two(), "ring capacity must be a power of two");
        }
        Self {
            slots: std::array::from_fn(|i| Slot {
                seq: AtomicUsize::new(i),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            }),
            enqueue_pos: AtomicUsize::new(0),
            dequeue_pos: AtomicUsize::new(0),
        }
    }

    /// Enqueue an item; `false` iff the ring is full.
    pub fn push(&self, item: T) -> bool {
        let mut pos = self.enqueue_pos.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[pos & Self::MASK];
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = (seq as isize).wrapping_sub(pos as isize);
            if diff == 0 {
                match self.enqueue_pos.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // Position claimed: write payload, then publish.
                        unsafe { (*slot.value.get()).write(item) };
                        slot.seq.store(pos.wrapping_add(1), Ordering::Release);
                        return true;
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return false;
            } else {
                pos = self.enqueue_pos.load(Ordering::Relaxed);
            }
        }
    }

    /// Dequeue the oldest item, if any.
    pub fn pop(&self) -> Option<T> {
        let mut pos = self.dequeue_pos.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[pos & Self::MASK];
            let seq = slot.seq.load(Ordering::Acquire);
            let diff = (seq as isize).wrapping_sub(pos.wrapping_add(1) as isize);
            if diff == 0 {
                match self.dequeue_pos.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the acquire load above synchronized with the
                        // producer's release store, so the payload is initialized.
                        let item = unsafe { (*slot.value.get()).assume_init_read() };
                        slot.seq.store(pos.wrapping_add(N), Ordering::Release);
                        return Some(item);
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return None;
            } else {
                pos = self.dequeue_pos.load(Ordering::Relaxed);
            }
        }
    }

    /// Approximate occupancy.
    pub fn len(&self) -> usize {
        let head = self.enqueue_pos.load(Ordering::Relaxed);
        let tail = self.dequeue_pos.load(Ordering::Relaxed);
        head.wrapping_sub(tail).min(N)
    }

    /// Approximate free slots.
    pub fn available(&self) -> usize {
        N - self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T: Copy, const N: usize> Default for SpscRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Priority Queue Set ─────────────────────────────────────────────

/// Array of `LEVELS` independent rings, level 0 = highest priority.
///
/// The producer chooses a level per entry; the consumer drains level 0
/// first. Starvation of lower levels while higher ones stay non-empty is
/// intentional; the consumer is expected to drain to empty.
pub struct FaultQueueSet<T, const LEVELS: usize, const DEPTH: usize> {
    levels: [SpscRing<T, DEPTH>; LEVELS],
}

impl<T: Copy, const LEVELS: usize, const DEPTH: usize> FaultQueueSet<T, LEVELS, DEPTH> {
    /// Fill at or above this refuses level 1 entries.
    pub const HIGH_THRESHOLD: usize = (DEPTH * ADMIT_HIGH_PCT) / 100;
    /// Fill at or above this refuses level 2 entries.
    pub const MEDIUM_THRESHOLD: usize = (DEPTH * ADMIT_MEDIUM_PCT) / 100;
    /// Fill at or above this refuses level 3+ entries.
    pub const LOW_THRESHOLD: usize = (DEPTH * ADMIT_LOW_PCT) / 100;

    pub fn new() -> Self {
        const {
            assert!(LEVELS >= 1 && LEVELS <= MAX_QUEUE_LEVELS, "1..=8 queue levels");
        }
        Self {
            levels: std::array::from_fn(|_| SpscRing::new()),
        }
    }

    /// Unconditional push into the chosen level.
    pub fn push(&self, level: usize, item: T) -> Result<(), PushRejected> {
        let Some(queue) = self.levels.get(level) else {
            return Err(PushRejected::InvalidLevel);
        };
        if queue.push(item) {
            Ok(())
        } else {
            Err(PushRejected::Full)
        }
    }

    /// Push gated by the priority admission policy.
    ///
    /// Level 0 is always admitted (physical capacity permitting); levels
    /// 1, 2 and 3+ are refused once the target ring's fill reaches 99%,
    /// 80% and 60% of `DEPTH` respectively.
    pub fn push_with_admission(&self, level: usize, item: T) -> Result<(), PushRejected> {
        let Some(queue) = self.levels.get(level) else {
            return Err(PushRejected::InvalidLevel);
        };
        if !Self::admit(level, queue.len()) {
            return Err(PushRejected::AdmissionDenied);
        }
        if queue.push(item) {
            Ok(())
        } else {
            Err(PushRejected::Full)
        }
    }

    /// Dequeue the highest-priority available entry and its level.
    pub fn pop(&self) -> Option<(T, usize)> {
        for (level, queue) in self.levels.iter().enumerate() {
            if let Some(item) = queue.pop() {
                return Some((item, level));
            }
        }
        None
    }

    fn admit(level: usize, fill: usize) -> bool {
        match level {
            0 => true,
            1 => fill < Self::HIGH_THRESHOLD,
            2 => fill < Self::MEDIUM_THRESHOLD,
            _ => fill < Self::LOW_THRESHOLD,
        }
    }

    /// Approximate occupancy of one level.
    pub fn len(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, SpscRing::len)
    }

    /// Approximate occupancy across all levels.
    pub fn total_len(&self) -> usize {
        self.levels.iter().map(SpscRing::len).sum()
    }

    /// Approximate free slots of one level.
    pub fn available(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, SpscRing::available)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(SpscRing::is_empty)
    }

    pub const fn capacity_per_level() -> usize {
        DEPTH
    }

    pub const fn level_count() -> usize {
        LEVELS
    }
}

impl<T: Copy, const LEVELS: usize, const DEPTH: usize> Default for FaultQueueSet<T, LEVELS, DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}
