//! Packed atomic bitmap of currently-active fault indices.
//!
//! All orderings are relaxed: the bitmap reports an approximation consistent
//! with the causal order of set/clear operations but is not serialized
//! against concurrent mutation. Sized for the 256-point hard limit; bits
//! beyond a collector's configured table range are simply never set.

use std::sync::atomic::{AtomicU64, Ordering};

use fccu_common::consts::BITMAP_WORDS;

/// Atomic bitmap with one bit per fault index.
#[derive(Debug)]
pub struct ActiveBitmap {
    words: [AtomicU64; BITMAP_WORDS],
}

impl ActiveBitmap {
    pub fn new() -> Self {
        Self {
            words: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// Mark fault `index` active. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&self, index: usize) {
        if let Some(word) = self.words.get(index / 64) {
            word.fetch_or(1u64 << (index % 64), Ordering::Relaxed);
        }
    }

    /// Mark fault `index` inactive. Out-of-range indices are ignored.
    #[inline]
    pub fn clear(&self, index: usize) {
        if let Some(word) = self.words.get(index / 64) {
            word.fetch_and(!(1u64 << (index % 64)), Ordering::Relaxed);
        }
    }

    /// Whether fault `index` is currently active.
    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|word| word.load(Ordering::Relaxed) & (1u64 << (index % 64)) != 0)
    }

    /// Population count across all words.
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    /// Zero the whole bitmap.
    pub fn clear_all(&self) {
        for word in &self.words {
            word.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for ActiveBitmap {
    fn default() -> Self {
        Self::new()
    }
}
