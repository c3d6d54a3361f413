//! User-assigned fault attribute flags.
//!
//! Attributes travel with the fault descriptor but are opaque to the
//! collector core: it stores and echoes them without interpreting any bit.
//! The named bits below are a user-level convention; arbitrary raw words
//! round-trip via [`FaultAttr::from_raw`].

use bitflags::bitflags;

bitflags! {
    /// 32-bit attribute word attached to a fault descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultAttr: u32 {
        /// Fault participates in the safety argument of the system.
        const SAFETY_RELEVANT = 0x0001;
        /// Fault stays latched until an explicit operator clear.
        const LATCHING        = 0x0002;
        /// A recovery procedure exists and may be started automatically.
        const AUTO_RECOVER    = 0x0004;
        /// Informational only; never escalated by handlers.
        const DIAGNOSTIC     = 0x0008;
    }
}

impl FaultAttr {
    /// Wrap a raw attribute word, preserving unknown bits.
    #[inline]
    pub const fn from_raw(value: u32) -> Self {
        Self::from_bits_retain(value)
    }

    /// The raw attribute word.
    #[inline]
    pub const fn raw(&self) -> u32 {
        self.bits()
    }
}

impl Default for FaultAttr {
    fn default() -> Self {
        Self::empty()
    }
}
