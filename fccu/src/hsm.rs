//! Two-layer fault state machines.
//!
//! Layer 1: [`global::GlobalHsm`] — aggregate fault condition
//! (Idle/Active/Degraded/Shutdown).
//!
//! Layer 2: [`per_fault::PerFaultHsm`] — individual critical fault
//! lifecycles (Dormant/Detected/Active/Recovering/Cleared), bound to one
//! fault index each.
//!
//! Both machines keep their state in atomics so producer and consumer may
//! dispatch concurrently under the SPSC contract; transitions are CAS-based
//! and events that do not match the current state are silently ignored.

pub mod global;
pub mod per_fault;
