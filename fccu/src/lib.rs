//! # FCCU — Fault Collection and Control Unit
//!
//! Deterministic, bounded-memory fault collection for embedded and
//! safety-adjacent runtimes: producers report fault occurrences into
//! priority-stratified SPSC rings under admission control; a single
//! consumer drains them through a processing pipeline that de-duplicates
//! via occurrence counters, dispatches user hooks, escalates, and drives a
//! two-layer state machine (aggregate condition + per-fault lifecycles).
//!
//! ## Components
//!
//! 1. [`queue`] — priority SPSC ring set with admission thresholds
//! 2. [`table`] — fault descriptor registry and hook bindings
//! 3. [`bitmap`] — atomic bitmap of currently-active faults
//! 4. [`hsm`] — global and per-fault state machines
//! 5. [`collector`] — the orchestrator tying it all together
//! 6. [`reporter`] — detached reporting handle for decoupled producers
//!
//! ## Zero-Allocation Runtime
//!
//! All buffers are pre-allocated at construction; `report_fault` and
//! `process_faults` never touch the heap. Callbacks are boxed once, during
//! configuration.
//!
//! ## Concurrency Contract
//!
//! One producer, one consumer, possibly on distinct threads (the collector
//! is `Sync`). Multi-producer systems put a message bus in front and let
//! its drain loop be the single producer. No operation blocks or sleeps.
//!
//! ## Example
//!
//! ```rust
//! use fccu::FaultCollector;
//! use fccu_common::prelude::*;
//!
//! let mut collector: FaultCollector<16, 8, 4, 4> = FaultCollector::new();
//! collector.register_fault(0, 0x1001, FaultAttr::empty(), 1)?;
//! collector.register_hook(0, Box::new(|_event| HookAction::Handled))?;
//!
//! collector.report_fault(0, 0xAA, FaultPriority::Medium)?;
//! assert_eq!(collector.active_fault_count(), 1);
//!
//! assert_eq!(collector.process_faults(), 1);
//! assert!(!collector.is_fault_active(0));
//! # Ok::<(), FccuError>(())
//! ```

pub mod bitmap;
pub mod collector;
pub mod hsm;
pub mod queue;
pub mod reporter;
pub mod table;

pub use collector::FaultCollector;
pub use reporter::{FaultReporter, ReportSink};
