//! FCCU Common Library
//!
//! Shared data types, constants and configuration loading for the FCCU
//! (Fault Collection and Control Unit) workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide limits and policy constants
//! - [`types`] - Fault entry/event payloads, priorities, hook actions
//! - [`attr`] - User-assigned fault attribute flags
//! - [`error`] - Value-returned failure taxonomy
//! - [`stats`] - Statistics snapshot type
//! - [`clock`] - Monotonic timestamp source abstraction
//! - [`config`] - TOML fault-point manifest loading
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use fccu_common::prelude::*;
//!
//! let priority = FaultPriority::High;
//! assert_eq!(priority.level(4), 1);
//! ```

pub mod attr;
pub mod clock;
pub mod config;
pub mod consts;
pub mod error;
pub mod prelude;
pub mod stats;
pub mod types;
