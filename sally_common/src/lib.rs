//! Sally Common Library
//!
//! Shared constants, configuration loading, role-based digital I/O and the
//! interlock types exchanged between the sequencer, the I/O drivers and the
//! status task.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading trait and shared config types
//! - [`consts`] - Workspace-wide numeric limits and defaults
//! - [`hal`] - I/O driver trait and error types
//! - [`interlock`] - Gate identifiers, machine states, faults, indicators
//! - [`io`] - `io.toml` parsing and the role registry
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use sally_common::prelude::*;
//!
//! let gate = GateId::Outer;
//! assert_eq!(gate.other(), GateId::Inner);
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod interlock;
pub mod io;
pub mod prelude;
