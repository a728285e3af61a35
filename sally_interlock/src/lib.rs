//! # Sally-port Interlock
//!
//! Sequencer for a two-barrier airlock: an outer and an inner gate that must
//! never stand open together. Traffic passes inbound (outer, then inner) or
//! outbound (inner, then outer); a jammed gate is pulsed closed by the stuck
//! recovery, and a port with one barrier out of service falls back to
//! single-gate operation.
//!
//! ## Layers
//!
//! 1. **Gate**: sensed levels and the actuator command of one barrier
//! 2. **Sequence**: the shared two-phase routine (transit, single-gate)
//! 3. **Safety**: stuck recovery and never-both-open checks
//! 4. **Controller**: per-tick priority dispatch over one active procedure
//! 5. **Cycle**: fixed-period runner around an `IoDriver`
//!
//! Every wait is ticked state. Nothing in the controller blocks, allocates
//! or returns an error: faults resolve to Idle within the tick that saw them.

pub mod config;
pub mod controller;
pub mod cycle;
pub mod gate;
pub mod io;
pub mod safety;
pub mod sequence;
pub mod status;

pub use controller::InterlockController;
pub use io::{InterlockInputs, Requests};
pub use sequence::Timeouts;
