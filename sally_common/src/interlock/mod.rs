//! Interlock shared types.
//!
//! Everything the sequencer exposes to other modules lives here: gate and
//! direction identifiers, the flat machine-state enum, cycle faults and the
//! indicator bitflags published to the status task and the output adapter.

pub mod error;
pub mod state;
pub mod status;
