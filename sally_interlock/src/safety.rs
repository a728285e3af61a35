//! Safety module root.
//!
//! Stuck-gate recovery and the never-both-open monitor.

pub mod interlock;
pub mod recovery;
