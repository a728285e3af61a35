//! Never-both-open checks.
//!
//! The sequencer keeps the barriers apart by construction. These checks run
//! after every tick against what was actually commanded and sensed, so a
//! field fault (a gate pushed open by hand mid-cycle) shows up in the log.

use sally_common::interlock::state::GateId;
use thiserror::Error;

use crate::gate::Gates;

/// Commanded/sensed combination that breaks the interlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InterlockViolation {
    /// Both actuators commanded at once.
    #[error("open requested on both gates")]
    BothRequested,

    /// A closed gate is being driven open while the other one stands open.
    #[error("{requested} gate commanded open while {other} gate reads open")]
    OpenAgainstOpen { requested: GateId, other: GateId },
}

/// Both barriers read open.
#[inline]
pub fn is_breach(gates: &Gates) -> bool {
    gates.both_open()
}

/// Gate a stuck recovery should pulse.
///
/// The gate that reads open, outer checked first. With neither open the
/// outer gate is used.
pub fn stuck_target(gates: &Gates) -> GateId {
    GateId::ALL
        .into_iter()
        .find(|gate| gates[*gate].is_open())
        .unwrap_or(GateId::Outer)
}

/// Check the commanded outputs against the sensed gates.
pub fn verify(gates: &Gates) -> Result<(), InterlockViolation> {
    if gates.open_request_count() > 1 {
        return Err(InterlockViolation::BothRequested);
    }
    for gate in GateId::ALL {
        let other = gate.other();
        if gates[gate].is_open_requested() && gates[gate].is_closed() && gates[other].is_open() {
            return Err(InterlockViolation::OpenAgainstOpen {
                requested: gate,
                other,
            });
        }
    }
    Ok(())
}
