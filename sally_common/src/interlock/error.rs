//! Cycle fault taxonomy.
//!
//! Faults never escape a tick: the controller logs them, records them and
//! returns to `Idle`. There is no latched error state and no retry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::GateId;

/// Reason an interlock procedure gave up before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum CycleFault {
    /// Gate did not report open within the open budget.
    #[error("{gate} gate failed to open within {ticks} ticks")]
    OpenTimeout { gate: GateId, ticks: u32 },

    /// Gate did not reclose within the close budget. Safety relevant: the
    /// aggregate-open indicator is left raised.
    #[error("{gate} gate failed to reclose within {ticks} ticks")]
    CloseTimeout { gate: GateId, ticks: u32 },

    /// Neither bound gate is enabled.
    #[error("no enabled gate to cycle")]
    NothingEnabled,
}

impl CycleFault {
    /// Gate the fault is attributed to, if any.
    pub const fn gate(&self) -> Option<GateId> {
        match self {
            Self::OpenTimeout { gate, .. } | Self::CloseTimeout { gate, .. } => Some(*gate),
            Self::NothingEnabled => None,
        }
    }

    /// True for faults that leave a gate possibly standing open.
    #[inline]
    pub const fn is_safety_relevant(&self) -> bool {
        matches!(self, Self::CloseTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_display_names_gate() {
        let fault = CycleFault::OpenTimeout {
            gate: GateId::Outer,
            ticks: 51,
        };
        assert_eq!(fault.to_string(), "Outer gate failed to open within 51 ticks");
        assert_eq!(fault.gate(), Some(GateId::Outer));
        assert!(!fault.is_safety_relevant());
    }

    #[test]
    fn close_timeout_is_safety_relevant() {
        let fault = CycleFault::CloseTimeout {
            gate: GateId::Inner,
            ticks: 1201,
        };
        assert!(fault.is_safety_relevant());
        assert!(fault.to_string().contains("Inner"));
        assert_eq!(CycleFault::NothingEnabled.gate(), None);
    }
}
