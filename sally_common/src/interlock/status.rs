//! Indicator bitflags and the packed status snapshot.
//!
//! The control task publishes one `StatusSnapshot` per tick; the status task
//! and the DO adapter consume it. Packing into a single `u64` lets the
//! snapshot cross threads through one atomic without a lock.

use bitflags::bitflags;

use super::state::{CycleKind, GateId, InterlockState};

bitflags! {
    /// Driven diagnostic/actuator levels, logical (before any wire inversion).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Indicators: u16 {
        /// An inbound cycle (or single-gate cycle started inbound) is active.
        const INBOUND_ACTIVE     = 0x0001;
        /// An outbound cycle (or single-gate cycle started outbound) is active.
        const OUTBOUND_ACTIVE    = 0x0002;
        /// Aggregate "passage open" indicator.
        const GATES_OPEN         = 0x0004;
        const OUTER_CLOSED       = 0x0010;
        const INNER_CLOSED       = 0x0020;
        const OUTER_WORKING      = 0x0040;
        const INNER_WORKING      = 0x0080;
        /// Actuator command toward the outer gate.
        const OUTER_OPEN_REQUEST = 0x0100;
        /// Actuator command toward the inner gate.
        const INNER_OPEN_REQUEST = 0x0200;
        const OUTER_ENABLED      = 0x0400;
        const INNER_ENABLED      = 0x0800;
    }
}

impl Indicators {
    /// Closed-mirror flag for `gate`.
    #[inline]
    pub const fn closed(gate: GateId) -> Self {
        match gate {
            GateId::Outer => Self::OUTER_CLOSED,
            GateId::Inner => Self::INNER_CLOSED,
        }
    }

    /// Working flag for `gate`.
    #[inline]
    pub const fn working(gate: GateId) -> Self {
        match gate {
            GateId::Outer => Self::OUTER_WORKING,
            GateId::Inner => Self::INNER_WORKING,
        }
    }

    /// Open-request actuator flag for `gate`.
    #[inline]
    pub const fn open_request(gate: GateId) -> Self {
        match gate {
            GateId::Outer => Self::OUTER_OPEN_REQUEST,
            GateId::Inner => Self::INNER_OPEN_REQUEST,
        }
    }

    /// Enabled flag for `gate`.
    #[inline]
    pub const fn enabled(gate: GateId) -> Self {
        match gate {
            GateId::Outer => Self::OUTER_ENABLED,
            GateId::Inner => Self::INNER_ENABLED,
        }
    }

    /// Number of gates with their open request raised.
    #[inline]
    pub const fn open_request_count(&self) -> u32 {
        self.intersection(Self::OUTER_OPEN_REQUEST.union(Self::INNER_OPEN_REQUEST))
            .bits()
            .count_ones()
    }
}

/// Consistent view of controller status for readers outside the control task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub state: InterlockState,
    pub kind: CycleKind,
    pub indicators: Indicators,
    /// Ticks spent in the current state (saturates at `u32::MAX`).
    pub cycle_ticks: u32,
}

impl StatusSnapshot {
    /// Pack into one word: `[ticks:32 | kind:8 | state:8 | indicators:16]`.
    #[inline]
    pub const fn pack(&self) -> u64 {
        (self.indicators.bits() as u64)
            | ((self.state as u64) << 16)
            | ((self.kind as u64) << 24)
            | ((self.cycle_ticks as u64) << 32)
    }

    /// Unpack a word produced by [`pack`](Self::pack).
    ///
    /// Unknown state/kind codes decode as `Idle`/`None`; unknown indicator
    /// bits are dropped.
    pub const fn unpack(word: u64) -> Self {
        let state = match InterlockState::from_u8((word >> 16) as u8) {
            Some(s) => s,
            None => InterlockState::Idle,
        };
        let kind = match CycleKind::from_u8((word >> 24) as u8) {
            Some(k) => k,
            None => CycleKind::None,
        };
        Self {
            state,
            kind,
            indicators: Indicators::from_bits_truncate(word as u16),
            cycle_ticks: (word >> 32) as u32,
        }
    }
}
