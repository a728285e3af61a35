//! State enums for the interlock sequencer.
//!
//! All enums use `#[repr(u8)]` so a state fits in one byte of the packed
//! status word. `InterlockState` is flat on purpose: it is what operators see
//! in logs ("moving from InboundFirstWaiting to InboundFirstOpened") and what
//! the status task renders.

use core::fmt;
use serde::{Deserialize, Serialize};

// ─── Gate / Direction ───────────────────────────────────────────────

/// One of the two physical barriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GateId {
    /// Barrier facing the outside world.
    Outer = 0,
    /// Barrier facing the protected side.
    Inner = 1,
}

impl GateId {
    /// Both gates, outer first.
    pub const ALL: [GateId; 2] = [GateId::Outer, GateId::Inner];

    /// The opposite barrier.
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Self::Outer => Self::Inner,
            Self::Inner => Self::Outer,
        }
    }

    /// Array index (outer = 0, inner = 1).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Diagnostic name, also the role suffix in `io.toml`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Outer => "Outer",
            Self::Inner => "Inner",
        }
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of traffic through the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Outside → inside: outer gate first, then inner.
    Inbound = 0,
    /// Inside → outside: inner gate first, then outer.
    Outbound = 1,
}

impl Direction {
    /// Gate opened first in this direction.
    #[inline]
    pub const fn primary(self) -> GateId {
        match self {
            Self::Inbound => GateId::Outer,
            Self::Outbound => GateId::Inner,
        }
    }

    /// Gate opened second in this direction.
    #[inline]
    pub const fn secondary(self) -> GateId {
        self.primary().other()
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Inbound => Self::Outbound,
            Self::Outbound => Self::Inbound,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => f.write_str("Inbound"),
            Self::Outbound => f.write_str("Outbound"),
        }
    }
}

// ─── Cycle kind ─────────────────────────────────────────────────────

/// Which sub-procedure currently owns the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum CycleKind {
    #[default]
    None = 0,
    Inbound = 1,
    Outbound = 2,
    Stuck = 3,
    SingleGate = 4,
}

impl CycleKind {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Inbound),
            2 => Some(Self::Outbound),
            3 => Some(Self::Stuck),
            4 => Some(Self::SingleGate),
            _ => None,
        }
    }

    /// Transit kind for a direction.
    #[inline]
    pub const fn transit(direction: Direction) -> Self {
        match direction {
            Direction::Inbound => Self::Inbound,
            Direction::Outbound => Self::Outbound,
        }
    }
}

// ─── Phases ─────────────────────────────────────────────────────────

/// Phase of a two-phase transit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CyclePhase {
    Started = 0,
    FirstWaiting = 1,
    FirstOpened = 2,
    FirstClosed = 3,
    SecondWaiting = 4,
    SecondOpened = 5,
    Completed = 6,
}

/// Phase of a one-gate procedure (stuck recovery, single-gate fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GatePhase {
    Started = 0,
    Waiting = 1,
    Opened = 2,
    Complete = 3,
}

// ─── Flat machine state ─────────────────────────────────────────────

/// Flat machine state of the interlock controller.
///
/// Exactly one state is current at any time. `Idle` is the only state with no
/// active sub-procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum InterlockState {
    #[default]
    Idle = 0,

    InboundStarted = 1,
    InboundFirstWaiting = 2,
    InboundFirstOpened = 3,
    InboundFirstClosed = 4,
    InboundSecondWaiting = 5,
    InboundSecondOpened = 6,
    InboundCompleted = 7,

    OutboundStarted = 8,
    OutboundFirstWaiting = 9,
    OutboundFirstOpened = 10,
    OutboundFirstClosed = 11,
    OutboundSecondWaiting = 12,
    OutboundSecondOpened = 13,
    OutboundCompleted = 14,

    StuckStarted = 15,
    StuckOuterWaiting = 16,
    StuckOuterOpened = 17,
    StuckInnerWaiting = 18,
    StuckInnerOpened = 19,
    StuckComplete = 20,

    SingleStarted = 21,
    SingleWaiting = 22,
    SingleOpened = 23,
    SingleComplete = 24,
}

impl InterlockState {
    /// All states in discriminant order.
    pub const ALL: [InterlockState; 25] = [
        Self::Idle,
        Self::InboundStarted,
        Self::InboundFirstWaiting,
        Self::InboundFirstOpened,
        Self::InboundFirstClosed,
        Self::InboundSecondWaiting,
        Self::InboundSecondOpened,
        Self::InboundCompleted,
        Self::OutboundStarted,
        Self::OutboundFirstWaiting,
        Self::OutboundFirstOpened,
        Self::OutboundFirstClosed,
        Self::OutboundSecondWaiting,
        Self::OutboundSecondOpened,
        Self::OutboundCompleted,
        Self::StuckStarted,
        Self::StuckOuterWaiting,
        Self::StuckOuterOpened,
        Self::StuckInnerWaiting,
        Self::StuckInnerOpened,
        Self::StuckComplete,
        Self::SingleStarted,
        Self::SingleWaiting,
        Self::SingleOpened,
        Self::SingleComplete,
    ];

    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        if (value as usize) < Self::ALL.len() {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }

    /// State of a transit cycle in `direction` at `phase`.
    pub const fn transit(direction: Direction, phase: CyclePhase) -> Self {
        let base = match direction {
            Direction::Inbound => Self::InboundStarted as u8,
            Direction::Outbound => Self::OutboundStarted as u8,
        };
        Self::ALL[(base + phase as u8) as usize]
    }

    /// State of a stuck recovery on `gate` at `phase`.
    pub const fn stuck(gate: GateId, phase: GatePhase) -> Self {
        match (phase, gate) {
            (GatePhase::Started, _) => Self::StuckStarted,
            (GatePhase::Waiting, GateId::Outer) => Self::StuckOuterWaiting,
            (GatePhase::Opened, GateId::Outer) => Self::StuckOuterOpened,
            (GatePhase::Waiting, GateId::Inner) => Self::StuckInnerWaiting,
            (GatePhase::Opened, GateId::Inner) => Self::StuckInnerOpened,
            (GatePhase::Complete, _) => Self::StuckComplete,
        }
    }

    /// State of a single-gate fallback at `phase`.
    pub const fn single(phase: GatePhase) -> Self {
        match phase {
            GatePhase::Started => Self::SingleStarted,
            GatePhase::Waiting => Self::SingleWaiting,
            GatePhase::Opened => Self::SingleOpened,
            GatePhase::Complete => Self::SingleComplete,
        }
    }

    #[inline]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for InterlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
