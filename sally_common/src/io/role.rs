//! I/O Role types.
//!
//! `IoRole` maps a string like `"ClosedOuter"` to a typed enum variant with the
//! gate extracted from the suffix. Used by the interlock adapter and the
//! simulation driver to resolve I/O points by function rather than pin number.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::interlock::state::GateId;

// ─── IoPointType ────────────────────────────────────────────────────

/// I/O point type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum IoPointType {
    Di = 0,
    Do = 1,
}

impl fmt::Display for IoPointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Di => write!(f, "di"),
            Self::Do => write!(f, "do"),
        }
    }
}

impl FromStr for IoPointType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "di" => Ok(Self::Di),
            "do" => Ok(Self::Do),
            _ => Err(format!("unknown IoPointType: {s:?}")),
        }
    }
}

// ─── DiLogic ────────────────────────────────────────────────────────

/// Digital input logic interpretation.
///
/// Sally-port field wiring is active-low, so most inputs are `NC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiLogic {
    /// Normally Open: true when signal present.
    #[default]
    #[serde(rename = "NO")]
    NO = 0,
    /// Normally Closed: inverted, low level = active.
    #[serde(rename = "NC")]
    NC = 1,
}

impl FromStr for DiLogic {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO" => Ok(Self::NO),
            "NC" => Ok(Self::NC),
            _ => Err(format!("unknown DiLogic: {s:?}, expected \"NO\" or \"NC\"")),
        }
    }
}

// ─── IoRole ─────────────────────────────────────────────────────────

/// Functional I/O role following the **FunctionGate** convention.
///
/// Controller-level roles have no gate. Per-gate roles carry the gate taken
/// from an `Outer`/`Inner` suffix. Unknown strings become `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IoRole {
    // ── Requests (DI) ───────────────
    InboundRequest,
    OutboundRequest,
    StuckRequest,

    // ── Indicators (DO) ─────────────
    InboundActive,
    OutboundActive,
    GatesOpen,

    // ── Per-gate sensing (DI) ───────
    Closed(GateId),
    Enabled(GateId),
    OpenRequestInput(GateId),

    // ── Per-gate drive (DO) ─────────
    OpenRequest(GateId),
    Working(GateId),
    ClosedMirror(GateId),

    // ── Project-specific extension ──
    Custom(String),
}

impl IoRole {
    /// Return the gate if this is a per-gate role, else `None`.
    pub fn gate(&self) -> Option<GateId> {
        match self {
            Self::Closed(g)
            | Self::Enabled(g)
            | Self::OpenRequestInput(g)
            | Self::OpenRequest(g)
            | Self::Working(g)
            | Self::ClosedMirror(g) => Some(*g),
            _ => None,
        }
    }

    /// Expected I/O type for known roles.
    pub fn expected_io_type(&self) -> Option<IoPointType> {
        match self {
            Self::InboundRequest
            | Self::OutboundRequest
            | Self::StuckRequest
            | Self::Closed(_)
            | Self::Enabled(_)
            | Self::OpenRequestInput(_) => Some(IoPointType::Di),

            Self::InboundActive
            | Self::OutboundActive
            | Self::GatesOpen
            | Self::OpenRequest(_)
            | Self::Working(_)
            | Self::ClosedMirror(_) => Some(IoPointType::Do),

            Self::Custom(_) => None,
        }
    }

    /// Roles the interlock cannot run without.
    pub fn required() -> [IoRole; 9] {
        [
            Self::InboundRequest,
            Self::OutboundRequest,
            Self::StuckRequest,
            Self::Closed(GateId::Outer),
            Self::Enabled(GateId::Outer),
            Self::OpenRequest(GateId::Outer),
            Self::Closed(GateId::Inner),
            Self::Enabled(GateId::Inner),
            Self::OpenRequest(GateId::Inner),
        ]
    }
}

// ─── FunctionGate Parser ────────────────────────────────────────────

/// Split a role string into (prefix, optional_gate).
///
/// `"ClosedOuter"`    → `("Closed", Some(Outer))`
/// `"InboundRequest"` → `("InboundRequest", None)`
fn split_role_str(s: &str) -> (&str, Option<GateId>) {
    for gate in GateId::ALL {
        if let Some(prefix) = s.strip_suffix(gate.name()) {
            if !prefix.is_empty() {
                return (prefix, Some(gate));
            }
        }
    }
    (s, None)
}

impl FromStr for IoRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("empty role string".to_string());
        }
        let (prefix, gate) = split_role_str(s);

        match (prefix, gate) {
            ("InboundRequest", None) => Ok(Self::InboundRequest),
            ("OutboundRequest", None) => Ok(Self::OutboundRequest),
            ("StuckRequest", None) => Ok(Self::StuckRequest),
            ("InboundActive", None) => Ok(Self::InboundActive),
            ("OutboundActive", None) => Ok(Self::OutboundActive),
            ("GatesOpen", None) => Ok(Self::GatesOpen),
            ("Closed", Some(g)) => Ok(Self::Closed(g)),
            ("Enabled", Some(g)) => Ok(Self::Enabled(g)),
            ("OpenRequestInput", Some(g)) => Ok(Self::OpenRequestInput(g)),
            ("OpenRequest", Some(g)) => Ok(Self::OpenRequest(g)),
            ("Working", Some(g)) => Ok(Self::Working(g)),
            ("ClosedMirror", Some(g)) => Ok(Self::ClosedMirror(g)),
            _ => Ok(Self::Custom(s.to_string())),
        }
    }
}

impl fmt::Display for IoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InboundRequest => write!(f, "InboundRequest"),
            Self::OutboundRequest => write!(f, "OutboundRequest"),
            Self::StuckRequest => write!(f, "StuckRequest"),
            Self::InboundActive => write!(f, "InboundActive"),
            Self::OutboundActive => write!(f, "OutboundActive"),
            Self::GatesOpen => write!(f, "GatesOpen"),
            Self::Closed(g) => write!(f, "Closed{g}"),
            Self::Enabled(g) => write!(f, "Enabled{g}"),
            Self::OpenRequestInput(g) => write!(f, "OpenRequestInput{g}"),
            Self::OpenRequest(g) => write!(f, "OpenRequest{g}"),
            Self::Working(g) => write!(f, "Working{g}"),
            Self::ClosedMirror(g) => write!(f, "ClosedMirror{g}"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}
