//! I/O configuration structs.
//!
//! Deserialized from `io.toml` at startup. Each group contains
//! an array of digital points with type-specific fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::role::{DiLogic, IoPointType};

// ─── IoPoint ────────────────────────────────────────────────────────

/// A single I/O point definition from `io.toml`.
///
/// Type-specific fields use `Option`: irrelevant fields for a given
/// `io_type` are ignored at parse time and validated at registry
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoPoint {
    /// I/O type discriminator.
    #[serde(rename = "type")]
    pub io_type: IoPointType,

    /// Physical pin number.
    pub pin: u16,

    /// Functional role string (parsed into `IoRole` at registry construction).
    #[serde(default)]
    pub role: Option<String>,

    /// Human-readable display name.
    #[serde(default)]
    pub name: Option<String>,

    // ── DI-specific ─────────────────────────────────────────────────

    /// NO (Normally Open) or NC (Normally Closed). Default: NO.
    #[serde(default)]
    pub logic: Option<DiLogic>,

    // ── DO-specific ─────────────────────────────────────────────────

    /// Initial logical state (before inversion). Default: false.
    #[serde(default)]
    pub init: Option<bool>,

    /// Invert logic-to-pin mapping. Default: false.
    #[serde(default)]
    pub inverted: Option<bool>,

    // ── Simulation ──────────────────────────────────────────────────

    /// Logical level the simulation driver presents before the first tick.
    #[serde(default)]
    pub sim: Option<bool>,
}

// ─── IoGroup ────────────────────────────────────────────────────────

/// A named group of I/O points from `io.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoGroup {
    /// Group display name.
    #[serde(default)]
    pub name: Option<String>,

    /// I/O points in this group.
    pub io: Vec<IoPoint>,
}

// ─── IoConfig ───────────────────────────────────────────────────────

/// Top-level I/O configuration.
///
/// The TOML file is a map of group keys to `IoGroup` structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    #[serde(flatten)]
    pub groups: BTreeMap<String, IoGroup>,
}

impl IoConfig {
    /// Parse from TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Iterate all I/O points with their group key.
    pub fn all_points(&self) -> impl Iterator<Item = (&str, usize, &IoPoint)> {
        self.groups.iter().flat_map(|(key, group)| {
            group
                .io
                .iter()
                .enumerate()
                .map(move |(idx, point)| (key.as_str(), idx, point))
        })
    }
}
