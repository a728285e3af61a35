//! `[simulation]` table of `sally.toml`.
//!
//! ```toml
//! [simulation]
//! outer = { open_delay_ticks = 3, hold_open_ticks = 20, close_delay_ticks = 3 }
//! inner = { open_delay_ticks = 3, hold_open_ticks = 20, close_delay_ticks = 3, jammed_open = true }
//! stimulus = [ { tick = 5, role = "InboundRequest", duration = 3 } ]
//! ```

use sally_common::hal::driver::HalError;
use sally_common::interlock::state::GateId;
use serde::{Deserialize, Serialize};

/// Behaviour of one simulated barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateModelConfig {
    /// Ticks between seeing the open command and leaving the closed limit.
    pub open_delay_ticks: u32,
    /// Ticks the barrier stays open before it starts to reclose.
    pub hold_open_ticks: u32,
    /// Ticks from starting to reclose until the closed limit is made.
    pub close_delay_ticks: u32,
    /// Once open, hold open until the open command is pulsed again.
    pub jammed_open: bool,
    /// Never leave the closed limit.
    pub jammed_closed: bool,
    /// Start the run standing open.
    pub start_open: bool,
    /// Report the barrier as out of service.
    pub disabled: bool,
}

impl Default for GateModelConfig {
    fn default() -> Self {
        Self {
            open_delay_ticks: 3,
            hold_open_ticks: 20,
            close_delay_ticks: 3,
            jammed_open: false,
            jammed_closed: false,
            start_open: false,
            disabled: false,
        }
    }
}

/// One scheduled request pulse on a digital input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StimulusEvent {
    /// Exchange count (0-based) at which the input goes active.
    pub tick: u64,
    /// DI role string, e.g. `"InboundRequest"` or `"StuckRequest"`.
    pub role: String,
    /// Number of exchanges the input stays active.
    #[serde(default = "default_duration")]
    pub duration: u32,
}

fn default_duration() -> u32 {
    1
}

/// Complete simulation plant configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub outer: GateModelConfig,
    pub inner: GateModelConfig,
    pub stimulus: Vec<StimulusEvent>,
}

impl SimulationConfig {
    /// Parse the driver table handed over by the driver registry.
    ///
    /// An empty table yields the default plant with no stimulus.
    pub fn from_table(table: &toml::Table) -> Result<Self, HalError> {
        let config: Self = toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| HalError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Model settings for `gate`.
    pub fn gate(&self, gate: GateId) -> &GateModelConfig {
        match gate {
            GateId::Outer => &self.outer,
            GateId::Inner => &self.inner,
        }
    }

    /// Reject contradictory settings.
    pub fn validate(&self) -> Result<(), HalError> {
        for gate in GateId::ALL {
            let model = self.gate(gate);
            if model.jammed_open && model.jammed_closed {
                return Err(HalError::ConfigError(format!(
                    "{gate} gate cannot be jammed both open and closed"
                )));
            }
        }
        if let Some(event) = self.stimulus.iter().find(|e| e.duration == 0) {
            return Err(HalError::ConfigError(format!(
                "stimulus '{}' at tick {} has zero duration",
                event.role, event.tick
            )));
        }
        Ok(())
    }
}
