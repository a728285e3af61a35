//! Scheduled request pulses.
//!
//! Stimulus events name DI roles by string in `sally.toml`; they are resolved
//! against the registry once at driver init so a typo fails before the loop
//! starts.

use sally_common::hal::driver::HalError;
use sally_common::io::registry::{DiBank, IoRegistry};
use sally_common::io::role::{IoPointType, IoRole};

use super::config::StimulusEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pulse {
    role: IoRole,
    start: u64,
    end: u64,
}

/// Resolved stimulus schedule.
#[derive(Debug, Clone, Default)]
pub struct StimulusSchedule {
    pulses: Vec<Pulse>,
    /// Every role the schedule owns, deduplicated.
    roles: Vec<IoRole>,
}

impl StimulusSchedule {
    /// Resolve `events` against the registry.
    ///
    /// # Errors
    /// `HalError::ConfigError` if a role does not parse, is not bound, or is
    /// bound to an output.
    pub fn resolve(events: &[StimulusEvent], registry: &IoRegistry) -> Result<Self, HalError> {
        let mut pulses = Vec::with_capacity(events.len());
        let mut roles: Vec<IoRole> = Vec::new();

        for event in events {
            let role: IoRole = event
                .role
                .parse()
                .map_err(|e: String| HalError::ConfigError(format!("stimulus role: {e}")))?;
            let binding = registry.get(&role).ok_or_else(|| {
                HalError::ConfigError(format!("stimulus role '{role}' is not bound in io.toml"))
            })?;
            if binding.io_type != IoPointType::Di {
                return Err(HalError::ConfigError(format!(
                    "stimulus role '{role}' is bound to an output"
                )));
            }
            if !roles.contains(&role) {
                roles.push(role.clone());
            }
            pulses.push(Pulse {
                role,
                start: event.tick,
                end: event.tick.saturating_add(u64::from(event.duration)),
            });
        }

        Ok(Self { pulses, roles })
    }

    /// Whether `role` is driven active at exchange `tick`.
    pub fn is_active(&self, role: &IoRole, tick: u64) -> bool {
        self.pulses
            .iter()
            .any(|p| &p.role == role && (p.start..p.end).contains(&tick))
    }

    /// Drive every scheduled role to its level for exchange `tick`.
    pub fn apply(&self, tick: u64, registry: &IoRegistry, di_bank: &mut DiBank) {
        for role in &self.roles {
            registry.write_di(role, self.is_active(role, tick), di_bank);
        }
    }

    /// Exchange count after which the schedule is quiet for good.
    pub fn last_tick(&self) -> Option<u64> {
        self.pulses.iter().map(|p| p.end).max()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }
}
