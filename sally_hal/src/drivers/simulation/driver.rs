//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `IoDriver` trait with a gate plant
//! and a request stimulus schedule, so the interlock runs end to end without
//! field wiring.

use sally_common::hal::driver::{DriverDiagnostics, HalError, IoDriver};
use sally_common::interlock::state::GateId;
use sally_common::io::registry::{DiBank, DoBank, IoRegistry};
use sally_common::io::role::IoRole;
use tracing::{debug, info, trace};

use super::config::SimulationConfig;
use super::gate::GateModel;
use super::stimulus::StimulusSchedule;

/// Everything that exists only between `init()` and `shutdown()`.
struct Plant {
    registry: IoRegistry,
    gates: [GateModel; 2],
    schedule: StimulusSchedule,
    /// DI levels for roles the plant does not model (from `sim` in io.toml).
    base_inputs: DiBank,
}

/// Simulation driver implementing the `IoDriver` trait.
pub struct SimulationDriver {
    config: SimulationConfig,
    plant: Option<Plant>,
    /// Exchanges since `init()`
    tick: u64,
    error_count: u64,
}

impl SimulationDriver {
    /// Create a new simulation driver instance.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            plant: None,
            tick: 0,
            error_count: 0,
        }
    }

    /// Exchanges performed since `init()`.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Plant model for `gate`, if initialized.
    pub fn gate_model(&self, gate: GateId) -> Option<&GateModel> {
        self.plant.as_ref().map(|p| &p.gates[gate.index()])
    }

    /// Exchange count after which no more stimulus is scheduled.
    pub fn stimulus_end(&self) -> Option<u64> {
        self.plant.as_ref().and_then(|p| p.schedule.last_tick())
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl IoDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn init(&mut self, registry: &IoRegistry) -> Result<(), HalError> {
        for gate in GateId::ALL {
            for role in [IoRole::Closed(gate), IoRole::Enabled(gate)] {
                if !registry.has_role(&role) {
                    return Err(HalError::InitFailed(format!(
                        "simulation needs DI role '{role}'"
                    )));
                }
            }
        }

        let schedule = StimulusSchedule::resolve(&self.config.stimulus, registry)?;
        let gates = GateId::ALL.map(|g| GateModel::new(g, *self.config.gate(g)));

        info!(
            "Initializing simulation driver: {} DI, {} DO, {} stimulus pulses",
            registry.di_count,
            registry.do_count,
            self.config.stimulus.len()
        );
        for model in &gates {
            debug!(gate = %model.gate(), motion = ?model.motion(), enabled = model.is_enabled(), "sim gate ready");
        }

        self.plant = Some(Plant {
            registry: registry.clone(),
            gates,
            schedule,
            base_inputs: registry.initial_di_bank(),
        });
        self.tick = 0;
        Ok(())
    }

    fn exchange(&mut self, outputs: &DoBank) -> Result<DiBank, HalError> {
        let Some(plant) = self.plant.as_mut() else {
            self.error_count += 1;
            return Err(HalError::NotInitialized);
        };

        let mut inputs = plant.base_inputs;
        for model in plant.gates.iter_mut() {
            let gate = model.gate();
            let command = plant
                .registry
                .read_do(&IoRole::OpenRequest(gate), outputs)
                .unwrap_or(false);
            model.step(command);

            plant
                .registry
                .write_di(&IoRole::Closed(gate), model.is_closed(), &mut inputs);
            plant
                .registry
                .write_di(&IoRole::Enabled(gate), model.is_enabled(), &mut inputs);
        }
        plant.schedule.apply(self.tick, &plant.registry, &mut inputs);

        trace!(
            tick = self.tick,
            outer = ?plant.gates[0].motion(),
            inner = ?plant.gates[1].motion(),
            "sim exchange"
        );
        self.tick += 1;
        Ok(inputs)
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        info!("Shutting down simulation driver after {} exchanges", self.tick);
        self.plant = None;
        Ok(())
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        let custom = self.plant.as_ref().map(|p| {
            format!(
                "outer={:?} inner={:?}",
                p.gates[GateId::Outer.index()].motion(),
                p.gates[GateId::Inner.index()].motion()
            )
        });
        Some(DriverDiagnostics {
            exchange_count: self.tick,
            error_count: self.error_count,
            custom,
        })
    }
}
