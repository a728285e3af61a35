//! Simulation driver module.
//!
//! Provides a software gate plant so the interlock can run end to end
//! without field wiring.

mod config;
mod driver;
mod gate;
mod stimulus;

pub use config::{GateModelConfig, SimulationConfig, StimulusEvent};
pub use driver::SimulationDriver;
pub use gate::{GateModel, GateMotion};
pub use stimulus::StimulusSchedule;

use sally_common::hal::driver::{HalError, IoDriver};

/// Factory function to create a simulation driver from its `[simulation]` table.
pub fn create_driver(settings: &toml::Table) -> Result<Box<dyn IoDriver>, HalError> {
    let config = SimulationConfig::from_table(settings)?;
    Ok(Box::new(SimulationDriver::new(config)))
}
