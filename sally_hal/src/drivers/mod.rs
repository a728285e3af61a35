//! I/O driver implementations.
//!
//! - [`simulation`] - Tick-based gate plant for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `IoDriver` trait from `sally_common::hal::driver`
//! 3. Add its factory to [`BUILTIN_DRIVERS`]

pub mod simulation;

use crate::driver_registry::DriverFactory;

/// Built-in drivers, by the name used in `[io] driver = "..."`.
pub const BUILTIN_DRIVERS: &[(&str, DriverFactory)] =
    &[("simulation", simulation::create_driver)];
