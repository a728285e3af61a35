//! # Sally HAL Library
//!
//! Pluggable digital I/O drivers for the sally-port interlock.
//! Drivers implement the `IoDriver` trait defined in `sally_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     sally_interlock                          │
//! │   TickRunner ──DO bank──►  Box<dyn IoDriver>  ──DI bank──►   │
//! └───────────────────────────────┬──────────────────────────────┘
//!                                 │ created by name
//!                        ┌────────▼─────────┐
//!                        │  DriverRegistry  │
//!                        └────────┬─────────┘
//!                                 │
//!                        ┌────────▼─────────┐
//!                        │ SimulationDriver │  gate plant + stimulus
//!                        └──────────────────┘
//! ```

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::{DriverFactory, DriverRegistry};
pub use crate::drivers::simulation::SimulationDriver;
