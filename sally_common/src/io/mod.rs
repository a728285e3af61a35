//! Role-based I/O abstraction.
//!
//! Shared between the HAL driver and the interlock. Both parse the same
//! `io.toml` at startup. Runtime access goes through [`IoRegistry`](registry::IoRegistry)
//! role lookups, with no heap allocation after startup.

pub mod config;
pub mod registry;
pub mod role;
