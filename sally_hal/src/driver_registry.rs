//! Driver registry for I/O drivers.
//!
//! Maps a driver name from `sally.toml` (`[io] driver = "..."`) to a factory.
//! Constructed at startup and passed by value, no global state.

use sally_common::hal::driver::{HalError, IoDriver};
use std::collections::HashMap;

/// Factory function type for creating driver instances.
///
/// Receives the driver-specific TOML table (e.g. `[simulation]`), which may
/// be empty.
pub type DriverFactory = fn(&toml::Table) -> Result<Box<dyn IoDriver>, HalError>;

/// Registry of available I/O drivers.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with every built-in driver registered.
    pub fn with_builtin() -> Self {
        Self {
            factories: crate::drivers::BUILTIN_DRIVERS.iter().copied().collect(),
        }
    }

    /// Register a driver factory.
    ///
    /// # Errors
    /// Returns `HalError::ConfigError` if the name is already taken.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) -> Result<(), HalError> {
        if self.factories.contains_key(name) {
            return Err(HalError::ConfigError(format!(
                "driver '{name}' is already registered"
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Create a driver instance by name.
    ///
    /// # Errors
    /// Returns `HalError::DriverNotFound` if no driver with the given name is
    /// registered, or whatever the factory returns for a bad driver table.
    pub fn create_driver(
        &self,
        name: &str,
        settings: &toml::Table,
    ) -> Result<Box<dyn IoDriver>, HalError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| HalError::DriverNotFound(name.to_string()))?;
        factory(settings)
    }

    /// List all registered driver names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
