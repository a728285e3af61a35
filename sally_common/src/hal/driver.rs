//! I/O driver trait and error types.
//!
//! This module defines:
//! - `IoDriver` trait - Interface for pluggable digital I/O backends
//! - `HalError` enum - Error types for driver operations
//! - `DriverDiagnostics` struct - Optional driver diagnostics

use thiserror::Error;

use crate::io::registry::{DiBank, DoBank, IoRegistry};

/// Error types for driver operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Hardware communication error
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// `exchange()` called before `init()` or after `shutdown()`
    #[error("Driver not initialized")]
    NotInitialized,
}

/// Optional driver diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverDiagnostics {
    /// Number of exchanges executed
    pub exchange_count: u64,
    /// Number of failed exchanges
    pub error_count: u64,
    /// Driver-specific free-form detail
    pub custom: Option<String>,
}

/// Trait defining the interface for digital I/O drivers.
///
/// The tick runner owns exactly one driver and calls it from the control
/// task only.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before the tick loop starts
/// 2. `exchange()` - Called once per tick: write outputs, sample inputs
/// 3. `shutdown()` - Called when the loop stops
///
/// # Timing Contracts
///
/// | Operation | RT Constraint |
/// |-----------|---------------|
/// | `init()` | None (pre-loop) |
/// | `exchange()` | **HARD**, must fit in one tick |
/// | `shutdown()` | None (post-loop) |
pub trait IoDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Bind the driver to the resolved I/O map.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` if initialization cannot complete.
    fn init(&mut self, registry: &IoRegistry) -> Result<(), HalError>;

    /// Apply the DO bank and return the DI bank sampled afterwards.
    ///
    /// Must not allocate or block.
    fn exchange(&mut self, outputs: &DoBank) -> Result<DiBank, HalError>;

    /// Graceful shutdown: drive outputs safe, release resources.
    fn shutdown(&mut self) -> Result<(), HalError>;

    /// Get driver-specific diagnostics.
    /// Default: None
    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        None
    }
}
