//! Prelude module for common re-exports.
//!
//! ```rust
//! use sally_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{BANK_WORDS, DEFAULT_TICK_PERIOD_MS, MAX_DI, MAX_DO};

// ─── Interlock ──────────────────────────────────────────────────────
pub use crate::interlock::error::CycleFault;
pub use crate::interlock::state::{CycleKind, Direction, GateId, InterlockState};
pub use crate::interlock::status::Indicators;

// ─── I/O ────────────────────────────────────────────────────────────
pub use crate::hal::driver::{HalError, IoDriver};
pub use crate::io::registry::{DiBank, DoBank, IoRegistry};
pub use crate::io::role::IoRole;
