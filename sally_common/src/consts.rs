//! System-wide constants for the sally-port workspace.
//!
//! Single source of truth for numeric limits and defaults.
//! Imported by all crates.

use static_assertions::const_assert;

/// Number of `u64` words in a digital I/O bank.
pub const BANK_WORDS: usize = 4;

/// Maximum number of digital inputs.
pub const MAX_DI: usize = 256;

/// Maximum number of digital outputs.
pub const MAX_DO: usize = 256;

/// Default tick period in milliseconds.
pub const DEFAULT_TICK_PERIOD_MS: u32 = 100;

/// Default open-confirmation budget [ticks] (5 s at 100 ms).
pub const DEFAULT_OPEN_TIMEOUT_TICKS: u32 = 50;

/// Default reclose budget [ticks] (120 s at 100 ms).
pub const DEFAULT_CLOSE_TIMEOUT_TICKS: u32 = 1200;

/// Default status re-render period in milliseconds.
pub const DEFAULT_STATUS_PERIOD_MS: u32 = 250;

/// Number of state transitions kept for diagnostics.
pub const TRANSITION_HISTORY_LEN: usize = 32;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/sally.toml";

const_assert!(MAX_DI <= 64 * BANK_WORDS);
const_assert!(MAX_DO <= 64 * BANK_WORDS);
const_assert!(DEFAULT_CLOSE_TIMEOUT_TICKS >= DEFAULT_OPEN_TIMEOUT_TICKS);
