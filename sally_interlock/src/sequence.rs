//! Gate sequencing procedures.
//!
//! Transit cycles and the single-gate fallback share one two-phase routine
//! ([`transit::CycleSequencer`]) bound to a primary gate and an optional
//! secondary gate. Every wait is ticked state: a procedure is advanced once
//! per controller tick and reports an [`Outcome`].

pub mod single;
pub mod transit;

use sally_common::consts::{DEFAULT_CLOSE_TIMEOUT_TICKS, DEFAULT_OPEN_TIMEOUT_TICKS};
use sally_common::interlock::error::CycleFault;

/// Open/close confirmation budgets in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub open_ticks: u32,
    pub close_ticks: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            open_ticks: DEFAULT_OPEN_TIMEOUT_TICKS,
            close_ticks: DEFAULT_CLOSE_TIMEOUT_TICKS,
        }
    }
}

/// Result of advancing a procedure by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Still running.
    Continue,
    /// Finished normally; the controller returns to Idle.
    Completed,
    /// Gave up; the controller returns to Idle.
    Aborted(CycleFault),
    /// Opposite direction requested while the second gate stood open.
    Preempted,
}

/// Progress of a timed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
    Done,
    TimedOut(u32),
    Pending,
}

/// One tick of a timed wait.
///
/// The condition is checked first, then the budget, then `ticks` advances,
/// so a wait that never succeeds times out with `ticks == limit + 1`.
#[inline]
pub(crate) fn wait_for(condition: bool, ticks: &mut u32, limit: u32) -> Wait {
    if condition {
        Wait::Done
    } else if *ticks > limit {
        Wait::TimedOut(*ticks)
    } else {
        *ticks += 1;
        Wait::Pending
    }
}
