//! Stuck-gate recovery.
//!
//! Pulses the open command of the gate that reads open so its drive cycles
//! and recloses:
//! 1. Started: pick the target, request it open.
//! 2. Waiting: open sensed → clear the request.
//! 3. Opened: closed sensed → Complete.
//!
//! Waiting is bounded by the open budget, Opened by the close budget.

use core::fmt;

use sally_common::interlock::error::CycleFault;
use sally_common::interlock::state::{GateId, GatePhase, InterlockState};
use tracing::debug;

use super::interlock::stuck_target;
use crate::gate::{Gate, Gates};
use crate::sequence::{Outcome, Timeouts, Wait, wait_for};

/// Why a recovery was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckTrigger {
    /// Stuck request input asserted.
    Requested,
    /// Both gates read open while idle.
    Breach,
}

impl fmt::Display for StuckTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("stuck request"),
            Self::Breach => f.write_str("both gates open"),
        }
    }
}

/// Stuck recovery procedure.
#[derive(Debug, Clone)]
pub struct StuckRecovery {
    trigger: StuckTrigger,
    /// Chosen on the Started tick.
    target: Option<GateId>,
    phase: GatePhase,
    ticks: u32,
}

impl StuckRecovery {
    pub const fn new(trigger: StuckTrigger) -> Self {
        Self {
            trigger,
            target: None,
            phase: GatePhase::Started,
            ticks: 0,
        }
    }

    #[inline]
    pub const fn trigger(&self) -> StuckTrigger {
        self.trigger
    }

    #[inline]
    pub const fn target(&self) -> Option<GateId> {
        self.target
    }

    #[inline]
    pub const fn phase(&self) -> GatePhase {
        self.phase
    }

    #[inline]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    #[inline]
    pub const fn is_complete(&self) -> bool {
        matches!(self.phase, GatePhase::Complete)
    }

    pub const fn state(&self) -> InterlockState {
        let gate = match self.target {
            Some(gate) => gate,
            None => GateId::Outer,
        };
        InterlockState::stuck(gate, self.phase)
    }

    fn enter(&mut self, phase: GatePhase) {
        self.phase = phase;
        self.ticks = 0;
    }

    /// Advance one tick.
    pub fn tick(&mut self, gates: &mut Gates, gates_open: &mut bool, timeouts: Timeouts) -> Outcome {
        match (self.phase, self.target) {
            (GatePhase::Started, _) => {
                if !gates.both_enabled() {
                    debug!("stuck recovery skipped: a gate left service");
                    self.enter(GatePhase::Complete);
                } else {
                    let target = stuck_target(gates);
                    gates[target].request_open(true);
                    gates[target].set_working(true);
                    self.target = Some(target);
                    self.enter(GatePhase::Waiting);
                }
            }

            (GatePhase::Waiting, Some(target)) => {
                match wait_for(gates[target].is_open(), &mut self.ticks, timeouts.open_ticks) {
                    Wait::Done => {
                        gates[target].request_open(false);
                        self.enter(GatePhase::Opened);
                    }
                    Wait::TimedOut(ticks) => {
                        return Outcome::Aborted(CycleFault::OpenTimeout { gate: target, ticks });
                    }
                    Wait::Pending => {}
                }
            }

            (GatePhase::Opened, Some(target)) => {
                match wait_for(
                    gates[target].is_closed(),
                    &mut self.ticks,
                    timeouts.close_ticks,
                ) {
                    Wait::Done => {
                        if gates.iter().all(Gate::is_closed) {
                            *gates_open = false;
                        }
                        self.enter(GatePhase::Complete);
                    }
                    Wait::TimedOut(ticks) => {
                        return Outcome::Aborted(CycleFault::CloseTimeout { gate: target, ticks });
                    }
                    Wait::Pending => {}
                }
            }

            // Waiting/Opened always carry a target.
            (GatePhase::Waiting | GatePhase::Opened, None) => self.enter(GatePhase::Complete),

            (GatePhase::Complete, _) => return Outcome::Completed,
        }

        Outcome::Continue
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
