//! Two-phase transit cycle.
//!
//! ```text
//! Started ─► FirstWaiting ─► FirstOpened ─► FirstClosed ─► SecondWaiting ─► SecondOpened ─► Completed
//!               │ open timeout    │ close timeout              │ open timeout    │ close timeout
//!               ▼                 ▼                            ▼                 ▼
//!             abort             abort                        abort             abort / preempt
//! ```
//!
//! The secondary gate's open request is issued only from `FirstClosed`, which
//! is entered only once the primary gate reads closed again. That ordering is
//! what keeps both barriers from standing open together.

use sally_common::interlock::error::CycleFault;
use sally_common::interlock::state::{CyclePhase, Direction, GateId, InterlockState};
use tracing::trace;

use super::{Outcome, Timeouts, Wait, wait_for};
use crate::gate::Gates;

/// Gates bound to a sequencer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBinding {
    primary: GateId,
    secondary: Option<GateId>,
}

impl CycleBinding {
    /// Both gates, in the order `direction` passes them.
    pub const fn transit(direction: Direction) -> Self {
        Self {
            primary: direction.primary(),
            secondary: Some(direction.secondary()),
        }
    }

    /// One gate only. The other barrier is never touched.
    pub const fn single(gate: GateId) -> Self {
        Self {
            primary: gate,
            secondary: None,
        }
    }

    #[inline]
    pub const fn primary(&self) -> GateId {
        self.primary
    }

    #[inline]
    pub const fn secondary(&self) -> Option<GateId> {
        self.secondary
    }

    /// Whether `gate` takes part in this run.
    pub fn binds(&self, gate: GateId) -> bool {
        self.primary == gate || self.secondary == Some(gate)
    }
}

/// Shared two-phase open/close routine.
#[derive(Debug, Clone)]
pub struct CycleSequencer {
    binding: CycleBinding,
    phase: CyclePhase,
    ticks: u32,
}

impl CycleSequencer {
    pub const fn new(binding: CycleBinding) -> Self {
        Self {
            binding,
            phase: CyclePhase::Started,
            ticks: 0,
        }
    }

    #[inline]
    pub const fn binding(&self) -> CycleBinding {
        self.binding
    }

    #[inline]
    pub const fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Ticks spent in the current phase.
    #[inline]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    fn enter(&mut self, phase: CyclePhase) {
        self.phase = phase;
        self.ticks = 0;
    }

    fn secondary_enabled(&self, gates: &Gates) -> bool {
        self.binding
            .secondary
            .is_some_and(|gate| gates[gate].is_enabled())
    }

    /// Advance one tick.
    ///
    /// `gates_open` is the latched aggregate indicator. `preempt` is only
    /// acted on while the secondary gate stands open.
    pub fn tick(
        &mut self,
        gates: &mut Gates,
        gates_open: &mut bool,
        timeouts: Timeouts,
        preempt: bool,
    ) -> Outcome {
        let primary = self.binding.primary;

        match (self.phase, self.binding.secondary) {
            (CyclePhase::Started, _) => {
                if gates[primary].is_enabled() {
                    trace!(gate = %primary, "requesting open");
                    gates[primary].request_open(true);
                    self.enter(CyclePhase::FirstWaiting);
                } else if self.secondary_enabled(gates) {
                    self.enter(CyclePhase::FirstClosed);
                } else {
                    return Outcome::Aborted(CycleFault::NothingEnabled);
                }
            }

            (CyclePhase::FirstWaiting, _) => {
                match wait_for(gates[primary].is_open(), &mut self.ticks, timeouts.open_ticks) {
                    Wait::Done => {
                        if !self.secondary_enabled(gates) {
                            *gates_open = true;
                        }
                        gates[primary].request_open(false);
                        self.enter(CyclePhase::FirstOpened);
                    }
                    Wait::TimedOut(ticks) => {
                        return Outcome::Aborted(CycleFault::OpenTimeout {
                            gate: primary,
                            ticks,
                        });
                    }
                    Wait::Pending => {}
                }
            }

            (CyclePhase::FirstOpened, secondary) => {
                match wait_for(
                    gates[primary].is_closed(),
                    &mut self.ticks,
                    timeouts.close_ticks,
                ) {
                    Wait::Done if secondary.is_some() => self.enter(CyclePhase::FirstClosed),
                    Wait::Done => {
                        *gates_open = false;
                        self.enter(CyclePhase::Completed);
                    }
                    Wait::TimedOut(ticks) => {
                        return Outcome::Aborted(CycleFault::CloseTimeout {
                            gate: primary,
                            ticks,
                        });
                    }
                    Wait::Pending => {}
                }
            }

            (CyclePhase::FirstClosed, secondary) => {
                match secondary.filter(|gate| gates[*gate].is_enabled()) {
                    Some(gate) => {
                        trace!(gate = %gate, "requesting open");
                        gates[gate].request_open(true);
                        self.enter(CyclePhase::SecondWaiting);
                    }
                    None => {
                        *gates_open = false;
                        self.enter(CyclePhase::Completed);
                    }
                }
            }

            (CyclePhase::SecondWaiting, Some(secondary)) => {
                match wait_for(
                    gates[secondary].is_open(),
                    &mut self.ticks,
                    timeouts.open_ticks,
                ) {
                    Wait::Done => {
                        gates[secondary].request_open(false);
                        *gates_open = true;
                        self.enter(CyclePhase::SecondOpened);
                    }
                    Wait::TimedOut(ticks) => {
                        return Outcome::Aborted(CycleFault::OpenTimeout {
                            gate: secondary,
                            ticks,
                        });
                    }
                    Wait::Pending => {}
                }
            }

            (CyclePhase::SecondOpened, Some(secondary)) => {
                if gates[secondary].is_closed() {
                    *gates_open = false;
                    self.enter(CyclePhase::Completed);
                } else if self.ticks > timeouts.close_ticks {
                    return Outcome::Aborted(CycleFault::CloseTimeout {
                        gate: secondary,
                        ticks: self.ticks,
                    });
                } else if preempt {
                    return Outcome::Preempted;
                } else {
                    self.ticks += 1;
                }
            }

            // A single-gate binding never reaches the second phase.
            (CyclePhase::SecondWaiting | CyclePhase::SecondOpened, None) => {
                self.enter(CyclePhase::Completed);
            }

            (CyclePhase::Completed, _) => return Outcome::Completed,
        }

        Outcome::Continue
    }
}

// ─── Directional wrapper ────────────────────────────────────────────

/// Inbound or outbound pass through both gates.
#[derive(Debug, Clone)]
pub struct TransitCycle {
    direction: Direction,
    sequencer: CycleSequencer,
}

impl TransitCycle {
    pub const fn new(direction: Direction) -> Self {
        Self {
            direction,
            sequencer: CycleSequencer::new(CycleBinding::transit(direction)),
        }
    }

    #[inline]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub const fn phase(&self) -> CyclePhase {
        self.sequencer.phase()
    }

    #[inline]
    pub const fn ticks(&self) -> u32 {
        self.sequencer.ticks()
    }

    #[inline]
    pub const fn binding(&self) -> CycleBinding {
        self.sequencer.binding()
    }

    pub const fn state(&self) -> InterlockState {
        InterlockState::transit(self.direction, self.sequencer.phase())
    }

    /// Advance one tick. `opposite_requested` must already be edge-filtered.
    pub fn tick(
        &mut self,
        gates: &mut Gates,
        gates_open: &mut bool,
        timeouts: Timeouts,
        opposite_requested: bool,
    ) -> Outcome {
        self.sequencer
            .tick(gates, gates_open, timeouts, opposite_requested)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
