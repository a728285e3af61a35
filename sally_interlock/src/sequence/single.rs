//! Single-gate fallback.
//!
//! Used when exactly one barrier is in service: the shared sequencer runs
//! with no secondary gate, so only the first phase ever executes and the
//! other barrier is never commanded.

use sally_common::interlock::state::{CyclePhase, Direction, GateId, GatePhase, InterlockState};

use super::transit::{CycleBinding, CycleSequencer};
use super::{Outcome, Timeouts};
use crate::gate::Gates;

/// One-phase open/close cycle on a single gate.
#[derive(Debug, Clone)]
pub struct SingleGateFallback {
    gate: GateId,
    /// Request that started the fallback, shown on the direction indicators.
    direction: Direction,
    sequencer: CycleSequencer,
}

impl SingleGateFallback {
    pub const fn new(gate: GateId, direction: Direction) -> Self {
        Self {
            gate,
            direction,
            sequencer: CycleSequencer::new(CycleBinding::single(gate)),
        }
    }

    #[inline]
    pub const fn gate(&self) -> GateId {
        self.gate
    }

    #[inline]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub const fn ticks(&self) -> u32 {
        self.sequencer.ticks()
    }

    pub const fn phase(&self) -> GatePhase {
        match self.sequencer.phase() {
            CyclePhase::Started => GatePhase::Started,
            CyclePhase::FirstWaiting => GatePhase::Waiting,
            CyclePhase::FirstOpened | CyclePhase::FirstClosed => GatePhase::Opened,
            CyclePhase::SecondWaiting | CyclePhase::SecondOpened | CyclePhase::Completed => {
                GatePhase::Complete
            }
        }
    }

    pub const fn state(&self) -> InterlockState {
        InterlockState::single(self.phase())
    }

    /// Advance one tick.
    pub fn tick(&mut self, gates: &mut Gates, gates_open: &mut bool, timeouts: Timeouts) -> Outcome {
        self.sequencer.tick(gates, gates_open, timeouts, false)
    }
}
