//! Shared helpers for the interlock integration tests.

mod fallback;
mod preemption;
mod scenarios;
mod simulated_plant;
mod stuck_recovery;

use sally_common::interlock::state::{GateId, InterlockState};
use sally_common::interlock::status::Indicators;
use sally_interlock::gate::GateSample;
use sally_interlock::{InterlockController, InterlockInputs, Requests, Timeouts};

/// Short budgets so timeouts are reachable in a handful of ticks.
pub const T: Timeouts = Timeouts {
    open_ticks: 3,
    close_ticks: 6,
};

/// Hand-driven sally-port: the test sets sensor levels and request buttons,
/// then steps the controller one tick at a time.
pub struct Port {
    pub ctl: InterlockController,
    pub requests: Requests,
    pub gates: [GateSample; 2],
}

impl Port {
    pub fn new() -> Self {
        Self {
            ctl: InterlockController::new(T),
            requests: Requests::empty(),
            gates: [GateSample::default(); 2],
        }
    }

    pub fn closed(&mut self, gate: GateId, closed: bool) -> &mut Self {
        self.gates[gate.index()].closed = closed;
        self
    }

    pub fn enabled(&mut self, gate: GateId, enabled: bool) -> &mut Self {
        self.gates[gate.index()].enabled = enabled;
        self
    }

    pub fn press(&mut self, requests: Requests) -> &mut Self {
        self.requests = requests;
        self
    }

    pub fn release(&mut self) -> &mut Self {
        self.requests = Requests::empty();
        self
    }

    pub fn step(&mut self) -> Indicators {
        let inputs = InterlockInputs {
            requests: self.requests,
            gates: self.gates,
        };
        self.ctl.tick(&inputs)
    }

    pub fn state(&self) -> InterlockState {
        self.ctl.state()
    }

    /// Step and return the state reached.
    pub fn advance(&mut self) -> InterlockState {
        self.step();
        self.state()
    }

    /// Step until Idle, at most `limit` ticks. Returns the ticks taken.
    pub fn run_to_idle(&mut self, limit: u32) -> Option<u32> {
        (1..=limit).find(|_| self.advance().is_idle())
    }

    pub fn open_requested(&self, gate: GateId) -> bool {
        self.ctl.gates()[gate].is_open_requested()
    }
}

/// Drive an inbound cycle up to the point where the inner gate stands open.
pub fn inbound_to_second_opened(port: &mut Port) {
    port.press(Requests::INBOUND);
    assert_eq!(port.advance(), InterlockState::InboundStarted);
    port.release();
    assert_eq!(port.advance(), InterlockState::InboundFirstWaiting);
    port.closed(GateId::Outer, false);
    assert_eq!(port.advance(), InterlockState::InboundFirstOpened);
    port.closed(GateId::Outer, true);
    assert_eq!(port.advance(), InterlockState::InboundFirstClosed);
    assert_eq!(port.advance(), InterlockState::InboundSecondWaiting);
    port.closed(GateId::Inner, false);
    assert_eq!(port.advance(), InterlockState::InboundSecondOpened);
}
