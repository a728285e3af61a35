//! Interlock controller: the top-level arbiter.
//!
//! Owns both gates and at most one active procedure. Each call to
//! [`InterlockController::tick`] refreshes the gates, dispatches in priority
//! order and returns the indicator levels to drive:
//!
//! 1. stuck recovery in progress → continue it
//! 2. idle with a stuck request (both gates enabled) or a breach → start recovery
//! 3. transit cycle with the second gate open and the opposite direction newly
//!    requested → preempt
//! 4. transit cycle or single-gate fallback active → continue it
//! 5. idle, both gates enabled, inbound/outbound requested with the destination
//!    gate closed → start a transit cycle (inbound checked first)
//! 6. idle, exactly one gate enabled, a request with that gate closed → start
//!    the single-gate fallback
//! 7. otherwise stay idle
//!
//! Faults never leave `tick()`: they are logged, stored in
//! [`last_fault`](InterlockController::last_fault) and resolved by returning
//! to Idle in the same tick.

use heapless::HistoryBuffer;
use sally_common::consts::TRANSITION_HISTORY_LEN;
use sally_common::interlock::error::CycleFault;
use sally_common::interlock::state::{CycleKind, Direction, GateId, InterlockState};
use sally_common::interlock::status::{Indicators, StatusSnapshot};
use tracing::{debug, error, info, warn};

use crate::gate::Gates;
use crate::io::{InterlockInputs, Requests};
use crate::safety::interlock::{InterlockViolation, is_breach, verify};
use crate::safety::recovery::{StuckRecovery, StuckTrigger};
use crate::sequence::single::SingleGateFallback;
use crate::sequence::transit::TransitCycle;
use crate::sequence::{Outcome, Timeouts};

// ─── Active procedure ───────────────────────────────────────────────

/// The procedure that owns the tick, if any.
#[derive(Debug, Clone, Default)]
pub enum ActiveCycle {
    #[default]
    None,
    Transit(TransitCycle),
    Stuck(StuckRecovery),
    SingleGate(SingleGateFallback),
}

impl ActiveCycle {
    pub const fn kind(&self) -> CycleKind {
        match self {
            Self::None => CycleKind::None,
            Self::Transit(cycle) => CycleKind::transit(cycle.direction()),
            Self::Stuck(_) => CycleKind::Stuck,
            Self::SingleGate(_) => CycleKind::SingleGate,
        }
    }

    pub const fn state(&self) -> InterlockState {
        match self {
            Self::None => InterlockState::Idle,
            Self::Transit(cycle) => cycle.state(),
            Self::Stuck(recovery) => recovery.state(),
            Self::SingleGate(single) => single.state(),
        }
    }

    /// Ticks spent in the current state.
    pub const fn ticks(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Transit(cycle) => cycle.ticks(),
            Self::Stuck(recovery) => recovery.ticks(),
            Self::SingleGate(single) => single.ticks(),
        }
    }

    /// Direction shown on the inbound/outbound indicators.
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Self::Transit(cycle) => Some(cycle.direction()),
            Self::SingleGate(single) => Some(single.direction()),
            Self::None | Self::Stuck(_) => None,
        }
    }

    /// Primary and secondary gate of the active procedure.
    pub fn bound_gates(&self) -> (Option<GateId>, Option<GateId>) {
        match self {
            Self::None => (None, None),
            Self::Transit(cycle) => {
                let binding = cycle.binding();
                (Some(binding.primary()), binding.secondary())
            }
            Self::Stuck(recovery) => (recovery.target(), None),
            Self::SingleGate(single) => (Some(single.gate()), None),
        }
    }

    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// One entry of the transition history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Controller tick on which the transition happened.
    pub tick: u64,
    pub from: InterlockState,
    pub to: InterlockState,
}

// ─── Controller ─────────────────────────────────────────────────────

/// Sally-port interlock controller.
pub struct InterlockController {
    gates: Gates,
    active: ActiveCycle,
    requests: Requests,
    prev_requests: Requests,
    /// Latched aggregate "passage open" indicator.
    gates_open: bool,
    timeouts: Timeouts,
    tick_count: u64,
    last_fault: Option<CycleFault>,
    last_violation: Option<InterlockViolation>,
    history: HistoryBuffer<Transition, TRANSITION_HISTORY_LEN>,
}

impl InterlockController {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            gates: Gates::new(),
            active: ActiveCycle::None,
            requests: Requests::empty(),
            prev_requests: Requests::empty(),
            gates_open: false,
            timeouts,
            tick_count: 0,
            last_fault: None,
            last_violation: None,
            history: HistoryBuffer::new(),
        }
    }

    // ── Queries ──

    #[inline]
    pub fn state(&self) -> InterlockState {
        self.active.state()
    }

    #[inline]
    pub fn kind(&self) -> CycleKind {
        self.active.kind()
    }

    #[inline]
    pub fn active(&self) -> &ActiveCycle {
        &self.active
    }

    #[inline]
    pub fn gates(&self) -> &Gates {
        &self.gates
    }

    /// Ticks spent in the current state.
    #[inline]
    pub fn cycle_ticks(&self) -> u32 {
        self.active.ticks()
    }

    #[inline]
    pub fn gates_open(&self) -> bool {
        self.gates_open
    }

    #[inline]
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Ticks processed since construction.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Most recent fault, kept until the next one.
    #[inline]
    pub fn last_fault(&self) -> Option<CycleFault> {
        self.last_fault
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Transition> {
        self.history.oldest_ordered()
    }

    /// Indicator levels for the current state.
    pub fn indicators(&self) -> Indicators {
        let mut ind = self.gates.indicators();
        match self.active.direction() {
            Some(Direction::Inbound) => ind |= Indicators::INBOUND_ACTIVE,
            Some(Direction::Outbound) => ind |= Indicators::OUTBOUND_ACTIVE,
            None => {}
        }
        ind.set(Indicators::GATES_OPEN, self.gates_open);
        ind
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state(),
            kind: self.kind(),
            indicators: self.indicators(),
            cycle_ticks: self.cycle_ticks(),
        }
    }

    // ── Tick ──

    /// Process one tick and return the indicator levels to drive.
    pub fn tick(&mut self, inputs: &InterlockInputs) -> Indicators {
        self.gates.refresh(&inputs.gates);
        self.prev_requests = self.requests;
        self.requests = inputs.requests;

        let before = self.state();
        self.dispatch();
        let after = self.state();

        if before != after {
            debug!("moving from {before} to {after}");
            self.history.write(Transition {
                tick: self.tick_count,
                from: before,
                to: after,
            });
        }

        self.check_interlock();
        self.tick_count += 1;
        self.indicators()
    }

    fn dispatch(&mut self) {
        let rising = self.requests & !self.prev_requests;

        // 1. Stuck recovery in progress.
        if let ActiveCycle::Stuck(recovery) = &mut self.active {
            let outcome = recovery.tick(&mut self.gates, &mut self.gates_open, self.timeouts);
            self.settle(outcome);
            return;
        }

        // 2. Stuck request or breach while idle.
        if self.active.is_none() && self.gates.both_enabled() {
            let trigger = if self.requests.contains(Requests::STUCK) {
                Some(StuckTrigger::Requested)
            } else if is_breach(&self.gates) {
                Some(StuckTrigger::Breach)
            } else {
                None
            };
            if let Some(trigger) = trigger {
                self.start(ActiveCycle::Stuck(StuckRecovery::new(trigger)));
                return;
            }
        }

        // 3./4. Preempt or continue the running procedure.
        match &mut self.active {
            ActiveCycle::Transit(cycle) => {
                let opposite = cycle.direction().opposite();
                let outcome = cycle.tick(
                    &mut self.gates,
                    &mut self.gates_open,
                    self.timeouts,
                    rising.contains(Requests::transit(opposite)),
                );
                if outcome == Outcome::Preempted {
                    info!("{opposite} request preempts the {} cycle", opposite.opposite());
                    self.start(ActiveCycle::Transit(TransitCycle::new(opposite)));
                } else {
                    self.settle(outcome);
                }
                return;
            }
            ActiveCycle::SingleGate(single) => {
                let outcome = single.tick(&mut self.gates, &mut self.gates_open, self.timeouts);
                self.settle(outcome);
                return;
            }
            ActiveCycle::Stuck(_) | ActiveCycle::None => {}
        }

        // 5.-7. Idle.
        self.idle(rising);
    }

    fn idle(&mut self, rising: Requests) {
        self.gates.clear_requests();

        let requests = self.requests;
        let mut wanted = [Direction::Inbound, Direction::Outbound]
            .into_iter()
            .filter(move |dir| requests.contains(Requests::transit(*dir)));

        if self.gates.both_enabled() {
            // An open primary is waited out by the cycle itself; an open
            // destination would be driven open against it.
            let ready = wanted.find(|dir| self.gates[dir.secondary()].is_closed());
            if let Some(direction) = ready {
                self.start(ActiveCycle::Transit(TransitCycle::new(direction)));
            }
        } else if let Some(gate) = self.gates.sole_enabled() {
            if let Some(direction) = wanted.next() {
                if self.gates[gate].is_closed() {
                    self.start(ActiveCycle::SingleGate(SingleGateFallback::new(
                        gate, direction,
                    )));
                }
            }
        } else if rising.intersects(Requests::INBOUND | Requests::OUTBOUND) {
            warn!("request ignored: {}", CycleFault::NothingEnabled);
            self.last_fault = Some(CycleFault::NothingEnabled);
        }
    }

    /// Reset all cycle state and make `cycle` the active procedure.
    fn start(&mut self, cycle: ActiveCycle) {
        self.reset();

        match &cycle {
            ActiveCycle::Transit(transit) => {
                info!("{} cycle started", transit.direction());
            }
            ActiveCycle::SingleGate(single) => {
                info!(
                    "single-gate cycle started on {} gate ({} request)",
                    single.gate(),
                    single.direction()
                );
            }
            ActiveCycle::Stuck(recovery) => {
                warn!("stuck recovery started ({})", recovery.trigger());
            }
            ActiveCycle::None => {}
        }

        let (primary, secondary) = cycle.bound_gates();
        for gate in [primary, secondary].into_iter().flatten() {
            self.gates[gate].set_working(true);
        }
        self.active = cycle;
    }

    /// Apply a procedure outcome.
    fn settle(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Continue => {}
            Outcome::Completed => {
                info!("{:?} cycle complete", self.active.kind());
                self.reset();
            }
            Outcome::Aborted(fault) => {
                warn!("{} aborted: {fault}", self.active.state());
                self.last_fault = Some(fault);
                self.reset();
            }
            Outcome::Preempted => {
                // Only transit cycles preempt; handled in dispatch.
                self.reset();
            }
        }
    }

    /// Drop the active procedure and release both gates.
    ///
    /// The aggregate indicator is left as it is.
    fn reset(&mut self) {
        self.gates.clear_requests();
        self.gates.clear_working();
        self.active = ActiveCycle::None;
    }

    fn check_interlock(&mut self) {
        let result = verify(&self.gates);
        match result {
            Err(InterlockViolation::BothRequested) => {
                error!("{}; dropping both requests", InterlockViolation::BothRequested);
                self.gates.clear_requests();
            }
            Err(violation) if self.last_violation != Some(violation) => {
                error!("{violation}");
            }
            _ => {}
        }
        self.last_violation = result.err();
    }
}

impl Default for InterlockController {
    fn default() -> Self {
        Self::new(Timeouts::default())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
