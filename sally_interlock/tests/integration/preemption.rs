//! Integration test: opposite-direction preemption.
//!
//! A fresh request for the opposite direction, seen while the second gate of
//! a transit cycle stands open, hands the port straight over to a new cycle.

use sally_common::interlock::state::{CycleKind, GateId, InterlockState};
use sally_common::interlock::status::Indicators;
use sally_interlock::Requests;

use super::{Port, inbound_to_second_opened};

#[test]
fn outbound_request_preempts_open_inbound_cycle() {
    let mut port = Port::new();
    inbound_to_second_opened(&mut port);
    port.step();
    port.step();
    assert!(port.ctl.cycle_ticks() > 0);

    port.press(Requests::OUTBOUND);
    let ind = port.step();
    assert_eq!(port.state(), InterlockState::OutboundStarted);
    assert_eq!(port.ctl.kind(), CycleKind::Outbound);
    assert_eq!(port.ctl.cycle_ticks(), 0);
    assert!(ind.contains(Indicators::OUTBOUND_ACTIVE));
    assert!(!ind.contains(Indicators::INBOUND_ACTIVE));

    let last = port.ctl.history().last().copied().unwrap();
    assert_eq!(last.from, InterlockState::InboundSecondOpened);
    assert_eq!(last.to, InterlockState::OutboundStarted);
}

#[test]
fn preempted_cycle_carries_on_through_the_open_inner_gate() {
    let mut port = Port::new();
    inbound_to_second_opened(&mut port);
    port.press(Requests::OUTBOUND);
    port.step();
    port.release();

    // Inner still open: the outbound first phase is satisfied at once.
    assert_eq!(port.advance(), InterlockState::OutboundFirstWaiting);
    assert_eq!(port.advance(), InterlockState::OutboundFirstOpened);
    port.closed(GateId::Inner, true);
    assert_eq!(port.advance(), InterlockState::OutboundFirstClosed);
    assert_eq!(port.advance(), InterlockState::OutboundSecondWaiting);
    assert!(port.open_requested(GateId::Outer));
}

#[test]
fn held_opposite_request_does_not_preempt() {
    let mut port = Port::new();
    port.press(Requests::INBOUND);
    port.step();
    // Outbound pressed early and held: no new edge at SecondOpened.
    port.press(Requests::OUTBOUND);
    port.step();
    port.closed(GateId::Outer, false);
    port.step();
    port.closed(GateId::Outer, true);
    port.step();
    port.step();
    port.closed(GateId::Inner, false);
    assert_eq!(port.advance(), InterlockState::InboundSecondOpened);

    for _ in 0..3 {
        assert_eq!(port.advance(), InterlockState::InboundSecondOpened);
    }
}

#[test]
fn same_direction_request_is_ignored() {
    let mut port = Port::new();
    inbound_to_second_opened(&mut port);

    port.press(Requests::INBOUND);
    assert_eq!(port.advance(), InterlockState::InboundSecondOpened);
    assert_eq!(port.ctl.kind(), CycleKind::Inbound);
}

#[test]
fn no_preemption_before_second_gate_opens() {
    let mut port = Port::new();
    port.press(Requests::INBOUND);
    port.step();
    port.release();
    assert_eq!(port.advance(), InterlockState::InboundFirstWaiting);

    port.press(Requests::OUTBOUND);
    assert_eq!(port.advance(), InterlockState::InboundFirstWaiting);
    assert_eq!(port.ctl.kind(), CycleKind::Inbound);
}

#[test]
fn reclose_wins_over_preemption() {
    let mut port = Port::new();
    inbound_to_second_opened(&mut port);

    port.closed(GateId::Inner, true);
    port.press(Requests::OUTBOUND);
    assert_eq!(port.advance(), InterlockState::InboundCompleted);
    assert!(!port.ctl.gates_open());
}
