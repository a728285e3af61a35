//! Integration test: single-gate fallback.
//!
//! With one gate out of service the port works as a plain door: the gate in
//! service is cycled on either request and the other gate is never touched.

use sally_common::interlock::error::CycleFault;
use sally_common::interlock::state::{CycleKind, GateId, InterlockState};
use sally_common::interlock::status::Indicators;
use sally_interlock::Requests;

use super::Port;

#[test]
fn inbound_request_cycles_the_only_enabled_gate() {
    let mut port = Port::new();
    port.enabled(GateId::Outer, false);
    port.press(Requests::INBOUND);

    assert_eq!(port.advance(), InterlockState::SingleStarted);
    assert_eq!(port.ctl.kind(), CycleKind::SingleGate);
    port.release();

    let ind = port.step();
    assert_eq!(port.state(), InterlockState::SingleWaiting);
    assert!(ind.contains(Indicators::INNER_OPEN_REQUEST | Indicators::INBOUND_ACTIVE));
    assert!(!ind.contains(Indicators::OUTER_OPEN_REQUEST | Indicators::OUTER_WORKING));

    port.closed(GateId::Inner, false);
    let ind = port.step();
    assert_eq!(port.state(), InterlockState::SingleOpened);
    assert!(ind.contains(Indicators::GATES_OPEN));

    port.closed(GateId::Inner, true);
    let ind = port.step();
    assert_eq!(port.state(), InterlockState::SingleComplete);
    assert!(!ind.contains(Indicators::GATES_OPEN));
    assert_eq!(port.advance(), InterlockState::Idle);
}

#[test]
fn outer_never_touched_over_a_whole_cycle() {
    let mut port = Port::new();
    port.enabled(GateId::Outer, false);
    port.press(Requests::OUTBOUND);

    let mut outer_requested = false;
    for closed in [true, true, false, false, true, true, true] {
        port.closed(GateId::Inner, closed);
        port.step();
        outer_requested |= port.open_requested(GateId::Outer);
        port.release();
    }
    assert!(!outer_requested);
    assert!(port.state().is_idle());
}

#[test]
fn outer_only_cycle() {
    let mut port = Port::new();
    port.enabled(GateId::Inner, false);
    port.press(Requests::OUTBOUND);
    port.step();
    port.release();

    assert_eq!(port.advance(), InterlockState::SingleWaiting);
    assert!(port.open_requested(GateId::Outer));
    assert_eq!(port.ctl.active().bound_gates(), (Some(GateId::Outer), None));
}

#[test]
fn single_gate_open_timeout() {
    let mut port = Port::new();
    port.enabled(GateId::Outer, false);
    port.press(Requests::INBOUND);
    port.step();
    port.release();

    assert!(port.run_to_idle(10).is_some());
    assert_eq!(
        port.ctl.last_fault(),
        Some(CycleFault::OpenTimeout {
            gate: GateId::Inner,
            ticks: super::T.open_ticks + 1
        })
    );
}

#[test]
fn no_gate_in_service_rejects_requests() {
    let mut port = Port::new();
    port.enabled(GateId::Outer, false)
        .enabled(GateId::Inner, false);
    port.press(Requests::INBOUND);

    assert_eq!(port.advance(), InterlockState::Idle);
    assert_eq!(port.ctl.last_fault(), Some(CycleFault::NothingEnabled));
    assert_eq!(port.ctl.gates().open_request_count(), 0);
}
