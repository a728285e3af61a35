//! Integration test: stuck gate recovery.
//!
//! Started by the stuck key (both gates in service) or by a breach (both gates
//! reading open). The open gate is pulsed and its reclose awaited.

use sally_common::interlock::error::CycleFault;
use sally_common::interlock::state::{CycleKind, GateId, InterlockState};
use sally_common::interlock::status::Indicators;
use sally_interlock::Requests;

use super::Port;

#[test]
fn stuck_key_with_inner_open_pulses_inner() {
    let mut port = Port::new();
    port.closed(GateId::Inner, false);
    port.press(Requests::STUCK);

    assert_eq!(port.advance(), InterlockState::StuckStarted);
    assert_eq!(port.ctl.kind(), CycleKind::Stuck);
    port.release();

    let ind = port.step();
    assert_eq!(port.state(), InterlockState::StuckInnerWaiting);
    assert!(ind.contains(Indicators::INNER_OPEN_REQUEST | Indicators::INNER_WORKING));
    assert!(!ind.contains(Indicators::OUTER_OPEN_REQUEST));

    assert_eq!(port.advance(), InterlockState::StuckInnerOpened);
    assert!(!port.open_requested(GateId::Inner));

    port.closed(GateId::Inner, true);
    assert_eq!(port.advance(), InterlockState::StuckComplete);
    assert_eq!(port.advance(), InterlockState::Idle);
    assert_eq!(port.ctl.last_fault(), None);
}

#[test]
fn stuck_key_with_both_closed_targets_outer() {
    let mut port = Port::new();
    port.press(Requests::STUCK);
    port.step();
    port.release();
    assert_eq!(port.advance(), InterlockState::StuckOuterWaiting);
    assert!(port.open_requested(GateId::Outer));
}

#[test]
fn stuck_key_outranks_transit_requests() {
    let mut port = Port::new();
    port.press(Requests::STUCK | Requests::INBOUND | Requests::OUTBOUND);
    assert_eq!(port.advance(), InterlockState::StuckStarted);
}

#[test]
fn stuck_key_ignored_with_a_gate_out_of_service() {
    let mut port = Port::new();
    port.enabled(GateId::Outer, false);
    port.press(Requests::STUCK);
    for _ in 0..3 {
        assert_eq!(port.advance(), InterlockState::Idle);
    }
}

#[test]
fn breach_starts_recovery_without_a_request() {
    let mut port = Port::new();
    port.closed(GateId::Outer, false).closed(GateId::Inner, false);

    assert_eq!(port.advance(), InterlockState::StuckStarted);
    assert_eq!(port.advance(), InterlockState::StuckOuterWaiting);
    assert_eq!(port.advance(), InterlockState::StuckOuterOpened);

    // Both reclose: aggregate cleared on completion.
    port.closed(GateId::Outer, true).closed(GateId::Inner, true);
    assert_eq!(port.advance(), InterlockState::StuckComplete);
    assert!(!port.ctl.gates_open());
    assert_eq!(port.advance(), InterlockState::Idle);
}

#[test]
fn recovery_aborts_when_gate_never_recloses() {
    let mut port = Port::new();
    port.closed(GateId::Inner, false);
    port.press(Requests::STUCK);
    port.step();
    port.release();
    port.step();
    assert_eq!(port.advance(), InterlockState::StuckInnerOpened);

    assert!(port.run_to_idle(20).is_some());
    assert_eq!(
        port.ctl.last_fault(),
        Some(CycleFault::CloseTimeout {
            gate: GateId::Inner,
            ticks: super::T.close_ticks + 1
        })
    );
    assert!(!port.ctl.gates()[GateId::Inner].is_working());
}

#[test]
fn gate_leaving_service_skips_recovery() {
    let mut port = Port::new();
    port.press(Requests::STUCK);
    port.step();
    port.release();
    port.enabled(GateId::Inner, false);

    assert_eq!(port.advance(), InterlockState::StuckComplete);
    assert_eq!(port.advance(), InterlockState::Idle);
    assert_eq!(port.ctl.gates().open_request_count(), 0);
}

#[test]
fn stuck_key_waits_for_running_transit_cycle() {
    let mut port = Port::new();
    port.press(Requests::INBOUND);
    port.step();
    port.release();
    port.step();
    port.closed(GateId::Outer, false);
    port.step();
    port.closed(GateId::Outer, true);
    port.step();
    assert_eq!(port.advance(), InterlockState::InboundSecondWaiting);

    // Held from here on.
    port.press(Requests::STUCK);
    assert_eq!(port.advance(), InterlockState::InboundSecondWaiting);
    port.closed(GateId::Inner, false);
    assert_eq!(port.advance(), InterlockState::InboundSecondOpened);
    assert_eq!(port.advance(), InterlockState::InboundSecondOpened);
    assert_eq!(port.ctl.kind(), CycleKind::Inbound);

    port.closed(GateId::Inner, true);
    assert_eq!(port.advance(), InterlockState::InboundCompleted);
    assert_eq!(port.advance(), InterlockState::Idle);

    // Honoured only once the port is idle.
    assert_eq!(port.advance(), InterlockState::StuckStarted);
    assert_eq!(port.ctl.last_fault(), None);
}
