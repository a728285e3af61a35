//! Integration test: complete transit cycles and their faults.

use sally_common::interlock::error::CycleFault;
use sally_common::interlock::state::{CycleKind, GateId, InterlockState};
use sally_common::interlock::status::Indicators;
use sally_interlock::Requests;

use super::{Port, inbound_to_second_opened};

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn full_inbound_cycle() {
    let mut port = Port::new();
    inbound_to_second_opened(&mut port);

    assert!(port.ctl.gates_open());
    assert_eq!(port.ctl.kind(), CycleKind::Inbound);
    assert!(!port.open_requested(GateId::Inner), "request dropped once open");

    port.closed(GateId::Inner, true);
    let ind = port.step();
    assert_eq!(port.state(), InterlockState::InboundCompleted);
    assert!(!ind.contains(Indicators::GATES_OPEN));

    assert_eq!(port.advance(), InterlockState::Idle);
    assert_eq!(port.ctl.kind(), CycleKind::None);
    assert_eq!(port.ctl.last_fault(), None);
}

#[test]
fn full_outbound_cycle_opens_inner_first() {
    let mut port = Port::new();
    port.press(Requests::OUTBOUND);
    assert_eq!(port.advance(), InterlockState::OutboundStarted);
    port.release();

    assert_eq!(port.advance(), InterlockState::OutboundFirstWaiting);
    assert!(port.open_requested(GateId::Inner));
    assert!(!port.open_requested(GateId::Outer));

    port.closed(GateId::Inner, false);
    assert_eq!(port.advance(), InterlockState::OutboundFirstOpened);
    port.closed(GateId::Inner, true);
    assert_eq!(port.advance(), InterlockState::OutboundFirstClosed);
    assert_eq!(port.advance(), InterlockState::OutboundSecondWaiting);
    assert!(port.open_requested(GateId::Outer));

    port.closed(GateId::Outer, false);
    let ind = port.step();
    assert_eq!(port.state(), InterlockState::OutboundSecondOpened);
    assert!(ind.contains(Indicators::GATES_OPEN | Indicators::OUTBOUND_ACTIVE));

    port.closed(GateId::Outer, true);
    assert_eq!(port.advance(), InterlockState::OutboundCompleted);
    assert_eq!(port.advance(), InterlockState::Idle);
}

#[test]
fn aggregate_clears_when_inner_recloses() {
    let mut port = Port::new();
    inbound_to_second_opened(&mut port);

    // Inner stays open for a while: aggregate stays raised.
    for _ in 0..3 {
        assert!(port.step().contains(Indicators::GATES_OPEN));
    }
    port.closed(GateId::Inner, true);
    assert!(!port.step().contains(Indicators::GATES_OPEN));
    assert!(!port.ctl.gates_open());
}

#[test]
fn outer_never_opens_times_out() {
    let mut port = Port::new();
    port.press(Requests::INBOUND);
    port.step();
    port.release();
    assert_eq!(port.advance(), InterlockState::InboundFirstWaiting);
    assert!(port.open_requested(GateId::Outer));

    // open_ticks = 3: the wait counts to 4, then aborts on the next tick.
    for expected in 1..=4 {
        assert_eq!(port.advance(), InterlockState::InboundFirstWaiting);
        assert_eq!(port.ctl.cycle_ticks(), expected);
    }
    assert_eq!(port.advance(), InterlockState::Idle);
    assert_eq!(
        port.ctl.last_fault(),
        Some(CycleFault::OpenTimeout {
            gate: GateId::Outer,
            ticks: 4
        })
    );
    assert!(!port.open_requested(GateId::Outer));
    assert!(!port.ctl.gates()[GateId::Outer].is_working());
}

#[test]
fn inner_never_recloses_aborts_with_aggregate_raised() {
    let mut port = Port::new();
    inbound_to_second_opened(&mut port);

    assert!(port.run_to_idle(20).is_some());
    assert!(matches!(
        port.ctl.last_fault(),
        Some(CycleFault::CloseTimeout {
            gate: GateId::Inner,
            ..
        })
    ));
    // The aggregate follows the passage, not the procedure.
    assert!(port.ctl.gates_open());
}

#[test]
fn idle_is_stable() {
    let mut port = Port::new();
    for _ in 0..2 {
        let ind = port.step();
        assert_eq!(port.state(), InterlockState::Idle);
        assert_eq!(ind.open_request_count(), 0);
        assert!(ind.contains(Indicators::OUTER_CLOSED | Indicators::INNER_CLOSED));
    }
    assert_eq!(port.ctl.history().count(), 0);
}

#[test]
fn request_with_destination_gate_open_waits() {
    let mut port = Port::new();
    port.closed(GateId::Inner, false);
    port.press(Requests::INBOUND);
    assert_eq!(port.advance(), InterlockState::Idle);
    assert_eq!(port.ctl.gates().open_request_count(), 0);

    port.closed(GateId::Inner, true);
    assert_eq!(port.advance(), InterlockState::InboundStarted);
}

#[test]
fn open_first_gate_is_waited_out_before_the_second() {
    let mut port = Port::new();
    port.closed(GateId::Outer, false);
    port.press(Requests::INBOUND);
    assert_eq!(port.advance(), InterlockState::InboundStarted);
    port.release();

    assert_eq!(port.advance(), InterlockState::InboundFirstWaiting);
    assert_eq!(port.advance(), InterlockState::InboundFirstOpened);
    for _ in 0..3 {
        assert_eq!(port.advance(), InterlockState::InboundFirstOpened);
        assert!(!port.open_requested(GateId::Inner));
    }

    port.closed(GateId::Outer, true);
    assert_eq!(port.advance(), InterlockState::InboundFirstClosed);
    assert_eq!(port.advance(), InterlockState::InboundSecondWaiting);
    assert!(port.open_requested(GateId::Inner));
}

/// Gates that follow their open command: open while commanded, then
/// reclose after `hold` ticks.
struct ObedientPlant {
    hold: [u32; 2],
}

impl ObedientPlant {
    const HOLD: u32 = 3;

    fn step(&mut self, port: &mut Port) {
        for gate in GateId::ALL {
            let i = gate.index();
            if port.open_requested(gate) {
                port.closed(gate, false);
                self.hold[i] = Self::HOLD;
            } else if !port.gates[i].closed {
                self.hold[i] = self.hold[i].saturating_sub(1);
                if self.hold[i] == 0 {
                    port.closed(gate, true);
                }
            }
        }
    }
}

#[test]
fn transit_cycles_never_see_both_gates_open() {
    let mut port = Port::new();
    let mut plant = ObedientPlant { hold: [4, 0] };
    port.closed(GateId::Outer, false);

    // Outbound asked for while the outer gate still stands open, then
    // inbound once the port is idle again.
    for request in [Requests::OUTBOUND, Requests::INBOUND, Requests::OUTBOUND] {
        port.press(request);
        for _ in 0..40 {
            port.step();
            if !port.state().is_idle() {
                port.release();
            }
            plant.step(&mut port);
            if matches!(port.ctl.kind(), CycleKind::Inbound | CycleKind::Outbound) {
                assert!(
                    port.gates.iter().any(|g| g.closed),
                    "both gates open in {}",
                    port.state()
                );
            }
        }
        assert!(port.state().is_idle());
    }

    let completed = port
        .ctl
        .history()
        .filter(|t| {
            matches!(
                t.to,
                InterlockState::InboundCompleted | InterlockState::OutboundCompleted
            )
        })
        .count();
    assert_eq!(completed, 3);
    assert_eq!(port.ctl.last_fault(), None);
}

#[test]
fn at_most_one_open_request_per_tick() {
    let mut port = Port::new();
    port.press(Requests::INBOUND);

    let mut max = 0;
    let script: [(GateId, bool); 6] = [
        (GateId::Outer, true),
        (GateId::Outer, false),
        (GateId::Outer, true),
        (GateId::Inner, true),
        (GateId::Inner, false),
        (GateId::Inner, true),
    ];
    for (gate, closed) in script {
        port.closed(gate, closed);
        for _ in 0..2 {
            max = max.max(port.step().open_request_count());
        }
    }
    assert!(max <= 1);
}

#[test]
fn history_records_every_transition_in_order() {
    let mut port = Port::new();
    inbound_to_second_opened(&mut port);
    port.closed(GateId::Inner, true);
    port.run_to_idle(5);

    let path: Vec<InterlockState> = port.ctl.history().map(|t| t.to).collect();
    assert_eq!(
        path,
        vec![
            InterlockState::InboundStarted,
            InterlockState::InboundFirstWaiting,
            InterlockState::InboundFirstOpened,
            InterlockState::InboundFirstClosed,
            InterlockState::InboundSecondWaiting,
            InterlockState::InboundSecondOpened,
            InterlockState::InboundCompleted,
            InterlockState::Idle,
        ]
    );
    let ticks: Vec<u64> = port.ctl.history().map(|t| t.tick).collect();
    assert!(ticks.windows(2).all(|w| w[0] < w[1]));
}
