//! Role-based adapter between the DI/DO banks and the controller.
//!
//! The controller only sees logical levels. Active-low wiring is handled by
//! the registry (`logic = "NC"` on inputs, `inverted = true` on outputs).

use bitflags::bitflags;
use sally_common::interlock::state::{Direction, GateId};
use sally_common::interlock::status::Indicators;
use sally_common::io::registry::{DiBank, DoBank, IoRegistry};
use sally_common::io::role::IoRole;

use crate::gate::GateSample;

bitflags! {
    /// Controller-level request inputs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Requests: u8 {
        const INBOUND  = 0x01;
        const OUTBOUND = 0x02;
        const STUCK    = 0x04;
    }
}

impl Requests {
    /// Transit request flag for a direction.
    #[inline]
    pub const fn transit(direction: Direction) -> Self {
        match direction {
            Direction::Inbound => Self::INBOUND,
            Direction::Outbound => Self::OUTBOUND,
        }
    }
}

/// Everything the controller consumes on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterlockInputs {
    pub requests: Requests,
    /// Outer first.
    pub gates: [GateSample; 2],
}

impl InterlockInputs {
    /// No requests, both gates closed and in service.
    pub fn quiet() -> Self {
        Self {
            requests: Requests::empty(),
            gates: [GateSample::default(); 2],
        }
    }

    pub fn with_requests(mut self, requests: Requests) -> Self {
        self.requests = requests;
        self
    }

    pub fn with_gate(mut self, gate: GateId, sample: GateSample) -> Self {
        self.gates[gate.index()] = sample;
        self
    }
}

impl Default for InterlockInputs {
    fn default() -> Self {
        Self::quiet()
    }
}

/// Decode one DI bank.
///
/// Required roles are checked at config load; an unbound optional role reads
/// inactive.
pub fn decode_inputs(registry: &IoRegistry, di: &DiBank) -> InterlockInputs {
    let level = |role: IoRole| registry.read_di(&role, di).unwrap_or(false);

    let mut requests = Requests::empty();
    requests.set(Requests::INBOUND, level(IoRole::InboundRequest));
    requests.set(Requests::OUTBOUND, level(IoRole::OutboundRequest));
    requests.set(Requests::STUCK, level(IoRole::StuckRequest));

    let gates = GateId::ALL.map(|gate| GateSample {
        closed: level(IoRole::Closed(gate)),
        enabled: level(IoRole::Enabled(gate)),
        open_request_input: level(IoRole::OpenRequestInput(gate)),
    });

    InterlockInputs { requests, gates }
}

/// Encode controller indicators into the DO bank.
///
/// Unbound output roles are skipped.
pub fn encode_outputs(registry: &IoRegistry, indicators: Indicators, do_bank: &mut DoBank) {
    let mut drive = |role: IoRole, flag: Indicators| {
        let _ = registry.write_do(&role, indicators.contains(flag), do_bank);
    };

    drive(IoRole::InboundActive, Indicators::INBOUND_ACTIVE);
    drive(IoRole::OutboundActive, Indicators::OUTBOUND_ACTIVE);
    drive(IoRole::GatesOpen, Indicators::GATES_OPEN);
    for gate in GateId::ALL {
        drive(IoRole::OpenRequest(gate), Indicators::open_request(gate));
        drive(IoRole::Working(gate), Indicators::working(gate));
        drive(IoRole::ClosedMirror(gate), Indicators::closed(gate));
    }
}
