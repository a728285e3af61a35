//! Gate model as seen by the sequencer.
//!
//! A `Gate` is the controller's view of one barrier: the sensed levels from
//! the last refresh plus the two flags the controller drives (open request
//! and working). There is no "fully open" sensor, so open is simply
//! "not on the closed limit".

use core::ops::{Index, IndexMut};

use sally_common::interlock::state::GateId;
use sally_common::interlock::status::Indicators;

/// Logical sensor levels for one gate, sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSample {
    pub closed: bool,
    pub enabled: bool,
    /// Per-gate open request input, recorded for diagnostics only.
    pub open_request_input: bool,
}

impl Default for GateSample {
    /// A closed, enabled gate with no local request.
    fn default() -> Self {
        Self {
            closed: true,
            enabled: true,
            open_request_input: false,
        }
    }
}

/// One physical barrier.
#[derive(Debug, Clone)]
pub struct Gate {
    id: GateId,
    closed: bool,
    enabled: bool,
    open_request_input: bool,
    open_requested: bool,
    working: bool,
}

impl Gate {
    /// Gate at power-up: closed, out of service until the first refresh.
    pub const fn new(id: GateId) -> Self {
        Self {
            id,
            closed: true,
            enabled: false,
            open_request_input: false,
            open_requested: false,
            working: false,
        }
    }

    /// Latch the sensed levels for this tick.
    #[inline]
    pub fn refresh(&mut self, sample: GateSample) {
        self.closed = sample.closed;
        self.enabled = sample.enabled;
        self.open_request_input = sample.open_request_input;
    }

    /// Assert or clear the actuator command.
    #[inline]
    pub fn request_open(&mut self, on: bool) {
        self.open_requested = on;
    }

    #[inline]
    pub fn set_working(&mut self, on: bool) {
        self.working = on;
    }

    #[inline]
    pub const fn id(&self) -> GateId {
        self.id
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.id.name()
    }

    #[inline]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub const fn is_open(&self) -> bool {
        !self.closed
    }

    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub const fn is_open_requested(&self) -> bool {
        self.open_requested
    }

    #[inline]
    pub const fn is_working(&self) -> bool {
        self.working
    }

    #[inline]
    pub const fn open_request_input(&self) -> bool {
        self.open_request_input
    }

    /// Per-gate indicator bits for the status word.
    pub fn indicators(&self) -> Indicators {
        let mut ind = Indicators::empty();
        ind.set(Indicators::closed(self.id), self.closed);
        ind.set(Indicators::enabled(self.id), self.enabled);
        ind.set(Indicators::working(self.id), self.working);
        ind.set(Indicators::open_request(self.id), self.open_requested);
        ind
    }
}

// ─── Gate pair ──────────────────────────────────────────────────────

/// Both barriers, indexable by [`GateId`].
#[derive(Debug, Clone)]
pub struct Gates([Gate; 2]);

impl Gates {
    pub const fn new() -> Self {
        Self([Gate::new(GateId::Outer), Gate::new(GateId::Inner)])
    }

    /// Latch one sample per gate, outer first.
    pub fn refresh(&mut self, samples: &[GateSample; 2]) {
        for (gate, sample) in self.0.iter_mut().zip(samples) {
            gate.refresh(*sample);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gate> {
        self.0.iter()
    }

    #[inline]
    pub fn enabled_count(&self) -> usize {
        self.0.iter().filter(|g| g.is_enabled()).count()
    }

    #[inline]
    pub fn both_enabled(&self) -> bool {
        self.0.iter().all(Gate::is_enabled)
    }

    #[inline]
    pub fn both_open(&self) -> bool {
        self.0.iter().all(Gate::is_open)
    }

    /// The single enabled gate, if exactly one is in service.
    pub fn sole_enabled(&self) -> Option<GateId> {
        match (self.0[0].is_enabled(), self.0[1].is_enabled()) {
            (true, false) => Some(GateId::Outer),
            (false, true) => Some(GateId::Inner),
            _ => None,
        }
    }

    /// Gates with their actuator command raised.
    #[inline]
    pub fn open_request_count(&self) -> usize {
        self.0.iter().filter(|g| g.is_open_requested()).count()
    }

    pub fn clear_requests(&mut self) {
        for gate in &mut self.0 {
            gate.request_open(false);
        }
    }

    pub fn clear_working(&mut self) {
        for gate in &mut self.0 {
            gate.set_working(false);
        }
    }

    /// Union of both gates' indicator bits.
    pub fn indicators(&self) -> Indicators {
        self.0[0].indicators() | self.0[1].indicators()
    }
}

impl Default for Gates {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<GateId> for Gates {
    type Output = Gate;

    #[inline]
    fn index(&self, id: GateId) -> &Gate {
        &self.0[id.index()]
    }
}

impl IndexMut<GateId> for Gates {
    #[inline]
    fn index_mut(&mut self, id: GateId) -> &mut Gate {
        &mut self.0[id.index()]
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
