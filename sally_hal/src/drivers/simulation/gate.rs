//! Tick-based barrier plant.
//!
//! One `GateModel` per physical gate. It sees only the logical open command
//! and produces the logical closed/enabled sensor levels; wire polarity is
//! applied by the driver through the registry.

use sally_common::interlock::state::GateId;
use tracing::trace;

use super::config::GateModelConfig;

/// Mechanical state of a simulated barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMotion {
    /// On the closed limit.
    Closed,
    /// Command seen, still on the closed limit for `remaining` ticks.
    Opening { remaining: u32 },
    /// Off the closed limit, reclosing starts after `remaining` ticks.
    Open { remaining: u32 },
    /// Jammed open, waiting for the command to be pulsed again.
    Held,
    /// Swinging shut, closed limit made after `remaining` ticks.
    Closing { remaining: u32 },
}

/// Simulated barrier.
#[derive(Debug, Clone)]
pub struct GateModel {
    gate: GateId,
    config: GateModelConfig,
    motion: GateMotion,
    prev_command: bool,
}

impl GateModel {
    pub fn new(gate: GateId, config: GateModelConfig) -> Self {
        let motion = if config.start_open {
            if config.jammed_open {
                GateMotion::Held
            } else {
                GateMotion::Open {
                    remaining: config.hold_open_ticks,
                }
            }
        } else {
            GateMotion::Closed
        };
        Self {
            gate,
            config,
            motion,
            prev_command: false,
        }
    }

    /// Advance one tick with the current open command level.
    pub fn step(&mut self, open_command: bool) {
        let rising = open_command && !self.prev_command;
        self.prev_command = open_command;

        let next = match self.motion {
            GateMotion::Closed => {
                if open_command && !self.config.disabled && !self.config.jammed_closed {
                    self.start_opening()
                } else {
                    GateMotion::Closed
                }
            }
            GateMotion::Opening { remaining } => {
                if remaining <= 1 {
                    self.opened()
                } else {
                    GateMotion::Opening {
                        remaining: remaining - 1,
                    }
                }
            }
            GateMotion::Open { remaining } => {
                if remaining == 0 {
                    self.start_closing()
                } else {
                    GateMotion::Open {
                        remaining: remaining - 1,
                    }
                }
            }
            GateMotion::Held => {
                if rising {
                    self.start_closing()
                } else {
                    GateMotion::Held
                }
            }
            GateMotion::Closing { remaining } => {
                if remaining <= 1 {
                    GateMotion::Closed
                } else {
                    GateMotion::Closing {
                        remaining: remaining - 1,
                    }
                }
            }
        };

        if next != self.motion {
            trace!(gate = %self.gate, from = ?self.motion, to = ?next, "sim gate motion");
        }
        self.motion = next;
    }

    fn start_opening(&self) -> GateMotion {
        if self.config.open_delay_ticks == 0 {
            self.opened()
        } else {
            GateMotion::Opening {
                remaining: self.config.open_delay_ticks,
            }
        }
    }

    fn opened(&self) -> GateMotion {
        if self.config.jammed_open {
            GateMotion::Held
        } else {
            GateMotion::Open {
                remaining: self.config.hold_open_ticks,
            }
        }
    }

    fn start_closing(&self) -> GateMotion {
        if self.config.close_delay_ticks == 0 {
            GateMotion::Closed
        } else {
            GateMotion::Closing {
                remaining: self.config.close_delay_ticks,
            }
        }
    }

    /// Closed limit switch level.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self.motion, GateMotion::Closed | GateMotion::Opening { .. })
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        !self.config.disabled
    }

    #[inline]
    pub fn motion(&self) -> GateMotion {
        self.motion
    }

    #[inline]
    pub fn gate(&self) -> GateId {
        self.gate
    }
}
