//! I/O Registry: runtime role-based I/O access.
//!
//! Built at startup from `IoConfig`. Immutable after construction.
//! All runtime read/write methods are a HashMap lookup plus one bit
//! operation, no heap allocation.

use std::collections::HashMap;
use std::fmt;

use super::config::{IoConfig, IoPoint};
use super::role::{DiLogic, IoPointType, IoRole};
use crate::consts::{BANK_WORDS, MAX_DI, MAX_DO};

/// Digital input bank, bit N = DI pin N (raw wire level).
pub type DiBank = [u64; BANK_WORDS];

/// Digital output bank, bit N = DO pin N (raw wire level).
pub type DoBank = [u64; BANK_WORDS];

// ─── Error Types ────────────────────────────────────────────────────

/// I/O configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoConfigError {
    /// Two I/O points share the same `(type, pin)` pair.
    PinDuplicate {
        io_type: IoPointType,
        pin: u16,
        group_a: String,
        group_b: String,
    },
    /// Pin number does not fit in the bank.
    PinOutOfRange {
        io_type: IoPointType,
        pin: u16,
        limit: usize,
    },
    /// Two I/O points share the same role string.
    RoleDuplicate {
        role: String,
        group_a: String,
        group_b: String,
    },
    /// Role assigned to wrong I/O type.
    RoleTypeMismatch {
        role: String,
        expected_type: IoPointType,
        actual_type: IoPointType,
    },
    /// Role the interlock needs is not bound to any point.
    RoleMissing { role: String },
    /// Role string failed to parse.
    RoleParseError { role_str: String, error: String },
}

impl fmt::Display for IoConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinDuplicate {
                io_type,
                pin,
                group_a,
                group_b,
            } => write!(
                f,
                "duplicate pin ({io_type}, {pin}) in groups '{group_a}' and '{group_b}'"
            ),
            Self::PinOutOfRange {
                io_type,
                pin,
                limit,
            } => write!(f, "{io_type} pin {pin} out of range (limit {limit})"),
            Self::RoleDuplicate {
                role,
                group_a,
                group_b,
            } => write!(
                f,
                "duplicate role '{role}' in groups '{group_a}' and '{group_b}'"
            ),
            Self::RoleTypeMismatch {
                role,
                expected_type,
                actual_type,
            } => write!(
                f,
                "role '{role}' expects {expected_type} but assigned to {actual_type}"
            ),
            Self::RoleMissing { role } => write!(f, "missing required role '{role}'"),
            Self::RoleParseError { role_str, error } => {
                write!(f, "role parse error for '{role_str}': {error}")
            }
        }
    }
}

impl std::error::Error for IoConfigError {}

// ─── IoBinding ──────────────────────────────────────────────────────

/// Runtime binding of a role to its physical I/O point.
#[derive(Debug, Clone)]
pub struct IoBinding {
    /// Group key from io.toml.
    pub group_key: String,
    /// Index within the group's `io` array.
    pub point_idx: usize,
    pub io_type: IoPointType,
    pub pin: u16,
    /// DI logic (NO/NC). Only meaningful for DI.
    pub logic: DiLogic,
    /// DO inversion flag.
    pub inverted: bool,
    /// Initial logical DO level.
    pub init: bool,
    /// Initial logical level for the simulation driver.
    pub sim: Option<bool>,
    pub name: Option<String>,
}

impl IoBinding {
    /// Physical level on the wire for a logical level.
    #[inline]
    pub fn to_wire(&self, logical: bool) -> bool {
        match self.io_type {
            IoPointType::Di => match self.logic {
                DiLogic::NO => logical,
                DiLogic::NC => !logical,
            },
            IoPointType::Do => logical != self.inverted,
        }
    }

    /// Logical level for a physical wire level.
    ///
    /// Both mappings are involutions, so this mirrors [`to_wire`](Self::to_wire).
    #[inline]
    pub fn from_wire(&self, wire: bool) -> bool {
        self.to_wire(wire)
    }
}

// ─── IoRegistry ─────────────────────────────────────────────────────

/// Runtime I/O registry: maps `IoRole` to `IoBinding`.
///
/// Built once at startup. Immutable after construction.
#[derive(Debug, Clone)]
pub struct IoRegistry {
    bindings: HashMap<IoRole, IoBinding>,
    pub di_count: u16,
    pub do_count: u16,
}

impl IoRegistry {
    /// Build the registry from an `IoConfig`, running all structural checks.
    ///
    /// Returns the first validation error encountered. Required roles are
    /// checked separately by [`validate_required_roles`](Self::validate_required_roles).
    pub fn from_config(config: &IoConfig) -> Result<Self, IoConfigError> {
        let mut bindings = HashMap::new();
        let mut pin_map: HashMap<(IoPointType, u16), String> = HashMap::new();
        let mut role_map: HashMap<String, String> = HashMap::new();
        let mut di_count: u16 = 0;
        let mut do_count: u16 = 0;

        for (group_key, group) in &config.groups {
            for (idx, point) in group.io.iter().enumerate() {
                let limit = match point.io_type {
                    IoPointType::Di => {
                        di_count += 1;
                        MAX_DI
                    }
                    IoPointType::Do => {
                        do_count += 1;
                        MAX_DO
                    }
                };

                if point.pin as usize >= limit {
                    return Err(IoConfigError::PinOutOfRange {
                        io_type: point.io_type,
                        pin: point.pin,
                        limit,
                    });
                }

                let pin_key = (point.io_type, point.pin);
                if let Some(prev_group) = pin_map.get(&pin_key) {
                    return Err(IoConfigError::PinDuplicate {
                        io_type: point.io_type,
                        pin: point.pin,
                        group_a: prev_group.clone(),
                        group_b: group_key.clone(),
                    });
                }
                pin_map.insert(pin_key, group_key.clone());

                let Some(role_str) = &point.role else {
                    continue;
                };

                if let Some(prev_group) = role_map.get(role_str) {
                    return Err(IoConfigError::RoleDuplicate {
                        role: role_str.clone(),
                        group_a: prev_group.clone(),
                        group_b: group_key.clone(),
                    });
                }
                role_map.insert(role_str.clone(), group_key.clone());

                let role: IoRole =
                    role_str
                        .parse()
                        .map_err(|e: String| IoConfigError::RoleParseError {
                            role_str: role_str.clone(),
                            error: e,
                        })?;

                if let Some(expected) = role.expected_io_type() {
                    if expected != point.io_type {
                        return Err(IoConfigError::RoleTypeMismatch {
                            role: role_str.clone(),
                            expected_type: expected,
                            actual_type: point.io_type,
                        });
                    }
                }

                bindings.insert(role, Self::build_binding(group_key, idx, point));
            }
        }

        Ok(Self {
            bindings,
            di_count,
            do_count,
        })
    }

    fn build_binding(group_key: &str, idx: usize, point: &IoPoint) -> IoBinding {
        IoBinding {
            group_key: group_key.to_string(),
            point_idx: idx,
            io_type: point.io_type,
            pin: point.pin,
            logic: point.logic.unwrap_or_default(),
            inverted: point.inverted.unwrap_or(false),
            init: point.init.unwrap_or(false),
            sim: point.sim,
            name: point.name.clone(),
        }
    }

    /// Look up a binding by role.
    pub fn get(&self, role: &IoRole) -> Option<&IoBinding> {
        self.bindings.get(role)
    }

    /// Check if a role exists in the registry.
    pub fn has_role(&self, role: &IoRole) -> bool {
        self.bindings.contains_key(role)
    }

    /// Number of registered role bindings.
    pub fn role_count(&self) -> usize {
        self.bindings.len()
    }

    /// Iterate every bound role.
    pub fn iter(&self) -> impl Iterator<Item = (&IoRole, &IoBinding)> {
        self.bindings.iter()
    }

    // ─── Runtime I/O Access ─────────────────────────────────────────

    /// Binding for `role` if it is bound as `io_type`.
    ///
    /// A role bound with the other direction is treated as unbound.
    #[inline]
    fn binding_of(&self, role: &IoRole, io_type: IoPointType) -> Option<&IoBinding> {
        self.bindings.get(role).filter(|b| b.io_type == io_type)
    }

    /// Read a digital input with NC/NO logic applied.
    ///
    /// Returns the logical value: `true` = signal active.
    /// - NO: true when raw bit is set.
    /// - NC: inverted, raw 0 = active `true`.
    ///
    /// `None` if the role is unbound or bound as an output.
    pub fn read_di(&self, role: &IoRole, di_bank: &DiBank) -> Option<bool> {
        let binding = self.binding_of(role, IoPointType::Di)?;
        Some(binding.from_wire(extract_bit(di_bank, binding.pin)))
    }

    /// Write a digital output with inversion applied.
    pub fn write_do(&self, role: &IoRole, value: bool, do_bank: &mut DoBank) -> Option<()> {
        let binding = self.binding_of(role, IoPointType::Do)?;
        set_bit(do_bank, binding.pin, binding.to_wire(value));
        Some(())
    }

    /// Read back a digital output as a logical level.
    ///
    /// Used by the simulation driver to see what the controller commanded.
    pub fn read_do(&self, role: &IoRole, do_bank: &DoBank) -> Option<bool> {
        let binding = self.binding_of(role, IoPointType::Do)?;
        Some(binding.from_wire(extract_bit(do_bank, binding.pin)))
    }

    /// Drive a digital input to a logical level.
    ///
    /// Used by the simulation driver to present sensor levels the same way
    /// field wiring would.
    pub fn write_di(&self, role: &IoRole, value: bool, di_bank: &mut DiBank) -> Option<()> {
        let binding = self.binding_of(role, IoPointType::Di)?;
        set_bit(di_bank, binding.pin, binding.to_wire(value));
        Some(())
    }

    /// DI bank with every bound input at its `sim` level (inactive if unset).
    pub fn initial_di_bank(&self) -> DiBank {
        let mut bank = [0u64; BANK_WORDS];
        for binding in self.bindings.values() {
            if binding.io_type == IoPointType::Di {
                let level = binding.sim.unwrap_or(false);
                set_bit(&mut bank, binding.pin, binding.to_wire(level));
            }
        }
        bank
    }

    /// DO bank with every bound output at its `init` level.
    pub fn initial_do_bank(&self) -> DoBank {
        let mut bank = [0u64; BANK_WORDS];
        for binding in self.bindings.values() {
            if binding.io_type == IoPointType::Do {
                set_bit(&mut bank, binding.pin, binding.to_wire(binding.init));
            }
        }
        bank
    }

    // ─── Validation ─────────────────────────────────────────────────

    /// Validate that every role the interlock reads or drives is bound.
    ///
    /// Collects all missing roles rather than stopping at the first.
    pub fn validate_required_roles(&self) -> Result<(), Vec<IoConfigError>> {
        let mut errors = Vec::new();
        for role in IoRole::required() {
            self.require_role(&role, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn require_role(&self, role: &IoRole, errors: &mut Vec<IoConfigError>) {
        if !self.has_role(role) {
            errors.push(IoConfigError::RoleMissing {
                role: role.to_string(),
            });
        }
    }
}

// ─── Bit Manipulation Helpers ───────────────────────────────────────

/// Extract a single bit from a bank. Bit N corresponds to pin N.
#[inline]
pub fn extract_bit(bank: &[u64; BANK_WORDS], pin: u16) -> bool {
    let word = (pin / 64) as usize;
    let bit = pin % 64;
    if word < BANK_WORDS {
        (bank[word] >> bit) & 1 != 0
    } else {
        false
    }
}

/// Set a single bit in a bank. Out-of-range pins are ignored.
#[inline]
pub fn set_bit(bank: &mut [u64; BANK_WORDS], pin: u16, value: bool) {
    let word = (pin / 64) as usize;
    let bit = pin % 64;
    if word < BANK_WORDS {
        if value {
            bank[word] |= 1u64 << bit;
        } else {
            bank[word] &= !(1u64 << bit);
        }
    }
}
