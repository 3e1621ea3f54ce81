// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Register address map
//!
//! The single place where a physical signal of the valve is bound to a holding
//! register range. The scan loop only ever asks the map where a signal lives;
//! it never spells out a register number itself.
//!
//! ## Default mapping
//!
//! | Signal | Direction | Address | Width |
//! |--------|-----------|---------|-------|
//! | `OpenCommand` | PLC → Simulator | 200 | 1 |
//! | `CloseCommand` | PLC → Simulator | 201 | 1 |
//! | `OpenStatus` | Simulator → PLC | 100 | 1 |
//! | `ClosedStatus` | Simulator → PLC | 101 | 1 |

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::config::RegisterMapConfig;

/// A physical signal of the simulated valve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Commanded "open" state, written by the PLC
    OpenCommand,
    /// Commanded "close" state, written by the PLC
    CloseCommand,
    /// Valve fully open indicator, written by the simulator
    OpenStatus,
    /// Valve fully closed indicator, written by the simulator
    ClosedStatus,
}

/// Which side of the link owns a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// PLC → Simulator
    Command,
    /// Simulator → PLC
    Status,
}

impl Signal {
    pub const ALL: [Signal; 4] = [
        Signal::OpenCommand,
        Signal::CloseCommand,
        Signal::OpenStatus,
        Signal::ClosedStatus,
    ];

    pub fn direction(self) -> Direction {
        match self {
            Signal::OpenCommand | Signal::CloseCommand => Direction::Command,
            Signal::OpenStatus | Signal::ClosedStatus => Direction::Status,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Signal::OpenCommand => "OpenCommand",
            Signal::CloseCommand => "CloseCommand",
            Signal::OpenStatus => "OpenStatus",
            Signal::ClosedStatus => "ClosedStatus",
        }
    }

    fn index(self) -> usize {
        match self {
            Signal::OpenCommand => 0,
            Signal::CloseCommand => 1,
            Signal::OpenStatus => 2,
            Signal::ClosedStatus => 3,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A contiguous range of holding registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSlot {
    /// First register of the range
    pub address: u16,
    /// Number of 16-bit registers in the range
    #[serde(default = "default_width")]
    pub width: u16,
}

fn default_width() -> u16 {
    1
}

impl RegisterSlot {
    pub const fn new(address: u16, width: u16) -> Self {
        Self { address, width }
    }

    /// Exclusive end of the range, widened so `0xFFFF + 1` stays representable
    pub fn end(&self) -> u32 {
        u32::from(self.address) + u32::from(self.width)
    }

    pub fn range(&self) -> std::ops::Range<u32> {
        u32::from(self.address)..self.end()
    }

    pub fn overlaps(&self, other: &RegisterSlot) -> bool {
        u32::from(self.address) < other.end() && u32::from(other.address) < self.end()
    }
}

/// Validated, immutable mapping from [`Signal`] to [`RegisterSlot`]
///
/// Once built, a map is guaranteed to have non-empty slots that fit in the
/// 16-bit address space and never share a register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMap {
    slots: [RegisterSlot; 4],
}

impl RegisterMap {
    /// Build a map, rejecting empty, overflowing or overlapping slots
    pub fn new(
        open_command: RegisterSlot,
        close_command: RegisterSlot,
        open_status: RegisterSlot,
        closed_status: RegisterSlot,
    ) -> Result<Self, ConfigError> {
        let map = Self {
            slots: [open_command, close_command, open_status, closed_status],
        };

        for signal in Signal::ALL {
            let slot = map.address_of(signal);
            if slot.width == 0 {
                return Err(ConfigError::ZeroWidth(signal));
            }
            if slot.end() > u32::from(u16::MAX) + 1 {
                return Err(ConfigError::AddressOverflow {
                    signal,
                    address: slot.address,
                    width: slot.width,
                });
            }
        }

        for (i, first) in Signal::ALL.iter().enumerate() {
            for second in &Signal::ALL[i + 1..] {
                let a = map.address_of(*first);
                let b = map.address_of(*second);
                if a.overlaps(&b) {
                    return Err(ConfigError::OverlappingSignals {
                        first: *first,
                        second: *second,
                        first_range: a.range(),
                        second_range: b.range(),
                    });
                }
            }
        }

        Ok(map)
    }

    pub fn from_config(config: &RegisterMapConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.open_command,
            config.close_command,
            config.open_status,
            config.closed_status,
        )
    }

    /// Where a signal lives
    pub fn address_of(&self, signal: Signal) -> RegisterSlot {
        self.slots[signal.index()]
    }

    /// Check every slot against a store holding `register_count` registers from address 0
    pub fn validate_against_store(&self, register_count: u16) -> Result<(), ConfigError> {
        for signal in Signal::ALL {
            let slot = self.address_of(signal);
            if slot.end() > u32::from(register_count) {
                return Err(ConfigError::OutOfStoreRange {
                    signal,
                    address: slot.address,
                    width: slot.width,
                    register_count,
                });
            }
        }
        Ok(())
    }

    /// Signals written by the PLC
    pub fn commands(&self) -> impl Iterator<Item = (Signal, RegisterSlot)> + '_ {
        self.signals_in(Direction::Command)
    }

    /// Signals written by the simulator
    pub fn statuses(&self) -> impl Iterator<Item = (Signal, RegisterSlot)> + '_ {
        self.signals_in(Direction::Status)
    }

    fn signals_in(&self, direction: Direction) -> impl Iterator<Item = (Signal, RegisterSlot)> + '_ {
        Signal::ALL
            .into_iter()
            .filter(move |signal| signal.direction() == direction)
            .map(move |signal| (signal, self.address_of(signal)))
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            slots: [
                RegisterSlot::new(200, 1),
                RegisterSlot::new(201, 1),
                RegisterSlot::new(100, 1),
                RegisterSlot::new(101, 1),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_is_valid() {
        let default = RegisterMap::default();
        let rebuilt = RegisterMap::new(
            default.address_of(Signal::OpenCommand),
            default.address_of(Signal::CloseCommand),
            default.address_of(Signal::OpenStatus),
            default.address_of(Signal::ClosedStatus),
        )
        .unwrap();
        assert_eq!(default, rebuilt);
        assert!(default.validate_against_store(1000).is_ok());
    }

    #[test]
    fn test_slot_overlap() {
        let a = RegisterSlot::new(10, 2);
        assert!(a.overlaps(&RegisterSlot::new(11, 1)));
        assert!(a.overlaps(&RegisterSlot::new(9, 2)));
        assert!(!a.overlaps(&RegisterSlot::new(12, 1)));
        assert!(!a.overlaps(&RegisterSlot::new(8, 2)));
    }

    #[test]
    fn test_last_register_is_addressable() {
        let map = RegisterMap::new(
            RegisterSlot::new(0, 1),
            RegisterSlot::new(1, 1),
            RegisterSlot::new(2, 1),
            RegisterSlot::new(u16::MAX, 1),
        );
        assert!(map.is_ok());
    }

    #[test]
    fn test_directions() {
        let map = RegisterMap::default();
        let commands: Vec<Signal> = map.commands().map(|(s, _)| s).collect();
        let statuses: Vec<Signal> = map.statuses().map(|(s, _)| s).collect();
        assert_eq!(commands, vec![Signal::OpenCommand, Signal::CloseCommand]);
        assert_eq!(statuses, vec![Signal::OpenStatus, Signal::ClosedStatus]);
    }
}
