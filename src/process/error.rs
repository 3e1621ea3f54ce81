// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types of the process model
//!
//! Two families of errors exist and they never mix:
//!
//! - [`ConfigError`] is raised while the register map and the scan settings are
//!   built. It is fatal and always reported before the first scan cycle.
//! - [`StoreAccessError`] is raised by a [`RegisterStore`](super::RegisterStore)
//!   during steady-state scanning. The scan loop logs it and carries on.

use thiserror::Error;

use super::register_map::Signal;

/// Invalid register map or scan settings, detected at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Signals {first} and {second} overlap (registers {first_range:?} and {second_range:?})")]
    OverlappingSignals {
        first: Signal,
        second: Signal,
        first_range: std::ops::Range<u32>,
        second_range: std::ops::Range<u32>,
    },

    #[error("Signal {0} has a register width of zero")]
    ZeroWidth(Signal),

    #[error("Signal {signal} at address {address} with width {width} runs past the 16-bit address space")]
    AddressOverflow {
        signal: Signal,
        address: u16,
        width: u16,
    },

    #[error("Signal {signal} at address {address} with width {width} lies outside the register store (size {register_count})")]
    OutOfStoreRange {
        signal: Signal,
        address: u16,
        width: u16,
        register_count: u16,
    },

    #[error("Scan period must be greater than zero")]
    InvalidPeriod,

    #[error("Report cadence must be at least one cycle")]
    InvalidReportCadence,
}

/// Transient failure while accessing the shared register store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreAccessError {
    #[error("Register store is unavailable")]
    StoreUnavailable,

    #[error("Register range starting at {address} with count {count} is out of range")]
    AddressOutOfRange { address: u16, count: u16 },
}
