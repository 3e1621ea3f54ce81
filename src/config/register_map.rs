// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Register map configuration
//!
//! Raw, unvalidated slots as read from the configuration file. They become a
//! [`RegisterMap`](crate::process::RegisterMap) through
//! [`RegisterMap::from_config`](crate::process::RegisterMap::from_config),
//! which rejects overlapping or empty slots.

use serde::{Deserialize, Serialize};

use crate::process::{RegisterMap, RegisterSlot, Signal};

/// Holding register slot of every valve signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMapConfig {
    /// Open command written by the PLC (default: register 200)
    pub open_command: RegisterSlot,
    /// Close command written by the PLC (default: register 201)
    pub close_command: RegisterSlot,
    /// Fully open feedback read by the PLC (default: register 100)
    pub open_status: RegisterSlot,
    /// Fully closed feedback read by the PLC (default: register 101)
    pub closed_status: RegisterSlot,
}

impl Default for RegisterMapConfig {
    fn default() -> Self {
        let map = RegisterMap::default();
        Self {
            open_command: map.address_of(Signal::OpenCommand),
            close_command: map.address_of(Signal::CloseCommand),
            open_status: map.address_of(Signal::OpenStatus),
            closed_status: map.address_of(Signal::ClosedStatus),
        }
    }
}
