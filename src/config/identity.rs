// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Device identification metadata
//!
//! Opaque strings describing the simulated device. They are only printed in the
//! startup banner and never interpreted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentityConfig {
    pub vendor_name: String,
    pub product_code: String,
    pub vendor_url: String,
    pub product_name: String,
    pub model_name: String,
    pub major_minor_revision: String,
}

impl Default for DeviceIdentityConfig {
    fn default() -> Self {
        Self {
            vendor_name: "SWaT Simulator".to_string(),
            product_code: "SIM-MV101".to_string(),
            vendor_url: "https://github.com/sctg-development".to_string(),
            product_name: "Minimal Process Simulator".to_string(),
            model_name: "MV101 Testbed".to_string(),
            major_minor_revision: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
