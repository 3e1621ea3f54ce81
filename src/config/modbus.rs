// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus TCP server configuration
//!
//! This module defines the structures for configuring the Modbus TCP server
//! that exposes the simulated valve to the PLC.

use serde::{Deserialize, Serialize};

use crate::process::DEFAULT_REGISTER_COUNT;

/// Configuration for the Modbus TCP server component.
///
/// This structure contains settings that control the Modbus TCP server functionality,
/// including network binding parameters, the size of the holding register table
/// and whether the server is enabled.
///
/// # Fields
///
/// * `enabled` - Flag to enable or disable the Modbus server
/// * `port` - TCP port number for the Modbus server (default: 502)
/// * `address` - Network address for the Modbus server to bind to (default: 0.0.0.0)
/// * `register_count` - Number of holding registers starting at address 0 (default: 1000)
///
/// # Example
///
/// ```
/// use rust_valve_simulator::config::ModbusConfig;
///
/// let modbus_config = ModbusConfig {
///     enabled: true,
///     port: 5020,
///     address: "127.0.0.1".to_string(),
///     register_count: 1000,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusConfig {
    /// Flag to enable or disable the Modbus server.
    ///
    /// When disabled the scan loop still runs against the in-memory register
    /// table, which is only useful for testing.
    pub enabled: bool,

    /// The TCP port the Modbus server will listen on.
    ///
    /// Valid range is 1-65534. Default value is 502, which is the standard Modbus TCP port.
    pub port: u16,

    /// The network address the Modbus server will bind to.
    ///
    /// Can be an IPv4/IPv6 address. Default is "0.0.0.0" so that a PLC on the
    /// process network can reach the simulator.
    pub address: String,

    /// Number of holding registers in the shared table, starting at address 0.
    #[serde(default = "default_register_count")]
    pub register_count: u16,
}

fn default_register_count() -> u16 {
    DEFAULT_REGISTER_COUNT
}

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 502,                      // Standard Modbus TCP port
            address: "0.0.0.0".to_string(), // Reachable by the PLC
            register_count: DEFAULT_REGISTER_COUNT,
        }
    }
}
