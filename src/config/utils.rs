// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::Config;
use crate::process::{RegisterMap, ScanSettings};

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line. It outputs the full JSON schema for the configuration
/// to stdout, formatted for readability.
///
/// ### Example
///
/// ```bash
/// ./rust_valve_simulator --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let formatted_schema = config_schema_pretty()?;
    println!("{}", formatted_schema);
    Ok(())
}

/// The embedded JSON schema, pretty-printed
pub fn config_schema_pretty() -> Result<String> {
    let schema: serde_json::Value =
        serde_json::from_str(super::CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
    serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
///
/// ### Arguments
///
/// * `addr` - The address string to validate
///
/// ### Returns
///
/// `true` if the address is valid, `false` otherwise
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against rules that aren't covered by the JSON schema.
///
/// ### Validation Rules
///
/// - **Port Range**: the Modbus port must be within 1-65534
/// - **IP Address Format**: a suspicious address only produces a warning
/// - **Scan Settings**: the scan period and the report cadence must be non-zero
/// - **Register Map**: slots must be non-empty, must not overlap and must fit
///   in the holding register table
///
/// ### Returns
///
/// * `Ok(())` if all validations pass
/// * `Err(anyhow::Error)` with descriptive message if any validation fails
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.modbus.port < 1 || config.modbus.port > 65534 {
        anyhow::bail!("Invalid Modbus port number: {}", config.modbus.port);
    }

    if !is_valid_ip_address(&config.modbus.address) {
        // Hostnames are accepted by the resolver, just flag it
        warn!(
            "Potentially invalid Modbus address format: {}",
            config.modbus.address
        );
    }

    if config.modbus.register_count == 0 {
        anyhow::bail!("Modbus register table must hold at least one register");
    }

    ScanSettings::from_config(&config.simulation).context("Invalid simulation settings")?;

    let map = RegisterMap::from_config(&config.register_map).context("Invalid register map")?;
    map.validate_against_store(config.modbus.register_count)
        .context("Invalid register map")?;

    Ok(())
}
