// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Startup banner

use log::info;

use crate::config::Config;
use crate::process::{Direction, RegisterMap, Signal};

const RULE_WIDTH: usize = 60;

fn describe(signal: Signal) -> &'static str {
    match signal {
        Signal::OpenCommand => "MV101_DO_Open (PLC writes open command)",
        Signal::CloseCommand => "MV101_DO_Close (PLC writes close command)",
        Signal::OpenStatus => "MV101_DI_ZSO (PLC reads open status)",
        Signal::ClosedStatus => "MV101_DI_ZSC (PLC reads closed status)",
    }
}

/// Lines shown once at startup: endpoint, register mapping and identity
pub fn banner_lines(config: &Config, map: &RegisterMap) -> Vec<String> {
    let rule = "=".repeat(RULE_WIDTH);
    let identity = &config.identity;
    let mut lines = vec![
        rule.clone(),
        format!(
            "{} - {} ({})",
            identity.product_name, identity.model_name, identity.product_code
        ),
        rule.clone(),
    ];

    if config.modbus.enabled {
        lines.push(format!(
            "Modbus Server: {}:{}",
            config.modbus.address, config.modbus.port
        ));
    } else {
        lines.push("Modbus Server: disabled".to_string());
    }

    lines.push(String::new());
    lines.push("Register Mapping:".to_string());
    for direction in [Direction::Status, Direction::Command] {
        let signals = match direction {
            Direction::Status => map.statuses().collect::<Vec<_>>(),
            Direction::Command => map.commands().collect::<Vec<_>>(),
        };
        for (signal, slot) in signals {
            let address = if slot.width == 1 {
                format!("{}", slot.address)
            } else {
                format!("{}-{}", slot.address, slot.end() - 1)
            };
            lines.push(format!("  Address {}: {}", address, describe(signal)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Feedback policy: {}, scan period: {} ms",
        config.simulation.feedback_policy, config.simulation.cycle_period_ms
    ));
    lines.push(format!(
        "Vendor: {} <{}>, revision {}",
        identity.vendor_name, identity.vendor_url, identity.major_minor_revision
    ));
    lines.push(rule);
    lines
}

pub fn log_banner(config: &Config, map: &RegisterMap) {
    for line in banner_lines(config, map) {
        info!("{}", line);
    }
}
