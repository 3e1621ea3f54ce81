// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Scan loop configuration

use serde::{Deserialize, Serialize};

use crate::process::{FeedbackPolicy, InitialState};

/// Timing and behavior of the scan loop.
///
/// # Example
///
/// ```
/// use rust_valve_simulator::config::SimulationConfig;
/// use rust_valve_simulator::process::{FeedbackPolicy, InitialState};
///
/// let simulation = SimulationConfig {
///     cycle_period_ms: 500,
///     report_every: 4,
///     feedback_policy: FeedbackPolicy::Inverted,
///     initial_state: InitialState::Closed,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Scan period in milliseconds. Must be greater than zero.
    #[serde(default = "default_cycle_period_ms")]
    pub cycle_period_ms: u64,

    /// Emit a diagnostic line every `report_every` cycles. Must be at least 1.
    #[serde(default = "default_report_every")]
    pub report_every: u64,

    /// How status bits are derived from command bits.
    #[serde(default)]
    pub feedback_policy: FeedbackPolicy,

    /// Valve position published before the first scan cycle.
    #[serde(default)]
    pub initial_state: InitialState,
}

fn default_cycle_period_ms() -> u64 {
    1000
}

fn default_report_every() -> u64 {
    2
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycle_period_ms: default_cycle_period_ms(),
            report_every: default_report_every(),
            feedback_policy: FeedbackPolicy::default(),
            initial_state: InitialState::default(),
        }
    }
}
