// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Feedback transform
//!
//! The only "physics" of the simulator: status bits are derived instantly from
//! the last command bits, with no travel time. A given instance applies a
//! single policy for its whole lifetime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::{CommandValues, StatusValues};

/// How status bits are derived from command bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackPolicy {
    /// `OpenStatus := OpenCommand`, `ClosedStatus := CloseCommand`
    ///
    /// Both status bits can be set together when the PLC asserts both
    /// commands; the simulator does not enforce mutual exclusion.
    #[default]
    Passthrough,
    /// `OpenStatus := OpenCommand`, `ClosedStatus := NOT OpenCommand`
    ///
    /// Single-command valves. `CloseCommand` is ignored.
    Inverted,
}

impl FeedbackPolicy {
    pub fn apply(self, commands: CommandValues) -> StatusValues {
        match self {
            FeedbackPolicy::Passthrough => StatusValues {
                open: commands.open,
                closed: commands.close,
            },
            FeedbackPolicy::Inverted => StatusValues {
                open: commands.open,
                closed: !commands.open,
            },
        }
    }
}

impl fmt::Display for FeedbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackPolicy::Passthrough => f.write_str("passthrough"),
            FeedbackPolicy::Inverted => f.write_str("inverted"),
        }
    }
}

impl FromStr for FeedbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "passthrough" => Ok(FeedbackPolicy::Passthrough),
            "inverted" => Ok(FeedbackPolicy::Inverted),
            other => Err(format!(
                "Unknown feedback policy '{}', expected 'passthrough' or 'inverted'",
                other
            )),
        }
    }
}
