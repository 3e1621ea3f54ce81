// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Authoritative view of the simulated valve at a given scan tick

use serde::{Deserialize, Serialize};

use super::register_map::Signal;

/// Command values as last read from the PLC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandValues {
    pub open: bool,
    pub close: bool,
}

/// Status values as computed by the feedback transform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusValues {
    pub open: bool,
    pub closed: bool,
}

impl StatusValues {
    /// Short label for diagnostics
    pub fn label(&self) -> &'static str {
        match (self.open, self.closed) {
            (true, false) => "OPEN",
            (false, true) => "CLOSED",
            (true, true) => "BOTH",
            (false, false) => "TRAVEL",
        }
    }
}

/// Valve position assumed at process start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialState {
    #[default]
    Closed,
    Open,
    Unknown,
}

/// Process state owned by the scan loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessState {
    pub open_command: bool,
    pub close_command: bool,
    pub open_status: bool,
    pub closed_status: bool,
}

impl ProcessState {
    pub fn initial(initial: InitialState) -> Self {
        match initial {
            InitialState::Closed => Self {
                closed_status: true,
                ..Self::default()
            },
            InitialState::Open => Self {
                open_status: true,
                ..Self::default()
            },
            InitialState::Unknown => Self::default(),
        }
    }

    pub fn commands(&self) -> CommandValues {
        CommandValues {
            open: self.open_command,
            close: self.close_command,
        }
    }

    pub fn statuses(&self) -> StatusValues {
        StatusValues {
            open: self.open_status,
            closed: self.closed_status,
        }
    }

    pub(crate) fn set_statuses(&mut self, statuses: StatusValues) {
        self.open_status = statuses.open;
        self.closed_status = statuses.closed;
    }

    /// Current value of any signal
    pub fn value_of(&self, signal: Signal) -> bool {
        match signal {
            Signal::OpenCommand => self.open_command,
            Signal::CloseCommand => self.close_command,
            Signal::OpenStatus => self.open_status,
            Signal::ClosedStatus => self.closed_status,
        }
    }

    /// Record a command read from the store; status signals are ignored
    pub(crate) fn set_command(&mut self, signal: Signal, value: bool) {
        match signal {
            Signal::OpenCommand => self.open_command = value,
            Signal::CloseCommand => self.close_command = value,
            Signal::OpenStatus | Signal::ClosedStatus => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_closed() {
        let state = ProcessState::initial(InitialState::Closed);
        assert!(state.closed_status);
        assert!(!state.open_status);
        assert_eq!(state.commands(), CommandValues::default());
        assert_eq!(state.statuses().label(), "CLOSED");
    }

    #[test]
    fn test_initial_open_and_unknown() {
        assert_eq!(
            ProcessState::initial(InitialState::Open).statuses().label(),
            "OPEN"
        );
        assert_eq!(
            ProcessState::initial(InitialState::Unknown),
            ProcessState::default()
        );
    }
}
