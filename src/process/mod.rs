// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Process model
//!
//! The plant side of the control loop: a single motorized valve (MV101) whose
//! command and position feedback registers are exchanged with a PLC through a
//! shared holding register table.
//!
//! ## Components
//!
//! - [`RegisterMap`]: the only source of register addresses
//! - [`RegisterStore`] / [`HoldingRegisterStore`]: the shared register table
//! - [`FeedbackPolicy`]: status bits as a pure function of command bits
//! - [`ScanLoop`]: the periodic read → compute → write → report cycle
//!
//! ## Usage
//!
//! ```no_run
//! use rust_valve_simulator::process::{HoldingRegisterStore, RegisterMap, ScanLoop, ScanSettings};
//!
//! let store = HoldingRegisterStore::default();
//! let mut scan = ScanLoop::new(RegisterMap::default(), store.clone(), ScanSettings::default());
//! scan.run_cycle();
//! ```

pub mod error;
pub mod feedback;
pub mod register_map;
pub mod register_store;
pub mod scan_loop;
pub mod state;

pub use error::{ConfigError, StoreAccessError};
pub use feedback::FeedbackPolicy;
pub use register_map::{Direction, RegisterMap, RegisterSlot, Signal};
pub use register_store::{HoldingRegisterStore, RegisterStore, DEFAULT_REGISTER_COUNT};
pub use scan_loop::{CycleOutcome, CycleReport, ScanLoop, ScanPhase, ScanSettings, ScanStats};
pub use state::{CommandValues, InitialState, ProcessState, StatusValues};
