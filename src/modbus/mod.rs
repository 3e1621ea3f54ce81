// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus communication module
//!
//! This module provides the Modbus TCP service that exposes the simulated
//! valve's holding registers to a PLC.
//!
//! ## Key Components
//!
//! - `ValveModbusServer`: the `tokio-modbus` service answering register
//!   requests from the shared [`HoldingRegisterStore`](crate::process::HoldingRegisterStore).
//!
//! ## Register Map
//!
//! ### Holding Registers (default layout)
//!
//! - Register 100: MV101 open status (read by the PLC)
//! - Register 101: MV101 closed status (read by the PLC)
//! - Register 200: MV101 open command (written by the PLC)
//! - Register 201: MV101 close command (written by the PLC)

pub mod modbus_server;
pub use modbus_server::ValveModbusServer;
