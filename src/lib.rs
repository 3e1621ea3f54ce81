// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust valve simulator library
//!
//! Plant-side emulation of a motorized valve (MV101) and its open/closed
//! position feedback, exposed to a PLC through Modbus TCP holding registers.

pub mod config;
pub mod daemon;
pub mod modbus;
pub mod process;
