// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Shared holding register table
//!
//! The store is the only resource shared between the scan loop and the Modbus
//! server. Each call locks the table once and releases it before returning, so
//! individual reads and writes are atomic but no transaction spans two calls.

use std::sync::{Arc, Mutex};

use log::debug;

use super::error::StoreAccessError;

/// Default number of holding registers, starting at address 0
pub const DEFAULT_REGISTER_COUNT: u16 = 1000;

/// Read/write contract of a word-addressable register table
///
/// Implementations must make every call atomic with respect to concurrent
/// callers. The scan loop performs no locking of its own.
pub trait RegisterStore: Send + Sync {
    /// Read `count` consecutive registers starting at `address`
    fn read(&self, address: u16, count: u16) -> Result<Vec<u16>, StoreAccessError>;

    /// Write `values` to consecutive registers starting at `address`
    fn write(&self, address: u16, values: &[u16]) -> Result<(), StoreAccessError>;
}

/// Sequential block of holding registers protected by a mutex
///
/// Cloning is cheap and every clone shares the same table, which is how the
/// scan loop and the Modbus server end up looking at the same registers.
#[derive(Debug, Clone)]
pub struct HoldingRegisterStore {
    registers: Arc<Mutex<Vec<u16>>>,
}

impl Default for HoldingRegisterStore {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTER_COUNT)
    }
}

impl HoldingRegisterStore {
    /// Create a zero-filled table of `register_count` registers
    pub fn new(register_count: u16) -> Self {
        Self {
            registers: Arc::new(Mutex::new(vec![0; register_count.into()])),
        }
    }

    /// Number of registers in the table
    pub fn register_count(&self) -> Result<u16, StoreAccessError> {
        let registers = self
            .registers
            .lock()
            .map_err(|_| StoreAccessError::StoreUnavailable)?;
        // The table is built from a u16 length and never resized
        Ok(registers.len() as u16)
    }

    fn checked_range(
        len: usize,
        address: u16,
        count: usize,
    ) -> Result<std::ops::Range<usize>, StoreAccessError> {
        let start = usize::from(address);
        let end = start + count;
        if count == 0 || end > len {
            return Err(StoreAccessError::AddressOutOfRange {
                address,
                count: u16::try_from(count).unwrap_or(u16::MAX),
            });
        }
        Ok(start..end)
    }
}

impl RegisterStore for HoldingRegisterStore {
    fn read(&self, address: u16, count: u16) -> Result<Vec<u16>, StoreAccessError> {
        let registers = self
            .registers
            .lock()
            .map_err(|_| StoreAccessError::StoreUnavailable)?;
        let range = Self::checked_range(registers.len(), address, count.into())?;
        debug!("Store read of {} registers from address {}", count, address);
        Ok(registers[range].to_vec())
    }

    fn write(&self, address: u16, values: &[u16]) -> Result<(), StoreAccessError> {
        let mut registers = self
            .registers
            .lock()
            .map_err(|_| StoreAccessError::StoreUnavailable)?;
        let range = Self::checked_range(registers.len(), address, values.len())?;
        registers[range].copy_from_slice(values);
        debug!(
            "Store write of {} registers from address {}",
            values.len(),
            address
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_zeroed() {
        let store = HoldingRegisterStore::new(16);
        assert_eq!(store.register_count().unwrap(), 16);
        assert_eq!(store.read(0, 16).unwrap(), vec![0; 16]);
    }

    #[test]
    fn test_clones_share_registers() {
        let store = HoldingRegisterStore::new(8);
        let other = store.clone();
        other.write(3, &[7, 8]).unwrap();
        assert_eq!(store.read(2, 4).unwrap(), vec![0, 7, 8, 0]);
    }

    #[test]
    fn test_out_of_range_access() {
        let store = HoldingRegisterStore::new(8);
        assert_eq!(
            store.read(7, 2),
            Err(StoreAccessError::AddressOutOfRange {
                address: 7,
                count: 2
            })
        );
        assert!(store.read(0, 0).is_err());
        assert!(store.write(8, &[1]).is_err());
        assert!(store.write(0, &[]).is_err());
    }

    #[test]
    fn test_failed_write_leaves_table_untouched() {
        let store = HoldingRegisterStore::new(4);
        assert!(store.write(2, &[1, 1, 1]).is_err());
        assert_eq!(store.read(0, 4).unwrap(), vec![0; 4]);
    }

    #[test]
    fn test_last_register_of_full_address_space() {
        let store = HoldingRegisterStore::new(u16::MAX);
        assert!(store.write(u16::MAX - 1, &[42]).is_ok());
        assert!(store.read(u16::MAX, 1).is_err());
    }
}
