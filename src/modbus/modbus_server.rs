// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus server implementation for the valve simulator
//!
//! For avoiding confusion with the Modbus master/slave terminology, this module uses
//! the terms "server" and "client" instead. The server is the device that provides data,
//! while the client is the device that requests data.
//!
//! The Modbus master is the device that requests data, while the Modbus slave is the device
//! that provides data. In other words, the Modbus master is here the PLC and the
//! Modbus slave is here the simulated valve.
//!
//! ## Supported function codes
//!
//! | Code | Function | Behavior |
//! |------|----------|----------|
//! | 0x03 | Read Holding Registers | reads the shared table |
//! | 0x04 | Read Input Registers | mirrors the holding registers |
//! | 0x06 | Write Single Register | writes the shared table |
//! | 0x10 | Write Multiple Registers | writes the shared table |
//! | 0x17 | Read/Write Multiple Registers | write then read, as per the Modbus specification |
//!
//! Any other function code is answered with `IllegalFunction`.

use std::future;

use log::{debug, error};

use tokio_modbus::prelude::*;

use crate::process::{HoldingRegisterStore, RegisterStore, StoreAccessError};

/// A Modbus TCP service exposing the shared holding register table.
///
/// One instance is created per client connection. Every instance wraps a clone
/// of the same [`HoldingRegisterStore`], so all connections and the scan loop
/// see the same registers.
pub struct ValveModbusServer {
    /// Holding registers shared with the scan loop
    store: HoldingRegisterStore,
}

impl tokio_modbus::server::Service for ValveModbusServer {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    /// Process a Modbus request and provide a response
    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("Received Modbus request: {:?}", req);

        let res = match req {
            Request::ReadHoldingRegisters(addr, cnt) => {
                debug!(
                    "Reading {} holding registers starting from address {}",
                    cnt, addr
                );
                self.read(addr, cnt).map(Response::ReadHoldingRegisters)
            }
            Request::ReadInputRegisters(addr, cnt) => {
                debug!(
                    "Reading {} input registers starting from address {}",
                    cnt, addr
                );
                self.read(addr, cnt).map(Response::ReadInputRegisters)
            }
            Request::WriteSingleRegister(addr, value) => {
                debug!("Writing value {} to holding register {}", value, addr);
                self.write(addr, std::slice::from_ref(&value))
                    .map(|_| Response::WriteSingleRegister(addr, value))
            }
            Request::WriteMultipleRegisters(addr, values) => {
                debug!(
                    "Writing {} values to holding registers starting from address {}",
                    values.len(),
                    addr
                );
                self.write(addr, &values)
                    .map(|_| Response::WriteMultipleRegisters(addr, values.len() as u16))
            }
            Request::ReadWriteMultipleRegisters(read_addr, read_cnt, write_addr, values) => {
                debug!(
                    "Writing {} values at {} then reading {} registers at {}",
                    values.len(),
                    write_addr,
                    read_cnt,
                    read_addr
                );
                self.write(write_addr, &values)
                    .and_then(|_| self.read(read_addr, read_cnt))
                    .map(Response::ReadWriteMultipleRegisters)
            }
            _ => {
                error!(
                    "Exception::IllegalFunction - Unimplemented function code in request: {req:?}"
                );
                Err(ExceptionCode::IllegalFunction)
            }
        };

        if let Err(e) = &res {
            error!("Modbus request error: {:?}", e);
        }

        future::ready(res)
    }
}

impl ValveModbusServer {
    /// Create a service over a shared register table
    pub fn new(store: HoldingRegisterStore) -> Self {
        Self { store }
    }

    fn read(&self, addr: u16, cnt: u16) -> Result<Vec<u16>, ExceptionCode> {
        self.store.read(addr, cnt).map_err(exception_for)
    }

    fn write(&self, addr: u16, values: &[u16]) -> Result<(), ExceptionCode> {
        self.store.write(addr, values).map_err(exception_for)
    }
}

/// Map a store failure to the Modbus exception returned to the client
pub fn exception_for(err: StoreAccessError) -> ExceptionCode {
    match err {
        StoreAccessError::AddressOutOfRange { address, count } => {
            error!(
                "Exception::IllegalDataAddress - Registers {}..{} not available",
                address,
                u32::from(address) + u32::from(count)
            );
            ExceptionCode::IllegalDataAddress
        }
        StoreAccessError::StoreUnavailable => {
            error!("Exception::ServerDeviceFailure - Register store unavailable");
            ExceptionCode::ServerDeviceFailure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_modbus::server::Service;

    #[tokio::test]
    async fn test_service_round_trip() {
        let store = HoldingRegisterStore::new(16);
        let service = ValveModbusServer::new(store.clone());

        let res = service.call(Request::WriteSingleRegister(3, 1)).await;
        assert_eq!(res, Ok(Response::WriteSingleRegister(3, 1)));
        assert_eq!(store.read(3, 1).unwrap(), vec![1]);

        let res = service.call(Request::ReadHoldingRegisters(2, 3)).await;
        assert_eq!(res, Ok(Response::ReadHoldingRegisters(vec![0, 1, 0])));
    }

    #[tokio::test]
    async fn test_out_of_range_is_illegal_data_address() {
        let service = ValveModbusServer::new(HoldingRegisterStore::new(4));
        let res = service.call(Request::ReadHoldingRegisters(3, 2)).await;
        assert_eq!(res, Err(ExceptionCode::IllegalDataAddress));
    }

    #[tokio::test]
    async fn test_coils_are_not_supported() {
        let service = ValveModbusServer::new(HoldingRegisterStore::new(4));
        let res = service.call(Request::ReadCoils(0, 1)).await;
        assert_eq!(res, Err(ExceptionCode::IllegalFunction));
    }
}
