// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tests for the ValveModbusServer implementation
//!
//! These tests start a server instance over a shared register table and talk to
//! it with a Modbus client, the way a PLC would. Scan cycles are driven by hand
//! so the tests do not depend on timing.

use std::str::FromStr;
use std::time::Duration;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::time;
use tokio_modbus::{
    prelude::*,
    server::tcp::{accept_tcp_connection, Server},
};

use rust_valve_simulator::modbus::ValveModbusServer;
use rust_valve_simulator::process::{
    FeedbackPolicy, HoldingRegisterStore, InitialState, RegisterMap, ScanLoop, ScanSettings,
};

/// Test utility function to start a Modbus server in the background
async fn start_test_server(
    store: HoldingRegisterStore,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), Box<dyn std::error::Error>> {
    // Use port 0 to let the OS assign an available port
    let socket_addr = SocketAddr::from_str("127.0.0.1:0").unwrap();
    let listener = TcpListener::bind(socket_addr).await?;

    let socket_addr = listener.local_addr()?;
    println!("Test server started on: {}", socket_addr);

    let server = Server::new(listener);
    let on_connected = move |stream, socket_addr| {
        let store = store.clone();
        async move {
            accept_tcp_connection(stream, socket_addr, move |_peer| {
                Ok(Some(ValveModbusServer::new(store.clone())))
            })
        }
    };

    let on_process_error = |err| {
        eprintln!("Server error: {}", err);
    };

    let handle = tokio::spawn(async move {
        if let Err(e) = server.serve(&on_connected, on_process_error).await {
            eprintln!("Server error: {}", e);
        }
    });

    // Give the server a moment to start
    time::sleep(Duration::from_millis(100)).await;

    Ok((socket_addr, handle))
}

fn scan_loop(store: &HoldingRegisterStore, policy: FeedbackPolicy) -> ScanLoop<HoldingRegisterStore> {
    let settings = ScanSettings::new(
        Duration::from_millis(10),
        1,
        policy,
        InitialState::Closed,
    )
    .unwrap();
    ScanLoop::new(RegisterMap::default(), store.clone(), settings)
}

#[tokio::test]
async fn test_plc_open_command_is_reflected_in_status() -> Result<(), Box<dyn std::error::Error>> {
    let store = HoldingRegisterStore::default();
    let mut scan = scan_loop(&store, FeedbackPolicy::Passthrough);
    let (socket_addr, _server_handle) = start_test_server(store.clone()).await?;

    let mut ctx = tcp::connect(socket_addr).await?;

    // Initial closed state published before the first cycle
    scan.prime();
    assert_eq!(ctx.read_holding_registers(100, 2).await??, vec![0, 1]);

    ctx.write_single_register(200, 1).await??;
    scan.run_cycle();
    assert_eq!(ctx.read_holding_registers(100, 1).await??, vec![1]);

    ctx.write_single_register(200, 0).await??;
    scan.run_cycle();
    assert_eq!(ctx.read_holding_registers(100, 1).await??, vec![0]);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_inverted_policy_over_the_wire() -> Result<(), Box<dyn std::error::Error>> {
    let store = HoldingRegisterStore::default();
    let mut scan = scan_loop(&store, FeedbackPolicy::Inverted);
    let (socket_addr, _server_handle) = start_test_server(store.clone()).await?;

    let mut ctx = tcp::connect(socket_addr).await?;

    ctx.write_single_register(200, 1).await??;
    scan.run_cycle();
    assert_eq!(ctx.read_holding_registers(100, 2).await??, vec![1, 0]);

    ctx.write_single_register(200, 0).await??;
    scan.run_cycle();
    assert_eq!(ctx.read_holding_registers(100, 2).await??, vec![0, 1]);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_input_registers_mirror_holding_registers() -> Result<(), Box<dyn std::error::Error>>
{
    let store = HoldingRegisterStore::default();
    let (socket_addr, _server_handle) = start_test_server(store.clone()).await?;

    let mut ctx = tcp::connect(socket_addr).await?;
    ctx.write_multiple_registers(100, &[1, 0]).await??;

    let holding = ctx.read_holding_registers(100, 2).await??;
    let input = ctx.read_input_registers(100, 2).await??;
    assert_eq!(holding, input);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_read_write_multiple_registers() -> Result<(), Box<dyn std::error::Error>> {
    let store = HoldingRegisterStore::new(16);
    let (socket_addr, _server_handle) = start_test_server(store.clone()).await?;

    let mut ctx = tcp::connect(socket_addr).await?;
    let data = ctx
        .read_write_multiple_registers(0, 4, 2, &[7, 8])
        .await??;
    assert_eq!(data, vec![0, 0, 7, 8]);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_invalid_register_address() -> Result<(), Box<dyn std::error::Error>> {
    let store = HoldingRegisterStore::default();
    let (socket_addr, _server_handle) = start_test_server(store).await?;

    let mut ctx = tcp::connect(socket_addr).await?;

    // The default table ends at register 999
    let result = ctx.read_holding_registers(999, 2).await?;
    assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));

    let result = ctx.write_single_register(1000, 1).await?;
    assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_unsupported_function() -> Result<(), Box<dyn std::error::Error>> {
    let store = HoldingRegisterStore::default();
    let (socket_addr, _server_handle) = start_test_server(store).await?;

    let mut ctx = tcp::connect(socket_addr).await?;

    // Coils are not part of the register table
    let result = ctx.read_coils(0, 1).await?;
    assert_eq!(result, Err(ExceptionCode::IllegalFunction));

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_multiple_clients_share_registers() -> Result<(), Box<dyn std::error::Error>> {
    let store = HoldingRegisterStore::default();
    let (socket_addr, _server_handle) = start_test_server(store.clone()).await?;

    let mut plc = tcp::connect(socket_addr).await?;
    let mut hmi = tcp::connect(socket_addr).await?;

    plc.write_single_register(201, 1).await??;
    time::sleep(Duration::from_millis(100)).await;

    assert_eq!(hmi.read_holding_registers(201, 1).await??, vec![1]);
    assert_eq!(store.register_count()?, 1000);

    plc.disconnect().await?;
    hmi.disconnect().await?;
    Ok(())
}
