// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Full simulator lifecycle: launch, drive it over Modbus TCP, shut down

use std::time::Duration;

use anyhow::Result;
use tokio::time;
use tokio_modbus::prelude::*;

use rust_valve_simulator::config::Config;
use rust_valve_simulator::daemon::launch_daemon::Daemon;
use rust_valve_simulator::process::{FeedbackPolicy, RegisterSlot, RegisterStore};

fn test_config() -> Config {
    let mut config = Config::default();
    config.modbus.address = "127.0.0.1".to_string();
    // Let the OS pick a free port
    config.modbus.port = 0;
    config.simulation.cycle_period_ms = 20;
    config.simulation.report_every = 1;
    config
}

#[tokio::test]
async fn test_daemon_end_to_end() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut daemon = Daemon::new();
    daemon.launch(&test_config()).await?;
    let addr = daemon
        .modbus_local_addr()
        .expect("Modbus server should be listening");

    let mut ctx = tcp::connect(addr).await?;

    // No command yet, so passthrough reports neither end position
    time::sleep(Duration::from_millis(50)).await;
    assert_eq!(ctx.read_holding_registers(100, 2).await??, vec![0, 0]);

    ctx.write_single_register(200, 1).await??;
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ctx.read_holding_registers(100, 2).await??, vec![1, 0]);

    ctx.write_single_register(200, 0).await??;
    ctx.write_single_register(201, 1).await??;
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ctx.read_holding_registers(100, 2).await??, vec![0, 1]);

    ctx.disconnect().await?;

    daemon.shutdown();
    assert!(!daemon.is_running());
    time::timeout(Duration::from_secs(2), daemon.join()).await??;

    Ok(())
}

#[tokio::test]
async fn test_daemon_without_modbus_server() -> Result<()> {
    let mut config = test_config();
    config.modbus.enabled = false;
    config.simulation.feedback_policy = FeedbackPolicy::Inverted;

    let mut daemon = Daemon::new();
    daemon.launch(&config).await?;
    assert!(daemon.modbus_local_addr().is_none());

    let store = daemon.store().expect("store is created at launch");
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.read(100, 2)?, vec![0, 1]);

    store.write(200, &[1])?;
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.read(100, 2)?, vec![1, 0]);

    daemon.shutdown();
    daemon.join().await?;
    Ok(())
}

#[tokio::test]
async fn test_daemon_rejects_invalid_register_map() {
    let mut config = test_config();
    config.register_map.open_status = RegisterSlot::new(201, 1);

    let mut daemon = Daemon::new();
    let err = daemon.launch(&config).await.unwrap_err();
    assert!(format!("{:#}", err).contains("overlap"));
    assert!(daemon.store().is_none());
}

#[tokio::test]
async fn test_daemon_rejects_zero_period() {
    let mut config = test_config();
    config.simulation.cycle_period_ms = 0;

    let mut daemon = Daemon::new();
    assert!(daemon.launch(&config).await.is_err());
}

#[tokio::test]
async fn test_daemon_reports_bind_failure() -> Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let taken = listener.local_addr()?;

    let mut config = test_config();
    config.modbus.port = taken.port();

    let mut daemon = Daemon::new();
    assert!(daemon.launch(&config).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_shutdown_is_prompt_with_long_period() -> Result<()> {
    let mut config = test_config();
    config.simulation.cycle_period_ms = 3_600_000;

    let mut daemon = Daemon::new();
    daemon.launch(&config).await?;
    time::sleep(Duration::from_millis(50)).await;

    daemon.shutdown();
    time::timeout(Duration::from_secs(1), daemon.join()).await??;
    Ok(())
}
