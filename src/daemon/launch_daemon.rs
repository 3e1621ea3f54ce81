// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Daemon Management Module
//!
//! This module provides functionality for running and managing the background
//! tasks of the valve simulator:
//!
//! - The scan loop driving the simulated valve
//! - The Modbus TCP server exposing the register table to the PLC
//! - System health monitoring (heartbeat)
//!
//! The scan loop and the Modbus server have independent lifecycles. They only
//! share the holding register table and a shutdown signal.
//!
//! ## Usage
//!
//! ```no_run
//! use rust_valve_simulator::{config::Config, daemon::launch_daemon::Daemon};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let config = Config::from_file("config.yaml")?;
//!
//!     // Create and launch daemon with all enabled services
//!     let mut daemon = Daemon::new();
//!     daemon.launch(&config).await?;
//!
//!     // Later, trigger a graceful shutdown
//!     daemon.shutdown();
//!
//!     // Wait for all tasks to complete
//!     daemon.join().await?;
//!
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};

use super::banner;
use crate::config::Config;
use crate::modbus::ValveModbusServer;
use crate::process::{HoldingRegisterStore, RegisterMap, ScanLoop, ScanSettings};

/// Represents a daemon task manager that coordinates the simulator services
///
/// # Fields
///
/// * `tasks` - Collection of handles to running tasks for management and cleanup
/// * `running` - Atomic flag shared between tasks, `false` once shutdown was requested
/// * `shutdown_tx` - Watch channel waking every task as soon as shutdown is requested
///
/// # Thread Safety
///
/// The scan loop and the Modbus server never call each other. They share the
/// [`HoldingRegisterStore`], whose operations are individually atomic.
pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    store: Option<HoldingRegisterStore>,
    modbus_addr: Option<SocketAddr>,
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl Daemon {
    /// Create a new daemon instance
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_valve_simulator::daemon::launch_daemon::Daemon;
    ///
    /// let daemon = Daemon::new();
    /// assert!(daemon.is_running());
    /// ```
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            shutdown_tx,
            store: None,
            modbus_addr: None,
        }
    }

    /// Launch all configured tasks based on configuration
    ///
    /// The register map and the scan settings are validated first; an invalid
    /// configuration is reported here and no task is started.
    ///
    /// # Errors
    ///
    /// * The register map overlaps, has empty slots or does not fit the table
    /// * The scan period or the report cadence is zero
    /// * The Modbus server fails to bind to the specified address/port
    pub async fn launch(&mut self, config: &Config) -> Result<()> {
        let map = RegisterMap::from_config(&config.register_map)
            .context("Invalid register map configuration")?;
        map.validate_against_store(config.modbus.register_count)
            .context("Invalid register map configuration")?;
        let settings = ScanSettings::from_config(&config.simulation)
            .context("Invalid simulation configuration")?;

        let store = HoldingRegisterStore::new(config.modbus.register_count);
        self.store = Some(store.clone());

        banner::log_banner(config, &map);

        if config.modbus.enabled {
            self.start_modbus_server(config, store.clone()).await?;
        } else {
            warn!("Modbus server disabled, registers are only reachable in-process");
        }

        self.start_scan_loop(map, store, settings);
        self.start_heartbeat();

        Ok(())
    }

    /// Spawn the scan loop task
    fn start_scan_loop(
        &mut self,
        map: RegisterMap,
        store: HoldingRegisterStore,
        settings: ScanSettings,
    ) {
        let scan = ScanLoop::new(map, store, settings);
        let shutdown = self.shutdown_tx.subscribe();

        let task = tokio::spawn(async move {
            let stats = scan.run(shutdown).await;
            debug!("Scan loop task finished: {:?}", stats);
            Ok(())
        });

        self.tasks.push(task);
    }

    /// Start a heartbeat monitoring task
    ///
    /// Periodically logs a debug message so an operator can tell the daemon is
    /// alive even when the cycle report cadence is slow.
    fn start_heartbeat(&mut self) {
        info!("Starting heartbeat monitor");

        let running = self.running.clone();
        let mut shutdown = self.shutdown_tx.subscribe();
        let task = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                debug!("Daemon heartbeat: running");
                tokio::select! {
                    _ = time::sleep(Duration::from_secs(60)) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            Ok(())
        });

        self.tasks.push(task);
    }

    /// Launch the Modbus server
    ///
    /// The listener is bound before this method returns so that binding errors
    /// are reported at startup. Connections are then served in a background
    /// task until shutdown, each one with its own [`ValveModbusServer`] over
    /// the shared register table.
    async fn start_modbus_server(
        &mut self,
        config: &Config,
        store: HoldingRegisterStore,
    ) -> Result<()> {
        let socket_addr: SocketAddr = format!("{}:{}", config.modbus.address, config.modbus.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid Modbus socket address {}:{}",
                    config.modbus.address, config.modbus.port
                )
            })?;

        let listener = TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("Failed to bind Modbus server on {}", socket_addr))?;
        let local_addr = listener.local_addr()?;
        self.modbus_addr = Some(local_addr);
        info!("Starting modbus server on {}", local_addr);

        let mut shutdown = self.shutdown_tx.subscribe();
        let server = Server::new(listener);

        let task = tokio::spawn(async move {
            let on_connected = move |stream, socket_addr| {
                let store = store.clone();
                async move {
                    accept_tcp_connection(stream, socket_addr, move |peer: SocketAddr| {
                        info!("Modbus client connected from {}", peer);
                        Ok(Some(ValveModbusServer::new(store.clone())))
                    })
                }
            };

            let on_process_error = |err| {
                error!("Modbus server error: {err}");
            };

            let server_handle = tokio::spawn(async move {
                if let Err(e) = server.serve(&on_connected, on_process_error).await {
                    error!("Modbus server error: {}", e);
                }
            });

            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }

            info!("Shutting down Modbus server...");
            server_handle.abort();

            match time::timeout(Duration::from_secs(5), server_handle).await {
                Ok(_) => info!("Modbus server shut down successfully"),
                Err(_) => warn!("Modbus server shutdown timed out, forcing termination"),
            }

            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Address the Modbus server is actually listening on
    ///
    /// Useful when the configured port is 0 and the OS picked one.
    pub fn modbus_local_addr(&self) -> Option<SocketAddr> {
        self.modbus_addr
    }

    /// Handle on the shared register table, once launched
    pub fn store(&self) -> Option<HoldingRegisterStore> {
        self.store.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop all running tasks gracefully
    ///
    /// Clears the `running` flag and wakes every task through the shutdown
    /// channel, so the scan loop does not wait for the end of its period.
    /// To wait for all tasks to finish, call `join()` after this method.
    pub fn shutdown(&self) {
        info!("Shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
        self.shutdown_tx.send_replace(true);
    }

    /// Wait for all tasks to complete
    ///
    /// Consumes the daemon and waits for all spawned tasks to finish execution.
    /// A task that panicked or returned an error is logged but does not make
    /// this method fail.
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            match time::timeout(Duration::from_secs(5), task).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => error!("Task failed: {:#}", e),
                Ok(Err(e)) => error!("Task panicked: {}", e),
                Err(_) => warn!("Task did not complete within timeout period, may be hung"),
            }
        }
        Ok(())
    }
}
