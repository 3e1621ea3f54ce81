//! # Daemon Module
//!
//! The daemon module runs and manages the background services of the valve
//! simulator: the scan loop, the Modbus TCP server and a heartbeat.
//!
//! ## Components
//!
//! * **Launch Daemon**: Core implementation for starting, monitoring, and gracefully
//!   shutting down background tasks
//! * **Banner**: Startup summary of the endpoint and the register mapping
//!
//! ## Usage
//!
//! ```no_run
//! use rust_valve_simulator::{config::Config, daemon::launch_daemon::Daemon};
//!
//! async fn run() -> anyhow::Result<()> {
//!     let config = Config::from_file("config.yaml")?;
//!
//!     let mut daemon = Daemon::new();
//!     daemon.launch(&config).await?;
//!
//!     // Wait for shutdown signal (e.g., Ctrl+C)
//!     tokio::signal::ctrl_c().await?;
//!
//!     daemon.shutdown();
//!     daemon.join().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod banner;
pub mod launch_daemon;
