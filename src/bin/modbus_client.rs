// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-valve-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::{Context, Result};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use tokio_modbus::prelude::*;

use rust_valve_simulator::config::Config;
use rust_valve_simulator::process::{RegisterMap, Signal};

/// PLC-side Modbus client driving the simulated MV101 valve
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Modbus server address
    #[clap(long, default_value = "127.0.0.1")]
    address: String,

    /// Modbus server port
    #[clap(long, default_value = "502")]
    port: u16,

    /// Read the register map from this configuration file instead of the defaults
    #[clap(long)]
    config: Option<PathBuf>,

    /// Value to write to the open command register (0 or 1)
    #[clap(long)]
    open: Option<u16>,

    /// Value to write to the close command register (0 or 1)
    #[clap(long)]
    close: Option<u16>,

    /// Time to wait after writing, so the simulator can run a scan cycle
    #[clap(long, default_value = "1500")]
    settle_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();

    let map = match &args.config {
        Some(path) => RegisterMap::from_config(&Config::from_file(path)?.register_map)?,
        None => RegisterMap::default(),
    };

    let socket_addr: SocketAddr = format!("{}:{}", args.address, args.port)
        .parse()
        .context("Invalid socket address")?;
    println!("Connecting to Modbus server at {}", socket_addr);

    let mut ctx = tcp::connect(socket_addr).await?;

    let writes = [(Signal::OpenCommand, args.open), (Signal::CloseCommand, args.close)];
    let mut wrote = false;
    for (signal, value) in writes {
        if let Some(value) = value {
            let slot = map.address_of(signal);
            println!("Writing {} to {} (R{})", value, signal, slot.address);
            ctx.write_single_register(slot.address, value).await??;
            wrote = true;
        }
    }

    if wrote {
        tokio::time::sleep(Duration::from_millis(args.settle_ms)).await;
    }

    for signal in Signal::ALL {
        let slot = map.address_of(signal);
        let values = ctx.read_holding_registers(slot.address, slot.width).await??;
        println!("{:>12} (R{}) = {:?}", signal.name(), slot.address, values);
    }

    ctx.disconnect().await?;
    Ok(())
}
