// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

mod config;
mod listener;
mod station_task;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use stationd_app::{init_logging, normalize_name, parse_address};
use stationd_backend::{register_builtin_backends_on, BusAccess, RegistrationContext};
use stationd_core::{DynResult, StationRequest, StationSnapshot};

use config::{validate_address, ServerConfig};

const PKG_DESCRIPTION: &str = concat!(
    env!("CARGO_PKG_NAME"),
    " - ground station RF switching daemon"
);
const STATION_TASK_CHANNEL_BUFFER: usize = 32;

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print example configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Register bus backend (mcp23017, sim)
    #[arg(short = 'b', long = "backend")]
    backend: Option<String>,
    /// i2c-dev device of the GPIO expander
    #[arg(short = 'd', long = "device")]
    device: Option<String>,
    /// Expander address, decimal or 0x-prefixed hex
    #[arg(long = "address", value_parser = parse_address)]
    address: Option<u16>,
    /// IP address for the token listener
    #[arg(short = 'l', long = "listen")]
    listen: Option<IpAddr>,
    /// Port for the token listener
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
}

/// Bus selection after merging config file and CLI arguments.
#[derive(Debug)]
struct ResolvedBus {
    backend: String,
    access: BusAccess,
}

fn resolve_bus(
    cli: &Cli,
    cfg: &ServerConfig,
    registry: &RegistrationContext,
) -> DynResult<ResolvedBus> {
    let backend = normalize_name(cli.backend.as_deref().unwrap_or(cfg.bus.backend.as_str()));
    if !registry.is_backend_registered(&backend) {
        return Err(format!(
            "Unknown bus backend: {} (available: {})",
            backend,
            registry.registered_backends().join(", ")
        )
        .into());
    }

    let access = match backend.as_str() {
        "sim" => BusAccess::None,
        _ => {
            let address = cli.address.unwrap_or(cfg.bus.address);
            validate_address(address).map_err(|e| format!("Invalid bus address {}", e))?;
            BusAccess::I2c {
                device: cli.device.clone().unwrap_or_else(|| cfg.bus.device.clone()),
                address,
            }
        }
    };

    Ok(ResolvedBus { backend, access })
}

#[tokio::main]
async fn main() -> DynResult<()> {
    let mut registry = RegistrationContext::new();
    register_builtin_backends_on(&mut registry);

    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", ServerConfig::example_toml());
        return Ok(());
    }

    let (cfg, config_path) = if let Some(ref path) = cli.config {
        let cfg = ServerConfig::load_from_file(path)?;
        (cfg, Some(path.clone()))
    } else {
        ServerConfig::load_from_default_paths()?
    };
    cfg.validate()
        .map_err(|e| format!("Invalid server configuration: {}", e))?;

    init_logging(cfg.general.log_level.as_deref());

    if let Some(ref path) = config_path {
        info!("Loaded configuration from {}", path.display());
    }

    let resolved = resolve_bus(&cli, &cfg, &registry)?;
    info!("Starting stationd (backend: {})", resolved.backend);

    // A bus that cannot be opened is fatal before anything is spawned.
    let machine = station_task::build_machine(station_task::StationTaskConfig {
        registry: Arc::new(registry),
        backend: resolved.backend,
        access: resolved.access,
        timing: cfg.timing.to_timing(),
    })?;

    let (tx, rx) = mpsc::channel::<StationRequest>(STATION_TASK_CHANNEL_BUFFER);
    let mut task_handles: Vec<JoinHandle<()>> = Vec::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (snapshot_tx, snapshot_rx) = watch::channel(StationSnapshot::initial());

    let station_shutdown_rx = shutdown_rx.clone();
    task_handles.push(tokio::spawn(async move {
        if let Err(e) =
            station_task::run_station_task(machine, rx, snapshot_tx, station_shutdown_rx).await
        {
            error!("Station task error: {:?}", e);
        }
    }));

    if cfg.listen.enabled {
        let listen_ip = cli.listen.unwrap_or(cfg.listen.listen);
        let listen_port = cli.port.unwrap_or(cfg.listen.port);
        let listen_addr = SocketAddr::from((listen_ip, listen_port));
        let station_tx = tx.clone();
        let listener_snapshot_rx = snapshot_rx.clone();
        let listener_shutdown_rx = shutdown_rx.clone();
        task_handles.push(tokio::spawn(async move {
            if let Err(e) = listener::run_listener(
                listen_addr,
                station_tx,
                listener_snapshot_rx,
                listener_shutdown_rx,
            )
            .await
            {
                error!("Listener error: {:?}", e);
            }
        }));
    } else {
        info!("Token listener disabled");
    }

    signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down");
    let _ = shutdown_tx.send(true);
    drop(tx);
    tokio::time::sleep(Duration::from_millis(400)).await;

    for handle in &task_handles {
        if !handle.is_finished() {
            handle.abort();
        }
    }
    for handle in task_handles {
        let _ = handle.await;
    }
    Ok(())
}
