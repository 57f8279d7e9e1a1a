#![cfg(feature = "daemon")]

mod server;

use async_std::channel::{self, Sender};
use async_std::prelude::*;
use clap::Parser;
use dispmodes::config::{DEFAULT_CONFIG_FILE, Settings, config_dir};
use dispmodes::display::dbus::MutterDisplayConfig;
use dispmodes::store::{SlotStore, StoreEvent};
use dispmodes::utils::tracing::setup_tracing;
use dispmodes::LayoutService;
use server::commands::init_commands;
use server::server::DaemonServer;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_async_std::Signals;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Display layout daemon
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Forwards the first SIGINT/SIGTERM as a shutdown request
async fn handle_signals(mut signals: Signals, shutdown_tx: Sender<()>) {
    if let Some(signal) = signals.next().await {
        info!("Received signal {}, shutting down", signal);
        let _ = shutdown_tx.send(()).await;
    }
}

#[async_std::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(|| config_dir().join(DEFAULT_CONFIG_FILE));
    let settings = Settings::load(&config_path)?;

    setup_tracing(&settings.log_path);
    info!("Using store {}", settings.store_path.display());

    let store = Arc::new(SlotStore::new(settings.store_path.clone()));
    let events = store.subscribe();
    async_std::task::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                StoreEvent::LayoutsChanged => info!("Saved layouts changed"),
                StoreEvent::UsageChanged => debug!("Layout usage counters changed"),
            }
        }
    });

    let display_config = MutterDisplayConfig::connect().await?;
    let socket_path = settings.socket_path.clone();
    let service = LayoutService::new(display_config, store, settings);

    let (shutdown_tx, shutdown_rx) = channel::bounded(1);
    let signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();
    let signal_task = async_std::task::spawn(handle_signals(signals, shutdown_tx));

    let mut daemon_server = DaemonServer::bind(&socket_path, init_commands()).await?;
    daemon_server.run(&service, shutdown_rx).await?;
    daemon_server.shutdown().await?;

    handle.close();
    signal_task.await;

    // Acknowledged renames still inside their window must reach the store
    service.close().await;
    info!("Daemon stopped");
    Ok(())
}
