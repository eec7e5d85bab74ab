// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use tally_sync::connectivity::spawn_probe;
use tally_sync::{SyncSchedule, TcpProbe};
use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::error::Result;

pub async fn sync(app: &App) -> Result<()> {
    let coordinator = app.coordinator()?;
    match coordinator.sync().await {
        Some(report) => {
            println!("Sync complete: {}", report);
            if let Some(at) = coordinator.last_sync_time() {
                println!("Last sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
        None => println!("Sync skipped: remote unreachable"),
    }
    println!("Pending changes: {}", app.repo.pending_count()?);
    Ok(())
}

pub fn status(app: &App) -> Result<()> {
    let config = &app.config;
    println!("Config: {}", app.config_path.display());
    if !config.use_remote_repository {
        println!("Remote: disabled (local only)");
        return Ok(());
    }

    let url = config.base_url().unwrap_or_else(|| "(not configured)".to_string());
    println!("Remote: {} at {}", config.remote_source_type, url);
    match config.auto_sync_interval() {
        Some(every) => println!("Auto sync: every {} min", every.as_secs() / 60),
        None => println!("Auto sync: disabled"),
    }
    println!(
        "Sync on start: {}",
        if config.sync_on_app_start { "yes" } else { "no" }
    );
    println!("Pending changes: {}", app.repo.pending_count()?);
    Ok(())
}

/// Run the sync loop and a reachability probe until Ctrl-C.
pub async fn daemon(app: &App, probe_interval: Duration) -> Result<()> {
    let coordinator = app.coordinator()?;
    let shutdown = CancellationToken::new();
    let schedule = SyncSchedule {
        interval: app.config.auto_sync_interval(),
        sync_on_start: app.config.sync_on_app_start,
    };

    let probe = app
        .config
        .base_url()
        .as_deref()
        .and_then(TcpProbe::from_url)
        .map(|probe| {
            tracing::info!("probing {}:{} every {:?}", probe.host(), probe.port(), probe_interval);
            spawn_probe(
                Arc::new(probe),
                coordinator.connectivity().clone(),
                probe_interval,
                shutdown.clone(),
            )
        });
    let sync_loop = coordinator.spawn(schedule, shutdown.clone());
    tracing::info!("sync daemon started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    shutdown.cancel();

    if let Err(e) = sync_loop.await {
        tracing::warn!("sync loop ended abnormally: {}", e);
    }
    if let Some(probe) = probe {
        if let Err(e) = probe.await {
            tracing::warn!("probe ended abnormally: {}", e);
        }
    }
    Ok(())
}
