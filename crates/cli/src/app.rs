// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit wiring of the store, queue, remote client, and coordinator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tally_core::{LocalStore, SqliteStore};
use tally_sync::remote::RemoteFailure;
use tally_sync::{
    Config, ConnectivityMonitor, PendingQueue, ReachabilityProbe, RemoteClient, ReqwestTransport,
    SyncCoordinator, TcpProbe, TransactionRepository,
};

use crate::error::{Error, Result};
use crate::paths;

/// Whether to check the remote's reachability while opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// Probe the remote host once; writes are pushed directly if it answers.
    Probe,
    /// Assume offline; writes are queued. Used by read-only commands.
    AssumeOffline,
}

/// Everything a command needs, opened once per invocation.
pub struct App {
    pub config: Config,
    pub config_path: PathBuf,
    pub repo: TransactionRepository,
}

impl App {
    pub async fn open(
        config_flag: Option<&Path>,
        data_flag: Option<&Path>,
        reachability: Reachability,
    ) -> Result<Self> {
        let config_path = paths::config_path(config_flag);
        let config = Config::load_with_env(&config_path)?;

        let data_dir = paths::data_dir(data_flag);
        std::fs::create_dir_all(&data_dir)?;
        let db_path = paths::db_path(&data_dir);
        tracing::debug!("database at {}", db_path.display());
        let store: Arc<dyn LocalStore> = Arc::new(SqliteStore::open(&db_path)?);

        if !config.use_remote_repository {
            return Ok(App {
                config,
                config_path,
                repo: TransactionRepository::local_only(store),
            });
        }

        let settings = config.remote_settings();
        if settings.base_url.is_none() {
            tracing::warn!("remote sync enabled but no api_base_url configured; changes will queue");
        }
        let transport = ReqwestTransport::new()
            .map_err(|e| tally_sync::Error::from(RemoteFailure::from(e)))?;
        let remote = RemoteClient::new(&settings, Arc::new(transport));
        let queue = Arc::new(PendingQueue::open(&db_path)?);
        let online = match reachability {
            Reachability::Probe => probe_once(settings.base_url.as_deref()).await,
            Reachability::AssumeOffline => false,
        };
        let coordinator = Arc::new(SyncCoordinator::new(
            store,
            remote,
            queue,
            ConnectivityMonitor::new(online),
        ));

        Ok(App {
            config,
            config_path,
            repo: TransactionRepository::with_sync(coordinator),
        })
    }

    /// The coordinator, or an error naming the config file if sync is off.
    pub fn coordinator(&self) -> Result<&Arc<SyncCoordinator>> {
        self.repo
            .coordinator()
            .ok_or_else(|| Error::RemoteDisabled(self.config_path.display().to_string()))
    }

    /// Let in-flight remote mirrors finish before the process exits.
    pub async fn close(&self) {
        self.repo.shutdown().await;
    }
}

/// A remote with no usable URL counts as online so its calls fail and queue.
async fn probe_once(base_url: Option<&str>) -> bool {
    match base_url.and_then(TcpProbe::from_url) {
        Some(probe) => probe.check().await,
        None => true,
    }
}
