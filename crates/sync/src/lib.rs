// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-sync: Remote mirroring for the tally finance tracker
//!
//! Keeps the local store and a remote backend in step across unreliable
//! connectivity.
//!
//! # Features
//!
//! - One CRUD client over three backend dialects
//! - Durable queue of changes the remote has not confirmed
//! - Sync passes that drain the queue and reconcile both directions
//! - Local-first repository facade with fire-and-forget remote mirroring
//! - TOML configuration with environment overrides

pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod env;
pub mod error;
pub mod queue;
pub mod remote;
pub mod repository;

pub use config::{Config, Credentials};
pub use connectivity::{ConnectivityMonitor, ReachabilityProbe, TcpProbe, Transition};
pub use coordinator::{SyncCoordinator, SyncReport, SyncSchedule};
pub use error::{Error, Result};
pub use queue::PendingQueue;
pub use remote::{RemoteClient, RemoteFailure, RemoteSettings, RemoteSourceType, ReqwestTransport};
pub use repository::TransactionRepository;

#[cfg(test)]
mod test_helpers;
