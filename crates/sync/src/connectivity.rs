// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability.
//!
//! [`ConnectivityMonitor`] holds the current online flag and tells
//! subscribers when it flips. Something outside has to feed it: the CLI
//! daemon runs a [`TcpProbe`] through [`spawn_probe`], tests call
//! [`ConnectivityMonitor::set_online`] directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A change of reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

impl Transition {
    /// The transition from `prev` to `now`, if the state changed.
    pub fn between(prev: bool, now: bool) -> Option<Transition> {
        match (prev, now) {
            (false, true) => Some(Transition::CameOnline),
            (true, false) => Some(Transition::WentOffline),
            _ => None,
        }
    }
}

/// Observable online/offline state. Clones share the same state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    state: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (state, _) = watch::channel(online);
        ConnectivityMonitor {
            state: Arc::new(state),
        }
    }

    /// Record the current reachability.
    ///
    /// Subscribers are only woken when the value actually changes.
    pub fn set_online(&self, online: bool) -> Option<Transition> {
        let mut transition = None;
        self.state.send_if_modified(|current| {
            transition = Transition::between(*current, online);
            *current = online;
            transition.is_some()
        });
        match transition {
            Some(Transition::CameOnline) => tracing::info!("network is reachable"),
            Some(Transition::WentOffline) => tracing::info!("network is unreachable"),
            None => {}
        }
        transition
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        ConnectivityMonitor::new(true)
    }
}

/// A check of whether the remote is currently reachable.
pub trait ReachabilityProbe: Send + Sync {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// Probe that opens a TCP connection to the remote host.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

/// Connect timeout used by [`TcpProbe::from_url`].
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        TcpProbe {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Build a probe for the host and port of a base URL.
    ///
    /// Returns `None` if the URL has no host or no known port.
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = reqwest::Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_string();
        let port = parsed.port_or_known_default()?;
        Some(TcpProbe::new(host, port, DEFAULT_PROBE_TIMEOUT))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl ReachabilityProbe for TcpProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            let connect = TcpStream::connect((self.host.as_str(), self.port));
            match tokio::time::timeout(self.timeout, connect).await {
                Ok(Ok(_)) => true,
                Ok(Err(e)) => {
                    tracing::debug!("probe {}:{} failed: {}", self.host, self.port, e);
                    false
                }
                Err(_) => {
                    tracing::debug!("probe {}:{} timed out", self.host, self.port);
                    false
                }
            }
        })
    }
}

/// Poll `probe` every `every` and feed the result to `monitor` until
/// `shutdown` is cancelled. The first check runs immediately.
pub fn spawn_probe(
    probe: Arc<dyn ReachabilityProbe>,
    monitor: ConnectivityMonitor,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let online = probe.check().await;
                    monitor.set_online(online);
                }
            }
        }
        tracing::debug!("connectivity probe stopped");
    })
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
