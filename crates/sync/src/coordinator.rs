// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync pass orchestration.
//!
//! A [`SyncCoordinator`] owns the sync state and the pending queue. One pass
//! runs, in order:
//!
//! 1. **Drain**: replay queued changes FIFO; remove each one the remote
//!    confirms, keep the rest for the next pass.
//! 2. **Pull**: fetch the remote and local transaction sets.
//! 3. **Remote→local**: insert missing records, overwrite differing ones.
//!    Remote wins on any difference.
//! 4. **Local→remote**: push records the remote lacks; queue failures.
//! 5. Advance `lastSyncTime` if the pull succeeded.
//!
//! Records that still have queued changes after the drain, or whose local
//! writes are still being mirrored, are left alone by both reconcile phases.
//!
//! Mirrors of one record reach the remote in the order they were made: a
//! write that arrives while an earlier one for the same id is in flight
//! waits behind it. A pass never fails; remote errors become queued
//! work or are skipped until the next pass.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tally_core::{LocalStore, Mutation, Transaction};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::connectivity::ConnectivityMonitor;
use crate::error::Result;
use crate::queue::PendingQueue;
use crate::remote::{RemoteClient, RemoteResult};

/// Counts of what one sync pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Queued changes the remote confirmed and that were removed.
    pub drained: usize,
    /// Queued changes that failed again and stay queued.
    pub still_pending: usize,
    /// Remote records inserted locally.
    pub inserted: usize,
    /// Local records overwritten by a differing remote record.
    pub updated: usize,
    /// Local records pushed to the remote.
    pub pushed: usize,
    /// Local records whose push failed and were queued.
    pub queued: usize,
    /// Records left alone because they have queued or in-flight changes.
    pub skipped_pending: usize,
    /// Whether the remote list was fetched.
    pub pulled: bool,
}

impl SyncReport {
    /// True if the pass changed nothing on either side.
    pub fn is_noop(&self) -> bool {
        self.drained == 0
            && self.inserted == 0
            && self.updated == 0
            && self.pushed == 0
            && self.queued == 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "drained {}, pending {}, inserted {}, updated {}, pushed {}, queued {}",
            self.drained, self.still_pending, self.inserted, self.updated, self.pushed, self.queued
        )?;
        if !self.pulled {
            write!(f, " (pull failed)")?;
        }
        Ok(())
    }
}

/// When the background loop runs passes on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSchedule {
    /// Periodic pass interval; `None` disables periodic sync.
    pub interval: Option<Duration>,
    /// Run one pass as soon as the loop starts.
    pub sync_on_start: bool,
}

/// Resets the syncing flag however the pass ends.
struct SyncingGuard<'a> {
    flag: &'a AtomicBool,
    status: &'a watch::Sender<bool>,
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.status.send_replace(false);
    }
}

#[derive(Default)]
struct MirrorState {
    /// Mutations waiting behind an in-flight push, by transaction id.
    in_flight: HashMap<i64, VecDeque<Mutation>>,
    /// Ids mirrored while a pass was running.
    touched: HashSet<i64>,
}

/// Reconciles the local store with the remote backend.
pub struct SyncCoordinator {
    store: Arc<dyn LocalStore>,
    remote: RemoteClient,
    queue: Arc<PendingQueue>,
    connectivity: ConnectivityMonitor,
    syncing: AtomicBool,
    status: watch::Sender<bool>,
    last_sync: watch::Sender<Option<DateTime<Utc>>>,
    mirrors: TaskTracker,
    mirror_state: Mutex<MirrorState>,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<dyn LocalStore>,
        remote: RemoteClient,
        queue: Arc<PendingQueue>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        let (status, _) = watch::channel(false);
        let (last_sync, _) = watch::channel(None);
        SyncCoordinator {
            store,
            remote,
            queue,
            connectivity,
            syncing: AtomicBool::new(false),
            status,
            last_sync,
            mirrors: TaskTracker::new(),
            mirror_state: Mutex::new(MirrorState::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    pub fn queue(&self) -> &Arc<PendingQueue> {
        &self.queue
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    /// True while a pass is running.
    pub fn status(&self) -> watch::Receiver<bool> {
        self.status.subscribe()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// When the last pass with a successful pull finished.
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.borrow()
    }

    pub fn watch_last_sync(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_sync.subscribe()
    }

    /// Run one sync pass.
    ///
    /// Returns `None` without doing anything if offline or if another pass
    /// is already running.
    pub async fn sync(&self) -> Option<SyncReport> {
        if !self.connectivity.is_online() {
            tracing::debug!("sync skipped: offline");
            return None;
        }
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("sync skipped: pass already running");
            return None;
        }
        let _guard = SyncingGuard {
            flag: &self.syncing,
            status: &self.status,
        };
        self.status.send_replace(true);

        let report = self.run_pass().await;
        tracing::info!("sync pass complete: {}", report);
        Some(report)
    }

    async fn run_pass(&self) -> SyncReport {
        let mut report = SyncReport::default();
        self.drain_queue(&mut report).await;
        let busy_at_start = self.open_mirror_window().await;

        let remote = match self.remote.get_all().await {
            Ok(txs) => by_id(txs),
            Err(e) => {
                tracing::warn!("pull failed, skipping reconcile: {}", e);
                return report;
            }
        };
        let local = match self.store.get_all() {
            Ok(txs) => by_id(txs),
            Err(e) => {
                tracing::warn!("local read failed, skipping reconcile: {}", e);
                return report;
            }
        };
        let mut pending = match self.queue.pending_ids() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("queue read failed, skipping reconcile: {}", e);
                return report;
            }
        };
        report.pulled = true;
        pending.extend(busy_at_start);
        pending.extend(self.close_mirror_window().await);

        self.apply_remote(&remote, &local, &pending, &mut report);
        self.push_local(&remote, &local, &pending, &mut report).await;

        let now = Utc::now();
        self.last_sync.send_if_modified(|last| match last {
            Some(prev) if *prev >= now => false,
            _ => {
                *last = Some(now);
                true
            }
        });
        report
    }

    async fn drain_queue(&self, report: &mut SyncReport) {
        let changes = match self.queue.peek_all() {
            Ok(changes) => changes,
            Err(e) => {
                tracing::warn!("failed to read pending queue: {}", e);
                return;
            }
        };

        for change in changes {
            match self.replay(&change.mutation).await {
                Ok(()) => match self.queue.remove(change.seq) {
                    Ok(_) => report.drained += 1,
                    Err(e) => {
                        tracing::warn!("failed to remove pending #{}: {}", change.seq, e);
                        report.still_pending += 1;
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        "replay of {} for transaction {} failed: {}",
                        change.mutation.action(),
                        change.mutation.transaction_id(),
                        e
                    );
                    report.still_pending += 1;
                }
            }
        }
    }

    fn apply_remote(
        &self,
        remote: &BTreeMap<i64, Transaction>,
        local: &BTreeMap<i64, Transaction>,
        pending: &HashSet<i64>,
        report: &mut SyncReport,
    ) {
        let mut incoming = Vec::new();
        for (id, theirs) in remote {
            if *id <= 0 {
                tracing::warn!("ignoring remote transaction with invalid id {}", id);
                continue;
            }
            if pending.contains(id) {
                report.skipped_pending += 1;
                continue;
            }
            if local.get(id) != Some(theirs) {
                incoming.push(theirs.clone());
            }
        }
        if incoming.is_empty() {
            return;
        }

        match self.store.put_all(&incoming) {
            Ok(outcome) => {
                report.inserted += outcome.inserted.len();
                report.updated += outcome.updated.len();
                for (id, e) in &outcome.failed {
                    tracing::warn!("failed to apply remote transaction {}: {}", id, e);
                }
            }
            Err(e) => tracing::warn!("failed to apply remote changes: {}", e),
        }
    }

    async fn push_local(
        &self,
        remote: &BTreeMap<i64, Transaction>,
        local: &BTreeMap<i64, Transaction>,
        pending: &HashSet<i64>,
        report: &mut SyncReport,
    ) {
        for (id, ours) in local {
            if remote.contains_key(id) {
                continue;
            }
            if pending.contains(id) {
                report.skipped_pending += 1;
                continue;
            }
            match self.remote.upsert(ours).await {
                Ok(()) => report.pushed += 1,
                Err(e) => {
                    tracing::warn!("push of transaction {} failed, queueing: {}", id, e);
                    match self.queue.enqueue(&Mutation::Add(ours.clone())) {
                        Ok(_) => report.queued += 1,
                        Err(e) => tracing::error!("failed to queue transaction {}: {}", id, e),
                    }
                }
            }
        }
    }

    /// Apply one mutation to the remote.
    ///
    /// Adds are id-preserving upserts. An update of a record the remote
    /// lacks becomes an upsert; a delete of a missing record succeeds.
    async fn replay(&self, mutation: &Mutation) -> RemoteResult<()> {
        match mutation {
            Mutation::Add(tx) => self.remote.upsert(tx).await,
            Mutation::Update(tx) => {
                if !self.remote.update(tx).await? {
                    self.remote.upsert(tx).await?;
                }
                Ok(())
            }
            Mutation::Delete(id) => {
                if !self.remote.delete(*id).await? {
                    tracing::debug!("transaction {} already absent remotely", id);
                }
                Ok(())
            }
        }
    }

    /// Mirror a local write to the remote without waiting for the push.
    ///
    /// If a push for the same record is in flight, the mutation waits
    /// behind it. Otherwise, offline or with earlier changes to the record
    /// still queued, it is queued before this returns. Otherwise it is
    /// pushed in a background task that queues it on failure.
    pub async fn mirror(self: &Arc<Self>, mutation: Mutation) -> Result<()> {
        let id = mutation.transaction_id();
        let mut state = self.mirror_state.lock().await;
        if self.is_syncing() {
            state.touched.insert(id);
        }
        if let Some(waiting) = state.in_flight.get_mut(&id) {
            waiting.push_back(mutation);
            return Ok(());
        }
        if !self.connectivity.is_online() || self.queue.has_pending(id)? {
            self.queue.enqueue(&mutation)?;
            return Ok(());
        }
        state.in_flight.insert(id, VecDeque::new());
        drop(state);

        let this = Arc::clone(self);
        self.mirrors.spawn(async move { this.push_in_order(id, mutation).await });
        Ok(())
    }

    /// Push `first`, then every mutation that queued up behind it.
    ///
    /// On failure the failed mutation and everything behind it move to the
    /// pending queue, oldest first.
    async fn push_in_order(&self, id: i64, first: Mutation) {
        let mut next = first;
        loop {
            let failure = self.replay(&next).await.err();
            let mut state = self.mirror_state.lock().await;
            if let Some(e) = failure {
                tracing::warn!(
                    "mirror of {} for transaction {} failed, queueing: {}",
                    next.action(),
                    id,
                    e
                );
                let waiting = state.in_flight.remove(&id).unwrap_or_default();
                for mutation in std::iter::once(next).chain(waiting) {
                    if let Err(e) = self.queue.enqueue(&mutation) {
                        tracing::error!("failed to queue mirrored change: {}", e);
                    }
                }
                return;
            }
            match state.in_flight.get_mut(&id).and_then(VecDeque::pop_front) {
                Some(mutation) => next = mutation,
                None => {
                    state.in_flight.remove(&id);
                    return;
                }
            }
        }
    }

    /// Start tracking mirrors for a pass. Returns the ids in flight now.
    async fn open_mirror_window(&self) -> HashSet<i64> {
        let mut state = self.mirror_state.lock().await;
        state.touched.clear();
        state.in_flight.keys().copied().collect()
    }

    /// Ids mirrored since [`Self::open_mirror_window`] or still in flight.
    async fn close_mirror_window(&self) -> HashSet<i64> {
        let mut state = self.mirror_state.lock().await;
        let mut ids: HashSet<i64> = state.touched.drain().collect();
        ids.extend(state.in_flight.keys().copied());
        ids
    }

    /// Wait for every in-flight mirror task to finish.
    pub async fn wait_for_mirrors(&self) {
        self.mirrors.close();
        self.mirrors.wait().await;
        self.mirrors.reopen();
    }

    /// Start the background loop.
    ///
    /// Runs a pass on start (if scheduled), on every interval tick, and on
    /// every offline→online transition, until `shutdown` is cancelled.
    pub fn spawn(
        self: &Arc<Self>,
        schedule: SyncSchedule,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut online = self.connectivity.subscribe();
        tokio::spawn(async move {
            let mut ticker = schedule.interval.map(|every| {
                let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });

            if schedule.sync_on_start {
                this.trigger("startup").await;
            }

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = next_tick(&mut ticker) => this.trigger("interval").await,
                    changed = online.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *online.borrow_and_update() {
                            this.trigger("connectivity").await;
                        }
                    }
                }
            }
            tracing::debug!("sync loop stopped");
        })
    }

    async fn trigger(&self, reason: &str) {
        tracing::debug!("sync triggered by {}", reason);
        self.sync().await;
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn by_id(txs: Vec<Transaction>) -> BTreeMap<i64, Transaction> {
    txs.into_iter().map(|t| (t.id, t)).collect()
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
