// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of mutations that have not reached the remote yet.
//!
//! Entries live in the `pending_changes` table and survive restarts. The
//! queue holds its own connection, so it may share a database file with the
//! local store. Replay is FIFO by `seq`; an entry is removed only after the
//! remote confirmed it, never edited in place.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tally_core::{Database, Mutation, PendingChange, Result};

/// FIFO queue of pending changes.
pub struct PendingQueue {
    db: Mutex<Database>,
}

impl PendingQueue {
    /// Open (or create) the queue at the given database path.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(PendingQueue {
            db: Mutex::new(Database::open(path)?),
        })
    }

    /// Open an in-memory queue (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(PendingQueue {
            db: Mutex::new(Database::open_in_memory()?),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a mutation. It is persisted before this returns.
    pub fn enqueue(&self, mutation: &Mutation) -> Result<PendingChange> {
        let change = self.lock().enqueue_pending(mutation, Utc::now())?;
        tracing::debug!(
            "queued {} for transaction {} (seq {})",
            mutation.action(),
            mutation.transaction_id(),
            change.seq
        );
        Ok(change)
    }

    /// Read all queued changes in enqueue order without removing them.
    pub fn peek_all(&self) -> Result<Vec<PendingChange>> {
        self.lock().pending_changes()
    }

    /// Remove one change after the remote confirmed it.
    pub fn remove(&self, seq: i64) -> Result<bool> {
        self.lock().remove_pending(seq)
    }

    pub fn len(&self) -> Result<usize> {
        self.lock().count_pending()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every queued change.
    pub fn clear(&self) -> Result<()> {
        self.lock().clear_pending()
    }

    /// Check if any queued change touches the given transaction.
    pub fn has_pending(&self, transaction_id: i64) -> Result<bool> {
        self.lock().has_pending(transaction_id)
    }

    /// Ids of every transaction with a queued change.
    pub fn pending_ids(&self) -> Result<HashSet<i64>> {
        Ok(self
            .peek_all()?
            .iter()
            .map(|c| c.mutation.transaction_id())
            .collect())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
