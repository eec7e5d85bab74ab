// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The repository the presentation layer talks to.
//!
//! Reads always come from the local store. Writes go to the local store
//! first, so watchers see them at once, and are then mirrored to the remote
//! through the [`SyncCoordinator`]. Without a coordinator the repository is
//! local-only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tally_core::{
    Category, LocalStore, Mutation, NewCategory, NewTransaction, Transaction, TransactionType,
};
use tokio::sync::{watch, Mutex};

use crate::coordinator::{SyncCoordinator, SyncReport};
use crate::error::Result;

pub struct TransactionRepository {
    store: Arc<dyn LocalStore>,
    sync: Option<Arc<SyncCoordinator>>,
    /// Held across a local write and its mirror so both happen in the same order.
    writes: Mutex<()>,
}

impl TransactionRepository {
    /// Repository that never touches the network.
    pub fn local_only(store: Arc<dyn LocalStore>) -> Self {
        TransactionRepository {
            store,
            sync: None,
            writes: Mutex::new(()),
        }
    }

    /// Repository that mirrors writes through `coordinator`.
    pub fn with_sync(coordinator: Arc<SyncCoordinator>) -> Self {
        TransactionRepository {
            store: Arc::clone(coordinator.store()),
            sync: Some(coordinator),
            writes: Mutex::new(()),
        }
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.sync.is_some()
    }

    pub fn coordinator(&self) -> Option<&Arc<SyncCoordinator>> {
        self.sync.as_ref()
    }

    pub fn get_all_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.store.get_all()?)
    }

    pub fn get_transaction_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.store.get_by_id(id)?)
    }

    pub fn get_transactions_by_type(&self, kind: TransactionType) -> Result<Vec<Transaction>> {
        Ok(self.store.get_by_type(kind)?)
    }

    pub fn get_transactions_by_category(&self, category_id: i64) -> Result<Vec<Transaction>> {
        Ok(self.store.get_by_category(category_id)?)
    }

    /// Transactions dated within `[start, end]`, both ends inclusive.
    pub fn get_transactions_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        Ok(self.store.get_by_date_range(start, end)?)
    }

    pub fn watch_all_transactions(&self) -> watch::Receiver<Vec<Transaction>> {
        self.store.watch_all()
    }

    /// Add a transaction and return its id.
    pub async fn add_transaction(&self, new: NewTransaction) -> Result<i64> {
        new.validate()?;
        self.check_category(new.kind, new.category_id)?;

        let _writing = self.writes.lock().await;
        let id = self.store.insert(&new.clone().with_id(0))?;
        tracing::debug!("added transaction {}", id);
        self.mirror(Mutation::Add(new.with_id(id))).await?;
        Ok(id)
    }

    /// Overwrite a transaction. Returns false if it does not exist locally.
    pub async fn update_transaction(&self, tx: Transaction) -> Result<bool> {
        tx.to_new().validate()?;
        self.check_category(tx.kind, tx.category_id)?;

        let tx = tx.to_new().with_id(tx.id);
        let _writing = self.writes.lock().await;
        let updated = self.store.update(&tx)?;
        if updated {
            self.mirror(Mutation::Update(tx)).await?;
        }
        Ok(updated)
    }

    /// Delete a transaction. Returns false if it did not exist locally.
    pub async fn delete_transaction(&self, id: i64) -> Result<bool> {
        let _writing = self.writes.lock().await;
        let deleted = self.store.delete(id)?;
        if deleted {
            self.mirror(Mutation::Delete(id)).await?;
        }
        Ok(deleted)
    }

    /// Run a sync pass now. `None` if local-only, offline, or already syncing.
    pub async fn sync_with_remote(&self) -> Option<SyncReport> {
        match &self.sync {
            Some(sync) => sync.sync().await,
            None => None,
        }
    }

    /// True while a sync pass runs. Always false when local-only.
    pub fn sync_status(&self) -> watch::Receiver<bool> {
        match &self.sync {
            Some(sync) => sync.status(),
            None => watch::channel(false).1,
        }
    }

    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        self.sync.as_ref().and_then(|s| s.last_sync_time())
    }

    /// Number of changes waiting for the remote.
    pub fn pending_count(&self) -> Result<usize> {
        match &self.sync {
            Some(sync) => Ok(sync.queue().len()?),
            None => Ok(0),
        }
    }

    pub fn get_categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.categories()?)
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.store.get_category(id)?)
    }

    pub fn add_category(&self, name: &str, kind: TransactionType) -> Result<i64> {
        let category = NewCategory::new(name, kind)?;
        Ok(self.store.insert_category(&category)?)
    }

    /// Delete a category and detach its transactions.
    ///
    /// Detached transactions are mirrored as updates. Returns their ids.
    pub async fn delete_category(&self, id: i64) -> Result<Vec<i64>> {
        let _writing = self.writes.lock().await;
        let detached = self.store.delete_category(id)?;
        for tx_id in &detached {
            if let Some(tx) = self.store.get_by_id(*tx_id)? {
                self.mirror(Mutation::Update(tx)).await?;
            }
        }
        Ok(detached)
    }

    /// Wait for in-flight remote mirrors to finish.
    pub async fn shutdown(&self) {
        if let Some(sync) = &self.sync {
            sync.wait_for_mirrors().await;
        }
    }

    async fn mirror(&self, mutation: Mutation) -> Result<()> {
        match &self.sync {
            Some(sync) => sync.mirror(mutation).await,
            None => Ok(()),
        }
    }

    fn check_category(&self, kind: TransactionType, category_id: Option<i64>) -> Result<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        let category = self
            .store
            .get_category(category_id)?
            .ok_or(tally_core::Error::CategoryNotFound(category_id))?;
        if category.kind != kind {
            return Err(tally_core::Error::CategoryTypeMismatch {
                category_id,
                category_type: category.kind.to_string(),
                transaction_type: kind.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
