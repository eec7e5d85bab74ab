// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The local authoritative record store.
//!
//! [`LocalStore`] is the contract the sync layer and the repository facade
//! consume: plain CRUD plus a live view of all transactions. Each call is
//! atomic at the store level; callers need no additional locking.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::db::{Database, PutOutcome};
use crate::error::Result;
use crate::transaction::{Category, NewCategory, Transaction, TransactionType};

/// Durable, query-able store for transactions and categories.
pub trait LocalStore: Send + Sync {
    /// All transactions, newest first.
    fn get_all(&self) -> Result<Vec<Transaction>>;

    fn get_by_id(&self, id: i64) -> Result<Option<Transaction>>;

    /// Insert a transaction. An id of `0` asks the store to assign one.
    fn insert(&self, tx: &Transaction) -> Result<i64>;

    /// Overwrite an existing transaction. Returns false if it does not exist.
    fn update(&self, tx: &Transaction) -> Result<bool>;

    /// Returns false if the transaction did not exist.
    fn delete(&self, id: i64) -> Result<bool>;

    /// Live view of all transactions, re-emitted after every mutation.
    fn watch_all(&self) -> watch::Receiver<Vec<Transaction>>;

    /// Insert or overwrite each record under its own id.
    ///
    /// Watchers are notified once for the whole batch. A record that fails
    /// is reported in the outcome without stopping the rest.
    fn put_all(&self, records: &[Transaction]) -> Result<PutOutcome> {
        let mut outcome = PutOutcome::default();
        for tx in records {
            let written = match self.update(tx) {
                Ok(true) => Ok(true),
                Ok(false) => self.insert(tx).map(|_| false),
                Err(e) => Err(e),
            };
            match written {
                Ok(true) => outcome.updated.push(tx.id),
                Ok(false) => outcome.inserted.push(tx.id),
                Err(e) => outcome.failed.push((tx.id, e)),
            }
        }
        Ok(outcome)
    }

    fn get_by_type(&self, kind: TransactionType) -> Result<Vec<Transaction>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.kind == kind)
            .collect())
    }

    fn get_by_category(&self, category_id: i64) -> Result<Vec<Transaction>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.category_id == Some(category_id))
            .collect())
    }

    /// Transactions dated within `[start, end]`, both ends inclusive.
    fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect())
    }

    fn categories(&self) -> Result<Vec<Category>>;

    fn get_category(&self, id: i64) -> Result<Option<Category>>;

    fn insert_category(&self, category: &NewCategory) -> Result<i64>;

    /// Delete a category, nulling the reference on its transactions.
    ///
    /// Returns the ids of the transactions that were detached.
    fn delete_category(&self, id: i64) -> Result<Vec<i64>>;
}

/// [`LocalStore`] backed by a SQLite [`Database`].
pub struct SqliteStore {
    db: Mutex<Database>,
    changes: watch::Sender<Vec<Transaction>>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_database(Database::open(path)?)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::from_database(Database::open_in_memory()?)
    }

    fn from_database(db: Database) -> Result<Self> {
        let initial = db.get_all_transactions()?;
        let (changes, _) = watch::channel(initial);
        Ok(SqliteStore {
            db: Mutex::new(db),
            changes,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-read all transactions and push them to watchers.
    fn publish(&self, db: &Database) -> Result<()> {
        let all = db.get_all_transactions()?;
        self.changes.send_replace(all);
        Ok(())
    }
}

impl LocalStore for SqliteStore {
    fn get_all(&self) -> Result<Vec<Transaction>> {
        self.lock().get_all_transactions()
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        self.lock().get_transaction(id)
    }

    fn insert(&self, tx: &Transaction) -> Result<i64> {
        let db = self.lock();
        let id = db.insert_transaction(tx)?;
        self.publish(&db)?;
        Ok(id)
    }

    fn update(&self, tx: &Transaction) -> Result<bool> {
        let db = self.lock();
        let updated = db.update_transaction(tx)?;
        if updated {
            self.publish(&db)?;
        }
        Ok(updated)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let db = self.lock();
        let deleted = db.delete_transaction(id)?;
        if deleted {
            self.publish(&db)?;
        }
        Ok(deleted)
    }

    fn watch_all(&self) -> watch::Receiver<Vec<Transaction>> {
        self.changes.subscribe()
    }

    fn put_all(&self, records: &[Transaction]) -> Result<PutOutcome> {
        let mut db = self.lock();
        let outcome = db.put_transactions(records)?;
        if outcome.written() > 0 {
            self.publish(&db)?;
        }
        Ok(outcome)
    }

    fn get_by_type(&self, kind: TransactionType) -> Result<Vec<Transaction>> {
        self.lock().list_transactions(Some(kind), None, None)
    }

    fn get_by_category(&self, category_id: i64) -> Result<Vec<Transaction>> {
        self.lock().list_transactions(None, Some(category_id), None)
    }

    fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        self.lock().list_transactions(None, None, Some((start, end)))
    }

    fn categories(&self) -> Result<Vec<Category>> {
        self.lock().get_categories()
    }

    fn get_category(&self, id: i64) -> Result<Option<Category>> {
        self.lock().get_category(id)
    }

    fn insert_category(&self, category: &NewCategory) -> Result<i64> {
        self.lock().insert_category(category)
    }

    fn delete_category(&self, id: i64) -> Result<Vec<i64>> {
        let mut db = self.lock();
        let detached = db.delete_category(id)?;
        if !detached.is_empty() {
            self.publish(&db)?;
        }
        Ok(detached)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
