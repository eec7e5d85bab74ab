// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed database for transaction storage.
//!
//! The [`Database`] struct provides all data access operations for
//! transactions, categories, and the durable pending-change queue.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::{Error, Result};
use crate::transaction::{
    Category, Mutation, NewCategory, PendingAction, PendingChange, Transaction, TransactionType,
};

/// SQL schema for the finance tracker database.
pub const SCHEMA: &str = r#"
-- Categorized income/expense records
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER,         -- nulled when the category is deleted
    type TEXT NOT NULL,          -- income|expense
    date_ms INTEGER NOT NULL,    -- epoch milliseconds
    description TEXT NOT NULL DEFAULT '',
    amount REAL NOT NULL
);

-- User-defined categories (name/type pairs need not be unique)
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    type TEXT NOT NULL
);

-- Mutations not yet confirmed by the remote backend, replayed in seq order
CREATE TABLE IF NOT EXISTS pending_changes (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    action TEXT NOT NULL,        -- add|update|delete
    transaction_id INTEGER NOT NULL,
    payload TEXT,                -- transaction snapshot (JSON), NULL for delete
    enqueued_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_transactions_type ON transactions(type);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date_ms);
CREATE INDEX IF NOT EXISTS idx_pending_transaction ON pending_changes(transaction_id);
"#;

const TRANSACTION_COLUMNS: &str = "id, category_id, type, date_ms, description, amount";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Convert epoch milliseconds from the database into a timestamp.
fn parse_millis(value: i64) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Integer,
            Box::new(Error::CorruptedData(format!(
                "invalid timestamp '{value}' in column 'date_ms'"
            ))),
        )
    })
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let type_str: String = row.get(2)?;
    Ok(Transaction {
        id: row.get(0)?,
        category_id: row.get(1)?,
        kind: parse_db(&type_str, "type")?,
        date: parse_millis(row.get(3)?)?,
        description: row.get(4)?,
        amount: row.get(5)?,
    })
}

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    let type_str: String = row.get(2)?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: parse_db(&type_str, "type")?,
    })
}

fn insert_row(conn: &Connection, tx: &Transaction) -> Result<i64> {
    if tx.is_unassigned() {
        conn.execute(
            "INSERT INTO transactions (category_id, type, date_ms, description, amount)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                tx.category_id,
                tx.kind.as_str(),
                tx.date.timestamp_millis(),
                tx.description,
                tx.amount,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    } else {
        conn.execute(
            "INSERT INTO transactions (id, category_id, type, date_ms, description, amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                tx.id,
                tx.category_id,
                tx.kind.as_str(),
                tx.date.timestamp_millis(),
                tx.description,
                tx.amount,
            ],
        )?;
        Ok(tx.id)
    }
}

fn update_row(conn: &Connection, tx: &Transaction) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE transactions
         SET category_id = ?1, type = ?2, date_ms = ?3, description = ?4, amount = ?5
         WHERE id = ?6",
        params![
            tx.category_id,
            tx.kind.as_str(),
            tx.date.timestamp_millis(),
            tx.description,
            tx.amount,
            tx.id,
        ],
    )?;
    Ok(affected > 0)
}

/// Result of [`Database::put_transactions`], by transaction id.
#[derive(Debug, Default)]
pub struct PutOutcome {
    pub inserted: Vec<i64>,
    pub updated: Vec<i64>,
    pub failed: Vec<(i64, Error)>,
}

impl PutOutcome {
    /// Number of records written.
    pub fn written(&self) -> usize {
        self.inserted.len() + self.updated.len()
    }
}

/// Run schema creation on a database connection.
///
/// Safe to run repeatedly; every statement is `IF NOT EXISTS`.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with finance tracker operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL lets the store and the pending queue hold separate connections
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Insert a transaction and return its id.
    ///
    /// An id of `0` lets SQLite assign one; any other id is stored as given.
    pub fn insert_transaction(&self, tx: &Transaction) -> Result<i64> {
        insert_row(&self.conn, tx)
    }

    /// Get a transaction by id.
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1");
        let tx = self
            .conn
            .query_row(&sql, params![id], row_to_transaction)
            .optional()?;
        Ok(tx)
    }

    /// Replace every field of an existing transaction.
    ///
    /// Returns false if no transaction has that id.
    pub fn update_transaction(&self, tx: &Transaction) -> Result<bool> {
        update_row(&self.conn, tx)
    }

    /// Write each record under its own id, overwriting or inserting,
    /// inside one SQL transaction.
    ///
    /// A record that fails is reported in the outcome; the rest commit.
    pub fn put_transactions(&mut self, records: &[Transaction]) -> Result<PutOutcome> {
        let txn = self.conn.transaction()?;
        let mut outcome = PutOutcome::default();
        for tx in records {
            let written = if tx.is_unassigned() {
                Err(Error::InvalidInput("record has no id".to_string()))
            } else {
                update_row(&txn, tx).and_then(|updated| {
                    if updated {
                        Ok(true)
                    } else {
                        insert_row(&txn, tx).map(|_| false)
                    }
                })
            };
            match written {
                Ok(true) => outcome.updated.push(tx.id),
                Ok(false) => outcome.inserted.push(tx.id),
                Err(e) => outcome.failed.push((tx.id, e)),
            }
        }
        txn.commit()?;
        Ok(outcome)
    }

    /// Delete a transaction. Returns false if it did not exist.
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// List transactions, newest first, with optional filters.
    pub fn list_transactions(
        &self,
        kind: Option<TransactionType>,
        category_id: Option<i64>,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions");

        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(k) = kind {
            conditions.push("type = ?");
            params_vec.push(Box::new(k.as_str()));
        }

        if let Some(c) = category_id {
            conditions.push("category_id = ?");
            params_vec.push(Box::new(c));
        }

        if let Some((start, end)) = range {
            conditions.push("date_ms BETWEEN ? AND ?");
            params_vec.push(Box::new(start.timestamp_millis()));
            params_vec.push(Box::new(end.timestamp_millis()));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(" ORDER BY date_ms DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let txs = stmt
            .query_map(params_refs.as_slice(), row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(txs)
    }

    /// Get all transactions.
    pub fn get_all_transactions(&self) -> Result<Vec<Transaction>> {
        self.list_transactions(None, None, None)
    }

    /// Create a category and return its id.
    pub fn insert_category(&self, category: &NewCategory) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (name, type) VALUES (?1, ?2)",
            params![category.name, category.kind.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a category by id.
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, type FROM categories WHERE id = ?1",
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// List all categories ordered by name.
    pub fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, type FROM categories ORDER BY name, id")?;
        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Delete a category, detaching any transactions that reference it.
    ///
    /// Returns the ids of the detached transactions.
    pub fn delete_category(&mut self, id: i64) -> Result<Vec<i64>> {
        let txn = self.conn.transaction()?;

        let detached = {
            let mut stmt = txn.prepare("SELECT id FROM transactions WHERE category_id = ?1")?;
            let ids = stmt
                .query_map(params![id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            ids
        };

        txn.execute(
            "UPDATE transactions SET category_id = NULL WHERE category_id = ?1",
            params![id],
        )?;
        let affected = txn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(Error::CategoryNotFound(id));
        }

        txn.commit()?;
        Ok(detached)
    }

    /// Append a mutation to the pending change table.
    pub fn enqueue_pending(
        &self,
        mutation: &Mutation,
        enqueued_at: DateTime<Utc>,
    ) -> Result<PendingChange> {
        let payload = match mutation.snapshot() {
            Some(tx) => Some(serde_json::to_string(tx)?),
            None => None,
        };

        self.conn.execute(
            "INSERT INTO pending_changes (action, transaction_id, payload, enqueued_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                mutation.action().as_str(),
                mutation.transaction_id(),
                payload,
                enqueued_at.to_rfc3339(),
            ],
        )?;

        Ok(PendingChange {
            seq: self.conn.last_insert_rowid(),
            mutation: mutation.clone(),
            enqueued_at,
        })
    }

    /// List pending changes in enqueue order.
    pub fn pending_changes(&self) -> Result<Vec<PendingChange>> {
        let mut stmt = self.conn.prepare(
            "SELECT seq, action, transaction_id, payload, enqueued_at
             FROM pending_changes ORDER BY seq",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let action_str: String = row.get(1)?;
                let enqueued_str: String = row.get(4)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    parse_db::<PendingAction>(&action_str, "action")?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    parse_timestamp(&enqueued_str, "enqueued_at")?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(seq, action, transaction_id, payload, enqueued_at)| {
                let mutation = match (action, payload) {
                    (PendingAction::Delete, _) => Mutation::Delete(transaction_id),
                    (PendingAction::Add, Some(json)) => Mutation::Add(serde_json::from_str(&json)?),
                    (PendingAction::Update, Some(json)) => {
                        Mutation::Update(serde_json::from_str(&json)?)
                    }
                    (action, None) => {
                        return Err(Error::CorruptedData(format!(
                            "pending {action} #{seq} has no payload"
                        )))
                    }
                };
                Ok(PendingChange {
                    seq,
                    mutation,
                    enqueued_at,
                })
            })
            .collect()
    }

    /// Remove a pending change. Returns false if it was already gone.
    pub fn remove_pending(&self, seq: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM pending_changes WHERE seq = ?1", params![seq])?;
        Ok(affected > 0)
    }

    /// Count pending changes.
    pub fn count_pending(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM pending_changes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Check if any pending change touches the given transaction.
    pub fn has_pending(&self, transaction_id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pending_changes WHERE transaction_id = ?1",
            params![transaction_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Remove every pending change.
    pub fn clear_pending(&self) -> Result<()> {
        self.conn.execute("DELETE FROM pending_changes", [])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
