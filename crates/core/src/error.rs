// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tally-core operations.

use thiserror::Error;

/// All possible errors that can occur in tally-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transaction not found: {0}")]
    TransactionNotFound(i64),

    #[error("category not found: {0}")]
    CategoryNotFound(i64),

    #[error("invalid transaction type: '{0}'\n  hint: valid types are: income, expense")]
    InvalidTransactionType(String),

    #[error("invalid action: '{0}'\n  hint: valid actions are: add, update, delete")]
    InvalidAction(String),

    #[error("category {category_id} is {category_type} but the transaction is {transaction_type}")]
    CategoryTypeMismatch {
        category_id: i64,
        category_type: String,
        transaction_type: String,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for tally-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
