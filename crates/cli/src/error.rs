// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors reported by the tally CLI.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] tally_sync::Error),

    #[error(transparent)]
    Store(#[from] tally_core::Error),

    #[error("transaction not found: {0}")]
    TransactionNotFound(i64),

    #[error("category not found: {0}")]
    CategoryNotFound(i64),

    #[error("remote sync is disabled\n  hint: set use_remote_repository = true in {0}")]
    RemoteDisabled(String),

    #[error("{0}")]
    Remote(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;
