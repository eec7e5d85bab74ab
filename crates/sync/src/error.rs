// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::remote::RemoteFailure;

/// Errors surfaced by the sync layer and the repository facade.
#[derive(Debug, Error)]
pub enum Error {
    /// The local store or the pending queue failed.
    #[error(transparent)]
    Store(#[from] tally_core::Error),

    #[error(transparent)]
    Remote(#[from] RemoteFailure),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
