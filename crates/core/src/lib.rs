// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-core: Shared library for the tally finance tracker
//!
//! This crate provides the record types, the SQLite-backed local store, and
//! the durable pending-change table used by the sync layer and the CLI.

pub mod db;
pub mod error;
pub mod store;
pub mod transaction;

pub use db::{Database, PutOutcome};
pub use error::{Error, Result};
pub use store::{LocalStore, SqliteStore};
pub use transaction::{
    Category, Mutation, NewCategory, NewTransaction, PendingAction, PendingChange, Transaction,
    TransactionType,
};
