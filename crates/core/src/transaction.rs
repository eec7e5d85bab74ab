// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core record types for the tally finance tracker.
//!
//! This module contains the fundamental data types: Transaction,
//! TransactionType, Category, and the pending-change types used by the
//! offline queue.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Maximum length of a category name, in characters.
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

/// Direction of money flow. The sign of an amount is implied by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionType {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::InvalidTransactionType(s.to_string())),
        }
    }
}

/// A single categorized income or expense record.
///
/// The serialized form is the remote wire format: camelCase keys, `type`
/// upper-cased, and `date` as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Locally authoritative identifier. `0` means "not yet assigned".
    #[serde(default)]
    pub id: i64,
    /// Optional category reference.
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// When the transaction happened (millisecond precision).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Free-form description, may be empty.
    #[serde(default)]
    pub description: String,
    /// Non-negative magnitude.
    pub amount: f64,
}

impl Transaction {
    /// Returns the fields of this transaction without its id.
    pub fn to_new(&self) -> NewTransaction {
        NewTransaction {
            category_id: self.category_id,
            kind: self.kind,
            date: self.date,
            description: self.description.clone(),
            amount: self.amount,
        }
    }

    /// Returns true if the store has not assigned an id yet.
    pub fn is_unassigned(&self) -> bool {
        self.id == 0
    }
}

/// The fields of a transaction before an id has been assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
}

impl NewTransaction {
    /// Creates a new uncategorized transaction.
    ///
    /// The date is truncated to millisecond precision, the resolution of
    /// both the local store and the remote wire format.
    pub fn new(
        kind: TransactionType,
        amount: f64,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        NewTransaction {
            category_id: None,
            kind,
            date: date.trunc_subsecs(3),
            description: description.into(),
            amount,
        }
    }

    /// Sets the category reference.
    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Checks the amount is a finite, non-negative magnitude.
    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)
    }

    /// Attaches an id, producing a full transaction.
    pub fn with_id(self, id: i64) -> Transaction {
        Transaction {
            id,
            category_id: self.category_id,
            kind: self.kind,
            date: self.date.trunc_subsecs(3),
            description: self.description,
            amount: self.amount,
        }
    }
}

/// Checks an amount is a finite, non-negative magnitude.
pub fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidInput(format!(
            "invalid amount {amount}: must be a non-negative number"
        )));
    }
    Ok(())
}

/// A user-defined grouping for transactions of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// The fields of a category before an id has been assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub kind: TransactionType,
}

impl NewCategory {
    /// Creates a category, trimming the name and checking its length.
    ///
    /// Duplicate name/type pairs are allowed.
    pub fn new(name: &str, kind: TransactionType) -> Result<Self> {
        let name = name.trim();
        let len = name.chars().count();
        if len == 0 || len > MAX_CATEGORY_NAME_LEN {
            return Err(Error::InvalidInput(format!(
                "category name must be 1-{MAX_CATEGORY_NAME_LEN} characters (got {len})"
            )));
        }
        Ok(NewCategory {
            name: name.to_string(),
            kind,
        })
    }
}

/// The kind of mutation recorded in a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Add,
    Update,
    Delete,
}

impl PendingAction {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingAction::Add => "add",
            PendingAction::Update => "update",
            PendingAction::Delete => "delete",
        }
    }
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PendingAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(PendingAction::Add),
            "update" => Ok(PendingAction::Update),
            "delete" => Ok(PendingAction::Delete),
            _ => Err(Error::InvalidAction(s.to_string())),
        }
    }
}

/// A locally applied mutation that still has to reach the remote backend.
///
/// Add and Update carry a full snapshot; Delete carries only the id.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Add(Transaction),
    Update(Transaction),
    Delete(i64),
}

impl Mutation {
    /// Returns the kind of this mutation.
    pub fn action(&self) -> PendingAction {
        match self {
            Mutation::Add(_) => PendingAction::Add,
            Mutation::Update(_) => PendingAction::Update,
            Mutation::Delete(_) => PendingAction::Delete,
        }
    }

    /// Returns the id of the transaction this mutation touches.
    pub fn transaction_id(&self) -> i64 {
        match self {
            Mutation::Add(tx) | Mutation::Update(tx) => tx.id,
            Mutation::Delete(id) => *id,
        }
    }

    /// Returns the snapshot carried by Add and Update.
    pub fn snapshot(&self) -> Option<&Transaction> {
        match self {
            Mutation::Add(tx) | Mutation::Update(tx) => Some(tx),
            Mutation::Delete(_) => None,
        }
    }
}

/// A durable entry of the pending change queue.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    /// Enqueue order; replay is FIFO by this value.
    pub seq: i64,
    pub mutation: Mutation,
    pub enqueued_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
