// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use tally_core::{NewTransaction, Transaction, TransactionType};

use crate::app::App;
use crate::cli::OutputFormat;
use crate::display::{format_totals, format_transaction_detail, format_transaction_line};
use crate::error::{Error, Result};

use super::category_names;

pub async fn add(
    app: &App,
    kind: TransactionType,
    amount: f64,
    description: String,
    date: Option<DateTime<Utc>>,
    category: Option<i64>,
    output: OutputFormat,
) -> Result<()> {
    let mut new = NewTransaction::new(kind, amount, description, date.unwrap_or_else(Utc::now));
    if let Some(category) = category {
        new = new.with_category(category);
    }
    let id = app.repo.add_transaction(new).await?;

    match output {
        OutputFormat::Id => println!("{}", id),
        OutputFormat::Json => {
            let tx = get(app, id)?;
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }
        OutputFormat::Text => println!("Added transaction {}", id),
    }
    Ok(())
}

/// Filters for `list`. Every bound is inclusive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListFilter {
    pub kind: Option<TransactionType>,
    pub category: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ListFilter {
    fn matches(&self, tx: &Transaction) -> bool {
        self.kind.is_none_or(|k| tx.kind == k)
            && self.category.is_none_or(|c| tx.category_id == Some(c))
            && self.from.is_none_or(|from| tx.date >= from)
            && self.to.is_none_or(|to| tx.date <= to)
    }
}

pub fn list(app: &App, filter: ListFilter, output: OutputFormat) -> Result<()> {
    let repo = &app.repo;
    let candidates = if filter.from.is_some() || filter.to.is_some() {
        repo.get_transactions_by_date_range(
            filter.from.unwrap_or(DateTime::<Utc>::MIN_UTC),
            filter.to.unwrap_or(DateTime::<Utc>::MAX_UTC),
        )?
    } else if let Some(category) = filter.category {
        repo.get_transactions_by_category(category)?
    } else if let Some(kind) = filter.kind {
        repo.get_transactions_by_type(kind)?
    } else {
        repo.get_all_transactions()?
    };
    let txs: Vec<Transaction> = candidates
        .into_iter()
        .filter(|tx| filter.matches(tx))
        .collect();

    match output {
        OutputFormat::Id => {
            for tx in &txs {
                println!("{}", tx.id);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&txs)?),
        OutputFormat::Text => {
            let names = category_names(app)?;
            for tx in &txs {
                println!("{}", format_transaction_line(tx, &names));
            }
            println!("{}", format_totals(&txs));
        }
    }
    Ok(())
}

pub fn show(app: &App, id: i64, output: OutputFormat) -> Result<()> {
    let tx = get(app, id)?;
    match output {
        OutputFormat::Id => println!("{}", tx.id),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tx)?),
        OutputFormat::Text => {
            let category = match tx.category_id {
                Some(c) => app.repo.get_category(c)?,
                None => None,
            };
            print!("{}", format_transaction_detail(&tx, category.as_ref()));
        }
    }
    Ok(())
}

/// Field changes for `edit`. `None` leaves a field as it is.
#[derive(Debug, Default, Clone)]
pub struct Changes {
    pub kind: Option<TransactionType>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// `Some(None)` removes the category.
    pub category: Option<Option<i64>>,
}

impl Changes {
    fn apply(self, tx: &mut Transaction) {
        if let Some(kind) = self.kind {
            tx.kind = kind;
        }
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(description) = self.description {
            tx.description = description;
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
        if let Some(category) = self.category {
            tx.category_id = category;
        }
    }
}

pub async fn edit(app: &App, id: i64, changes: Changes) -> Result<()> {
    let mut tx = get(app, id)?;
    changes.apply(&mut tx);
    if !app.repo.update_transaction(tx).await? {
        return Err(Error::TransactionNotFound(id));
    }
    println!("Updated transaction {}", id);
    Ok(())
}

pub async fn remove(app: &App, id: i64) -> Result<()> {
    if !app.repo.delete_transaction(id).await? {
        return Err(Error::TransactionNotFound(id));
    }
    println!("Deleted transaction {}", id);
    Ok(())
}

fn get(app: &App, id: i64) -> Result<Transaction> {
    app.repo
        .get_transaction_by_id(id)?
        .ok_or(Error::TransactionNotFound(id))
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
