// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use tally_core::{Category, Transaction, TransactionType};

/// Signed amount with two decimals: `+100.00` income, `-12.50` expense.
pub fn format_amount(tx: &Transaction) -> String {
    match tx.kind {
        TransactionType::Income => format!("+{:.2}", tx.amount),
        TransactionType::Expense => format!("-{:.2}", tx.amount),
    }
}

/// One-line summary of a transaction.
///
/// `categories` maps category ids to names; unknown ids show as `#id`.
pub fn format_transaction_line(tx: &Transaction, categories: &HashMap<i64, String>) -> String {
    let mut line = format!(
        "{:>5}  {}  {:>10}  {}",
        tx.id,
        tx.date.format("%Y-%m-%d"),
        format_amount(tx),
        tx.description
    );
    if let Some(id) = tx.category_id {
        match categories.get(&id) {
            Some(name) => line.push_str(&format!(" [{}]", name)),
            None => line.push_str(&format!(" [#{}]", id)),
        }
    }
    line.trim_end().to_string()
}

/// Multi-line view used by `show`.
pub fn format_transaction_detail(tx: &Transaction, category: Option<&Category>) -> String {
    let mut out = format!(
        "Transaction {}\n  Type:        {}\n  Amount:      {:.2}\n  Date:        {}\n",
        tx.id,
        tx.kind,
        tx.amount,
        tx.date.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if !tx.description.is_empty() {
        out.push_str(&format!("  Description: {}\n", tx.description));
    }
    match (tx.category_id, category) {
        (Some(_), Some(c)) => out.push_str(&format!("  Category:    {} ({})\n", c.name, c.id)),
        (Some(id), None) => out.push_str(&format!("  Category:    #{}\n", id)),
        (None, _) => {}
    }
    out
}

pub fn format_category_line(category: &Category) -> String {
    format!("{:>4}  {:<7}  {}", category.id, category.kind.as_str(), category.name)
}

/// Income, expense, and net totals of a listing.
pub fn format_totals(txs: &[Transaction]) -> String {
    let (income, expense) = txs.iter().fold((0.0, 0.0), |(i, e), tx| match tx.kind {
        TransactionType::Income => (i + tx.amount, e),
        TransactionType::Expense => (i, e + tx.amount),
    });
    format!(
        "{} transaction(s): income {:.2}, expense {:.2}, net {:.2}",
        txs.len(),
        income,
        expense,
        income - expense
    )
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
