// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tally_core::TransactionType;

use crate::app::App;
use crate::cli::OutputFormat;
use crate::display::format_category_line;
use crate::error::Result;

pub fn add(app: &App, name: &str, kind: TransactionType) -> Result<()> {
    let id = app.repo.add_category(name, kind)?;
    println!("Created category {}", id);
    Ok(())
}

pub fn list(app: &App, output: OutputFormat) -> Result<()> {
    let categories = app.repo.get_categories()?;
    match output {
        OutputFormat::Id => {
            for c in &categories {
                println!("{}", c.id);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&categories)?),
        OutputFormat::Text => {
            for c in &categories {
                println!("{}", format_category_line(c));
            }
        }
    }
    Ok(())
}

pub async fn remove(app: &App, id: i64) -> Result<()> {
    let detached = app.repo.delete_category(id).await?;
    println!("Deleted category {}", id);
    if !detached.is_empty() {
        println!("  {} transaction(s) now uncategorized", detached.len());
    }
    Ok(())
}
