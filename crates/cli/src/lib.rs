// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally_cli - command-line front end for the tally finance tracker.
//!
//! Opens the local store and, when remote sync is enabled, wires the
//! pending queue, remote client, connectivity monitor, and sync coordinator
//! explicitly for each invocation. See [`App`].

mod app;
mod cli;
mod commands;
mod display;
pub mod error;
pub mod paths;

pub use app::{App, Reachability};
pub use cli::{CategoryCommand, Cli, Command, OutputFormat};
pub use error::{Error, Result};

use std::time::Duration;

use commands::transaction::{Changes, ListFilter};

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute a CLI invocation.
pub async fn run(cli: Cli) -> Result<()> {
    let reachability = match &cli.command {
        Command::List { .. }
        | Command::Show { .. }
        | Command::Status
        | Command::Category {
            command: CategoryCommand::List { .. },
        } => Reachability::AssumeOffline,
        _ => Reachability::Probe,
    };
    let app = App::open(cli.config.as_deref(), cli.data_dir.as_deref(), reachability).await?;
    let result = dispatch(&app, cli.command).await;
    app.close().await;
    result
}

async fn dispatch(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Add {
            kind,
            amount,
            description,
            date,
            category,
            output,
        } => {
            commands::transaction::add(app, kind, amount, description, date, category, output)
                .await
        }
        Command::List {
            kind,
            category,
            from,
            to,
            output,
        } => commands::transaction::list(
            app,
            ListFilter {
                kind,
                category,
                from,
                to,
            },
            output,
        ),
        Command::Show { id, output } => commands::transaction::show(app, id, output),
        Command::Edit {
            id,
            kind,
            amount,
            description,
            date,
            category,
            no_category,
        } => {
            let category = if no_category { Some(None) } else { category.map(Some) };
            let changes = Changes {
                kind,
                amount,
                description,
                date,
                category,
            };
            commands::transaction::edit(app, id, changes).await
        }
        Command::Rm { id } => commands::transaction::remove(app, id).await,
        Command::Category { command } => match command {
            CategoryCommand::Add { name, kind } => commands::category::add(app, &name, kind),
            CategoryCommand::List { output } => commands::category::list(app, output),
            CategoryCommand::Rm { id } => commands::category::remove(app, id).await,
        },
        Command::Sync => commands::sync::sync(app).await,
        Command::Status => commands::sync::status(app),
        Command::Daemon { probe_interval } => {
            commands::sync::daemon(app, Duration::from_secs(probe_interval)).await
        }
    }
}
