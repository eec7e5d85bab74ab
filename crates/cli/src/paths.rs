// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Location of the config file and the database.
//!
//! Each path is taken from the command line flag, then the environment,
//! then the platform directory (`~/.config/tally`, `~/.local/share/tally`
//! on Linux).

use std::path::{Path, PathBuf};

use tally_sync::env;

const APP_DIR_NAME: &str = "tally";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "tally.db";

/// Resolve the config file path.
pub fn config_path(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(env::config_path)
        .unwrap_or_else(|| platform_dir(dirs::config_dir()).join(CONFIG_FILE_NAME))
}

/// Resolve the directory holding the database.
pub fn data_dir(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(env::data_dir)
        .unwrap_or_else(|| platform_dir(dirs::data_dir()))
}

/// Database file inside a data directory.
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

fn platform_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME)
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
