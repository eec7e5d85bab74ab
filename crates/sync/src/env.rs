// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! Every runtime variable the sync layer reads is named in [`vars`].
//! Values override the corresponding config file settings.

use std::path::PathBuf;

/// Environment variable names.
pub mod vars {
    pub const TALLY_USE_REMOTE: &str = "TALLY_USE_REMOTE";
    pub const TALLY_REMOTE_SOURCE_TYPE: &str = "TALLY_REMOTE_SOURCE_TYPE";
    pub const TALLY_API_BASE_URL: &str = "TALLY_API_BASE_URL";
    pub const TALLY_API_KEY: &str = "TALLY_API_KEY";
    pub const TALLY_AUTO_SYNC_INTERVAL_MINUTES: &str = "TALLY_AUTO_SYNC_INTERVAL_MINUTES";
    pub const TALLY_SYNC_ON_APP_START: &str = "TALLY_SYNC_ON_APP_START";
    pub const TALLY_CONFIG: &str = "TALLY_CONFIG";
    pub const TALLY_DATA_DIR: &str = "TALLY_DATA_DIR";
}

/// Every variable that maps onto a config setting.
pub const CONFIG_OVERRIDES: &[&str] = &[
    vars::TALLY_USE_REMOTE,
    vars::TALLY_REMOTE_SOURCE_TYPE,
    vars::TALLY_API_BASE_URL,
    vars::TALLY_API_KEY,
    vars::TALLY_AUTO_SYNC_INTERVAL_MINUTES,
    vars::TALLY_SYNC_ON_APP_START,
];

/// Returns the value of a variable, treating empty as unset.
pub fn lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the value of `TALLY_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    lookup(vars::TALLY_CONFIG).map(PathBuf::from)
}

/// Returns the value of `TALLY_DATA_DIR` if set.
pub fn data_dir() -> Option<PathBuf> {
    lookup(vars::TALLY_DATA_DIR).map(PathBuf::from)
}

/// Parses a boolean flag value. Accepts 1/0, true/false, yes/no, on/off.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
