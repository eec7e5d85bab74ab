// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync configuration.
//!
//! Configuration is read from a TOML file and then overridden by
//! environment variables (see [`crate::env::vars`]):
//! - `use_remote_repository`: enable the remote half of the repository
//! - `remote_source_type`: which backend dialect to speak
//! - `api_base_url` / `api_key`: where and how to reach it
//! - `auto_sync_interval_minutes`: periodic sync interval, `0` disables
//! - `sync_on_app_start`: run one pass when the coordinator starts
//! - `[credentials]`: per-dialect auth, passed through to the remote client

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::env::{self, vars};
use crate::error::{Error, Result};
use crate::remote::{RemoteSettings, RemoteSourceType};

/// Per-dialect authentication material. Never interpreted by the sync logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Document store project id; used to derive a base URL if none is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Document store access token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_key: Option<String>,
    /// Table backend anonymous key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Repository and sync configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// If false the repository runs local-only and never touches the network.
    #[serde(default)]
    pub use_remote_repository: bool,
    #[serde(default)]
    pub remote_source_type: RemoteSourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Minutes between periodic sync passes (default: 15). 0 = disabled.
    #[serde(default = "default_auto_sync_interval_minutes")]
    pub auto_sync_interval_minutes: u64,
    /// Run a pass when the coordinator starts (default: true).
    #[serde(default = "default_sync_on_app_start")]
    pub sync_on_app_start: bool,
    #[serde(default)]
    pub credentials: Credentials,
}

/// Longest accepted periodic sync interval: one year.
pub const MAX_AUTO_SYNC_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

fn default_auto_sync_interval_minutes() -> u64 {
    15
}

fn default_sync_on_app_start() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            use_remote_repository: false,
            remote_source_type: RemoteSourceType::default(),
            api_base_url: None,
            api_key: None,
            auto_sync_interval_minutes: default_auto_sync_interval_minutes(),
            sync_on_app_start: default_sync_on_app_start(),
            credentials: Credentials::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        Config::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the sync loop cannot schedule.
    pub fn validate(&self) -> Result<()> {
        if self.auto_sync_interval_minutes > MAX_AUTO_SYNC_INTERVAL_MINUTES {
            return Err(Error::Config(format!(
                "auto_sync_interval_minutes: {} exceeds the maximum of {}",
                self.auto_sync_interval_minutes, MAX_AUTO_SYNC_INTERVAL_MINUTES
            )));
        }
        Ok(())
    }

    /// Loads the file, then applies environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Config::load(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Saves configuration to the given file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(env::lookup)
    }

    /// Applies overrides from `lookup`, keyed by the names in [`vars`].
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(vars::TALLY_USE_REMOTE) {
            self.use_remote_repository = flag(vars::TALLY_USE_REMOTE, &v)?;
        }
        if let Some(v) = lookup(vars::TALLY_REMOTE_SOURCE_TYPE) {
            self.remote_source_type = v
                .parse()
                .map_err(|e| Error::Config(format!("{}: {}", vars::TALLY_REMOTE_SOURCE_TYPE, e)))?;
        }
        if let Some(v) = lookup(vars::TALLY_API_BASE_URL) {
            self.api_base_url = Some(v);
        }
        if let Some(v) = lookup(vars::TALLY_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup(vars::TALLY_AUTO_SYNC_INTERVAL_MINUTES) {
            self.auto_sync_interval_minutes = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|minutes| *minutes <= MAX_AUTO_SYNC_INTERVAL_MINUTES)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "{}: expected a whole number of minutes up to {}, got '{}'",
                        vars::TALLY_AUTO_SYNC_INTERVAL_MINUTES,
                        MAX_AUTO_SYNC_INTERVAL_MINUTES,
                        v
                    ))
                })?;
        }
        if let Some(v) = lookup(vars::TALLY_SYNC_ON_APP_START) {
            self.sync_on_app_start = flag(vars::TALLY_SYNC_ON_APP_START, &v)?;
        }
        Ok(())
    }

    /// Effective base URL for the remote client.
    ///
    /// A document store with no explicit URL falls back to the URL derived
    /// from `credentials.project_id`.
    pub fn base_url(&self) -> Option<String> {
        let explicit = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        if let Some(url) = explicit {
            return Some(url.to_string());
        }
        match (self.remote_source_type, &self.credentials.project_id) {
            (RemoteSourceType::DocumentStore, Some(project)) if !project.trim().is_empty() => {
                Some(format!("https://{}.firebaseio.com", project.trim()))
            }
            _ => None,
        }
    }

    /// Settings handed to [`crate::remote::RemoteClient::new`].
    pub fn remote_settings(&self) -> RemoteSettings {
        RemoteSettings {
            source_type: self.remote_source_type,
            base_url: self.base_url(),
            api_key: self.api_key.clone(),
            credentials: self.credentials.clone(),
        }
    }

    /// Periodic sync interval, or `None` when disabled.
    ///
    /// Clamped to [`MAX_AUTO_SYNC_INTERVAL_MINUTES`].
    pub fn auto_sync_interval(&self) -> Option<Duration> {
        match self.auto_sync_interval_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(
                minutes.min(MAX_AUTO_SYNC_INTERVAL_MINUTES) * 60,
            )),
        }
    }
}

fn flag(name: &str, value: &str) -> Result<bool> {
    env::parse_flag(value)
        .ok_or_else(|| Error::Config(format!("{}: expected a boolean, got '{}'", name, value)))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
