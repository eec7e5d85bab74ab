// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `tally sync`, `tally status`, and remote configuration.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TALLY_VARS: &[&str] = &[
    "TALLY_USE_REMOTE",
    "TALLY_REMOTE_SOURCE_TYPE",
    "TALLY_API_BASE_URL",
    "TALLY_API_KEY",
    "TALLY_AUTO_SYNC_INTERVAL_MINUTES",
    "TALLY_SYNC_ON_APP_START",
    "TALLY_CONFIG",
    "TALLY_DATA_DIR",
];

fn tally(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("tally");
    for var in TALLY_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--data-dir")
        .arg(temp.path().join("data"))
        .arg("--config")
        .arg(temp.path().join("config.toml"));
    cmd
}

/// A remote pointing at a port nothing listens on.
fn write_unreachable_remote(temp: &TempDir) {
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
use_remote_repository = true
remote_source_type = "generic_rest_api"
api_base_url = "http://127.0.0.1:1"
auto_sync_interval_minutes = 0
"#,
    )
    .unwrap();
}

#[test]
fn local_only_by_default() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote: disabled"));

    tally(&temp)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("remote sync is disabled"));
}

#[test]
fn status_reports_remote_settings() {
    let temp = TempDir::new().unwrap();
    write_unreachable_remote(&temp);

    tally(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Remote: generic_rest_api at http://127.0.0.1:1",
        ))
        .stdout(predicate::str::contains("Auto sync: disabled"))
        .stdout(predicate::str::contains("Pending changes: 0"));
}

#[test]
fn env_overrides_config_file() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .env("TALLY_USE_REMOTE", "1")
        .env("TALLY_REMOTE_SOURCE_TYPE", "supabase")
        .env("TALLY_API_BASE_URL", "http://127.0.0.1:1/rest/v1")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote: table_rest_backend"))
        .stdout(predicate::str::contains("Auto sync: every 15 min"));
}

#[test]
fn invalid_env_override_fails() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .env("TALLY_AUTO_SYNC_INTERVAL_MINUTES", "soon")
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TALLY_AUTO_SYNC_INTERVAL_MINUTES"));
}

#[test]
fn offline_writes_queue_until_sync() {
    let temp = TempDir::new().unwrap();
    write_unreachable_remote(&temp);

    tally(&temp)
        .args(["add", "expense", "42.50", "coffee"])
        .assert()
        .success();
    tally(&temp)
        .args(["rm", "1"])
        .assert()
        .success();

    tally(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending changes: 2"));

    tally(&temp)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync skipped: remote unreachable"))
        .stdout(predicate::str::contains("Pending changes: 2"));
}
