// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for the `tally add`, `list`, `show`, `edit`, and `rm` commands.

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

fn add(temp: &TempDir, args: &[&str]) -> String {
    let output = tally(temp)
        .arg("add")
        .args(args)
        .arg("-o")
        .arg("id")
        .output()
        .unwrap();
    assert!(output.status.success(), "add failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn list_empty_database() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 transaction(s)"));
}

#[test]
fn add_then_list() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .args(["add", "expense", "42.50", "coffee", "--date", "2024-06-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added transaction 1"));

    tally(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-06-03"))
        .stdout(predicate::str::contains("-42.50  coffee"))
        .stdout(predicate::str::contains("expense 42.50"));
}

#[test]
fn add_outputs_wire_json() {
    let temp = TempDir::new().unwrap();
    let output = tally(&temp)
        .args(["add", "income", "100", "salary", "-d", "2024-06-01", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "INCOME");
    assert_eq!(json["amount"], 100.0);
    assert_eq!(json["date"], 1_717_200_000_000_i64);
}

#[test]
fn add_rejects_invalid_type_and_amount() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .args(["add", "transfer", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("income"));
    tally(&temp)
        .args(["add", "expense", "ten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid amount"));
}

#[test]
fn list_filters_by_type_and_date() {
    let temp = TempDir::new().unwrap();
    add(&temp, &["expense", "5", "bus", "-d", "2024-06-01"]);
    add(&temp, &["income", "900", "pay", "-d", "2024-06-15"]);
    add(&temp, &["expense", "20", "dinner", "-d", "2024-06-30"]);

    tally(&temp)
        .args(["list", "--type", "income"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pay"))
        .stdout(predicate::str::contains("bus").not());

    tally(&temp)
        .args(["list", "--from", "2024-06-01", "--to", "2024-06-15", "-o", "id"])
        .assert()
        .success()
        .stdout("2\n1\n");
}

#[test]
fn show_and_missing() {
    let temp = TempDir::new().unwrap();
    let id = add(&temp, &["expense", "3", "tea"]);

    tally(&temp)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Description: tea"));

    tally(&temp)
        .args(["show", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transaction not found: 99"));
}

#[test]
fn edit_changes_fields() {
    let temp = TempDir::new().unwrap();
    let id = add(&temp, &["expense", "3", "tea"]);

    tally(&temp)
        .args(["edit", &id, "--amount", "4.25", "--description", "green tea"])
        .assert()
        .success();

    tally(&temp)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Amount:      4.25"))
        .stdout(predicate::str::contains("green tea"));
}

#[test]
fn rm_deletes_once() {
    let temp = TempDir::new().unwrap();
    let id = add(&temp, &["expense", "3", "tea"]);

    tally(&temp).args(["rm", &id]).assert().success();
    tally(&temp)
        .args(["rm", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
