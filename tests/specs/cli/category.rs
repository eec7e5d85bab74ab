// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for the `tally category` commands.

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

#[test]
fn add_and_list_categories() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .args(["category", "add", "Food", "--type", "expense"])
        .assert()
        .success()
        .stdout("Created category 1\n");
    tally(&temp)
        .args(["category", "add", "Salary", "-t", "income"])
        .assert()
        .success();

    tally(&temp)
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expense  Food"))
        .stdout(predicate::str::contains("income   Salary"));
}

#[test]
fn category_name_must_not_be_blank() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .args(["category", "add", "   ", "--type", "expense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("category name"));
}

#[test]
fn transaction_type_must_match_category() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .args(["category", "add", "Salary", "--type", "income"])
        .assert()
        .success();

    tally(&temp)
        .args(["add", "expense", "5", "snack", "--category", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("category 1 is income"));

    tally(&temp)
        .args(["add", "income", "900", "pay", "--category", "1"])
        .assert()
        .success();
    tally(&temp)
        .args(["list", "--category", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pay [Salary]"));
}

#[test]
fn removing_category_detaches_transactions() {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .args(["category", "add", "Food", "--type", "expense"])
        .assert()
        .success();
    tally(&temp)
        .args(["add", "expense", "4", "bread", "-c", "1"])
        .assert()
        .success();

    tally(&temp)
        .args(["category", "rm", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 transaction(s) now uncategorized"));

    tally(&temp)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Category").not());

    tally(&temp)
        .args(["category", "rm", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("category not found: 1"));
}
