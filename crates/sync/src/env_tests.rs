// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[test]
fn vars_constants() {
    assert_eq!(vars::TALLY_USE_REMOTE, "TALLY_USE_REMOTE");
    assert_eq!(vars::TALLY_API_BASE_URL, "TALLY_API_BASE_URL");
    assert_eq!(vars::TALLY_CONFIG, "TALLY_CONFIG");
    assert_eq!(vars::TALLY_DATA_DIR, "TALLY_DATA_DIR");
    assert_eq!(CONFIG_OVERRIDES.len(), 6);
}

#[test]
fn lookup_unset_and_empty() {
    std::env::remove_var("TALLY_TEST_LOOKUP_UNSET");
    assert_eq!(lookup("TALLY_TEST_LOOKUP_UNSET"), None);

    std::env::set_var("TALLY_TEST_LOOKUP_EMPTY", "  ");
    assert_eq!(lookup("TALLY_TEST_LOOKUP_EMPTY"), None);
    std::env::remove_var("TALLY_TEST_LOOKUP_EMPTY");
}

#[test]
fn lookup_set() {
    std::env::set_var("TALLY_TEST_LOOKUP_SET", "value");
    assert_eq!(lookup("TALLY_TEST_LOOKUP_SET").as_deref(), Some("value"));
    std::env::remove_var("TALLY_TEST_LOOKUP_SET");
}

#[parameterized(
    one = { "1", Some(true) },
    true_word = { "true", Some(true) },
    upper = { "TRUE", Some(true) },
    yes = { "yes", Some(true) },
    on = { " on ", Some(true) },
    zero = { "0", Some(false) },
    false_word = { "false", Some(false) },
    no = { "no", Some(false) },
    off = { "off", Some(false) },
    garbage = { "maybe", None },
    empty = { "", None },
)]
fn parse_flag_values(input: &str, expected: Option<bool>) {
    assert_eq!(parse_flag(input), expected);
}
