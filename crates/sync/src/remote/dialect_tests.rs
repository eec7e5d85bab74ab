// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the backend dialects.

#![allow(clippy::unwrap_used)]

use super::dialect::*;
use super::{Method, RemoteFailure, RemoteSettings};
use crate::config::Credentials;
use chrono::{TimeZone, Utc};
use tally_core::{NewTransaction, Transaction, TransactionType};
use yare::parameterized;

fn sample(id: i64) -> Transaction {
    NewTransaction::new(
        TransactionType::Expense,
        42.5,
        "coffee",
        Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap(),
    )
    .with_id(id)
}

const RECORD: &str = r#"{"type":"EXPENSE","date":1704182400000,"description":"coffee","amount":42.5}"#;

#[parameterized(
    document_store = { "document_store", RemoteSourceType::DocumentStore },
    firebase_alias = { "firebase", RemoteSourceType::DocumentStore },
    table = { "table-rest-backend", RemoteSourceType::TableRestBackend },
    supabase_alias = { "SUPABASE", RemoteSourceType::TableRestBackend },
    generic = { "generic_rest_api", RemoteSourceType::GenericRestApi },
    rest_alias = { "rest_api", RemoteSourceType::GenericRestApi },
)]
fn source_type_parse(input: &str, expected: RemoteSourceType) {
    assert_eq!(input.parse::<RemoteSourceType>().unwrap(), expected);
}

#[test]
fn source_type_parse_invalid() {
    assert!("graphql".parse::<RemoteSourceType>().is_err());
}

#[parameterized(
    document_store = { RemoteSourceType::DocumentStore, "transactions.json", "transactions/7.json" },
    table = { RemoteSourceType::TableRestBackend, "transactions", "transactions/7" },
    generic = { RemoteSourceType::GenericRestApi, "transactions", "transactions/7" },
)]
fn dialect_paths(source: RemoteSourceType, collection: &str, record: &str) {
    let dialect = source.dialect(&RemoteSettings::default());
    assert_eq!(dialect.source_type(), source);
    assert_eq!(dialect.collection_path(), collection);
    assert_eq!(dialect.record_path(7), record);
}

#[test]
fn document_store_auth_is_bearer() {
    let settings = RemoteSettings {
        source_type: RemoteSourceType::DocumentStore,
        credentials: Credentials {
            document_key: Some("doc-token".into()),
            ..Credentials::default()
        },
        ..RemoteSettings::default()
    };
    let headers = settings.source_type.dialect(&settings).auth_headers();
    assert_eq!(
        headers,
        vec![("Authorization".to_string(), "Bearer doc-token".to_string())]
    );
}

#[test]
fn table_auth_sends_api_key_and_bearer() {
    let settings = RemoteSettings {
        source_type: RemoteSourceType::TableRestBackend,
        credentials: Credentials {
            anon_key: Some("anon".into()),
            ..Credentials::default()
        },
        ..RemoteSettings::default()
    };
    let headers = settings.source_type.dialect(&settings).auth_headers();
    assert_eq!(
        headers,
        vec![
            ("apikey".to_string(), "anon".to_string()),
            ("Authorization".to_string(), "Bearer anon".to_string()),
        ]
    );
}

#[test]
fn table_auth_falls_back_to_api_key() {
    let settings = RemoteSettings {
        source_type: RemoteSourceType::TableRestBackend,
        api_key: Some("shared".into()),
        ..RemoteSettings::default()
    };
    let headers = settings.source_type.dialect(&settings).auth_headers();
    assert_eq!(headers[0], ("apikey".to_string(), "shared".to_string()));
}

#[test]
fn generic_auth_api_key_and_basic() {
    let settings = RemoteSettings {
        source_type: RemoteSourceType::GenericRestApi,
        api_key: Some("k123".into()),
        credentials: Credentials {
            username: Some("ann".into()),
            password: Some("pw".into()),
            ..Credentials::default()
        },
        ..RemoteSettings::default()
    };
    let headers = settings.source_type.dialect(&settings).auth_headers();
    assert_eq!(
        headers,
        vec![
            ("X-API-Key".to_string(), "k123".to_string()),
            // base64("ann:pw")
            ("Authorization".to_string(), "Basic YW5uOnB3".to_string()),
        ]
    );
}

#[test]
fn generic_auth_without_credentials_is_empty() {
    let dialect = GenericRestDialect::new(None, None);
    assert!(dialect.auth_headers().is_empty());
}

#[test]
fn document_store_decodes_keyed_object() {
    let body = format!(r#"{{"12": {RECORD}, "3": {RECORD}}}"#);
    let txs = DocumentStoreDialect::new(None).decode_list(&body).unwrap();

    let ids: Vec<i64> = txs.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![3, 12]);
    assert_eq!(txs[0].description, "coffee");
}

#[test]
fn document_store_skips_non_numeric_keys_and_nulls() {
    let body = format!(r#"{{"-Nabc": {RECORD}, "4": null, "5": {RECORD}}}"#);
    let txs = DocumentStoreDialect::new(None).decode_list(&body).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].id, 5);
}

#[parameterized(
    null = { "null" },
    empty_body = { "" },
    empty_object = { "{}" },
)]
fn document_store_empty_collections(body: &str) {
    let txs = DocumentStoreDialect::new(None).decode_list(body).unwrap();
    assert!(txs.is_empty());
}

#[test]
fn document_store_decodes_dense_array() {
    let body = format!(r#"[null, {RECORD}, null, {RECORD}]"#);
    let txs = DocumentStoreDialect::new(None).decode_list(&body).unwrap();
    let ids: Vec<i64> = txs.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn document_store_record_null_is_missing() {
    let dialect = DocumentStoreDialect::new(None);
    assert_eq!(dialect.decode_record(9, "null").unwrap(), None);
    assert_eq!(dialect.decode_record(9, RECORD).unwrap().unwrap().id, 9);
}

#[test]
fn document_store_created_id_from_name() {
    let dialect = DocumentStoreDialect::new(None);
    assert_eq!(dialect.decode_created_id(r#"{"name":"31"}"#).unwrap(), 31);
    assert!(matches!(
        dialect.decode_created_id(r#"{"name":"-NxYz"}"#),
        Err(RemoteFailure::Parse(_))
    ));
}

#[test]
fn array_dialects_decode_list() {
    let body = r#"[{"id": 2, "type":"INCOME","date":0,"amount":5}]"#;
    for dialect in [
        Box::new(TableRestDialect::new(None)) as Box<dyn RemoteDialect>,
        Box::new(GenericRestDialect::new(None, None)),
    ] {
        let txs = dialect.decode_list(body).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].id, 2);
        assert_eq!(txs[0].kind, TransactionType::Income);
    }
}

#[test]
fn array_dialect_rejects_object_listing() {
    let err = GenericRestDialect::new(None, None)
        .decode_list(r#"{"1": {}}"#)
        .unwrap_err();
    assert!(matches!(err, RemoteFailure::Parse(msg) if msg.contains("an object")));
}

#[test]
fn malformed_json_is_parse_failure() {
    let err = TableRestDialect::new(None).decode_list("[{").unwrap_err();
    assert!(matches!(err, RemoteFailure::Parse(_)));
}

#[test]
fn table_record_from_array() {
    let dialect = TableRestDialect::new(None);
    let body = format!("[{RECORD}]");
    assert_eq!(dialect.decode_record(4, &body).unwrap().unwrap().id, 4);
    assert_eq!(dialect.decode_record(4, "[]").unwrap(), None);
}

#[parameterized(
    array = { r#"[{"id": 15, "type":"EXPENSE"}]"# },
    object = { r#"{"id": 15}"# },
    string_id = { r#"[{"id": "15"}]"# },
)]
fn table_created_id(body: &str) {
    assert_eq!(TableRestDialect::new(None).decode_created_id(body).unwrap(), 15);
}

#[test]
fn table_created_id_empty_array_fails() {
    assert!(TableRestDialect::new(None).decode_created_id("[]").is_err());
}

#[parameterized(
    bare_number = { "23" },
    bare_string = { r#""23""# },
    object = { r#"{"id": 23, "type": "EXPENSE"}"# },
    object_string = { r#"{"id": "23"}"# },
)]
fn generic_created_id(body: &str) {
    assert_eq!(
        GenericRestDialect::new(None, None)
            .decode_created_id(body)
            .unwrap(),
        23
    );
}

#[test]
fn generic_created_id_missing_fails() {
    assert!(GenericRestDialect::new(None, None)
        .decode_created_id(r#"{"ok": true}"#)
        .is_err());
}

#[test]
fn table_update_is_patch_and_add_requests_representation() {
    let dialect = TableRestDialect::new(None);
    assert_eq!(dialect.update_method(), Method::Patch);
    assert_eq!(
        dialect.add_headers(),
        vec![("Prefer".to_string(), "return=representation".to_string())]
    );
}

#[test]
fn upsert_plans_preserve_id() {
    let tx = sample(8);

    let doc = DocumentStoreDialect::new(None).upsert_plan(&tx).unwrap();
    assert_eq!(doc.method, Method::Put);
    assert_eq!(doc.path, "transactions/8.json");

    let table = TableRestDialect::new(None).upsert_plan(&tx).unwrap();
    assert_eq!(table.method, Method::Post);
    assert_eq!(table.path, "transactions");
    assert_eq!(table.body.unwrap()["id"], 8);
    assert!(table.headers[0].1.contains("merge-duplicates"));

    let generic = GenericRestDialect::new(None, None).upsert_plan(&tx).unwrap();
    assert_eq!(generic.method, Method::Put);
    assert_eq!(generic.path, "transactions/8");
}
