// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend protocol dialects.
//!
//! Each supported backend differs in endpoint paths, authentication headers,
//! collection encoding, and how a created record's id comes back. A
//! [`RemoteDialect`] captures those differences so [`RemoteClient`] has one
//! call-site contract for all of them.
//!
//! [`RemoteClient`]: super::RemoteClient

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_core::Transaction;

use super::transport::Method;
use super::{RemoteFailure, RemoteResult, RemoteSettings};

/// Resource name of the transaction collection on every backend.
pub const COLLECTION: &str = "transactions";

/// Which backend protocol the remote speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteSourceType {
    /// Key-path document store; collections are id-keyed objects.
    #[serde(alias = "firebase")]
    DocumentStore,
    /// Table-based REST backend.
    #[serde(alias = "supabase")]
    TableRestBackend,
    /// Plain REST API returning JSON arrays.
    #[default]
    #[serde(alias = "rest_api")]
    GenericRestApi,
}

impl RemoteSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteSourceType::DocumentStore => "document_store",
            RemoteSourceType::TableRestBackend => "table_rest_backend",
            RemoteSourceType::GenericRestApi => "generic_rest_api",
        }
    }

    /// Build the dialect for this source type from the remote settings.
    pub fn dialect(&self, settings: &RemoteSettings) -> Box<dyn RemoteDialect> {
        let creds = &settings.credentials;
        match self {
            RemoteSourceType::DocumentStore => Box::new(DocumentStoreDialect::new(
                creds.document_key.clone().or_else(|| settings.api_key.clone()),
            )),
            RemoteSourceType::TableRestBackend => Box::new(TableRestDialect::new(
                creds.anon_key.clone().or_else(|| settings.api_key.clone()),
            )),
            RemoteSourceType::GenericRestApi => {
                let basic = match (&creds.username, &creds.password) {
                    (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
                    _ => None,
                };
                Box::new(GenericRestDialect::new(settings.api_key.clone(), basic))
            }
        }
    }
}

impl fmt::Display for RemoteSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RemoteSourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "document_store" | "firebase" => Ok(RemoteSourceType::DocumentStore),
            "table_rest_backend" | "supabase" => Ok(RemoteSourceType::TableRestBackend),
            "generic_rest_api" | "rest_api" => Ok(RemoteSourceType::GenericRestApi),
            _ => Err(format!(
                "invalid remote source type '{s}': expected document_store, table_rest_backend, or generic_rest_api"
            )),
        }
    }
}

/// A request shape chosen by a dialect, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Protocol conventions of one backend.
pub trait RemoteDialect: Send + Sync {
    fn source_type(&self) -> RemoteSourceType;

    /// Path of the transaction collection.
    fn collection_path(&self) -> String {
        COLLECTION.to_string()
    }

    /// Path of a single transaction.
    fn record_path(&self, id: i64) -> String {
        format!("{COLLECTION}/{id}")
    }

    /// Authentication headers sent with every request.
    fn auth_headers(&self) -> Vec<(String, String)>;

    /// Verb used to overwrite an existing record.
    fn update_method(&self) -> Method {
        Method::Put
    }

    /// Extra headers for a create request.
    fn add_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Create-or-replace a record under its own id.
    fn upsert_plan(&self, tx: &Transaction) -> RemoteResult<RequestPlan> {
        Ok(RequestPlan {
            method: Method::Put,
            path: self.record_path(tx.id),
            headers: Vec::new(),
            body: Some(encode(tx)?),
        })
    }

    /// Decode a collection listing.
    fn decode_list(&self, body: &str) -> RemoteResult<Vec<Transaction>> {
        let value = parse_body(body)?;
        match value {
            Value::Array(items) => items.into_iter().map(decode_transaction).collect(),
            other => Err(RemoteFailure::Parse(format!(
                "expected a JSON array of transactions, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Decode a single-record response for the given id.
    fn decode_record(&self, id: i64, body: &str) -> RemoteResult<Option<Transaction>> {
        match parse_body(body)? {
            Value::Null => Ok(None),
            value => decode_with_id(id, value).map(Some),
        }
    }

    /// Extract the id of a newly created record from the create response.
    fn decode_created_id(&self, body: &str) -> RemoteResult<i64>;
}

/// Key-path document store: `.json` suffix, id-keyed collections.
pub struct DocumentStoreDialect {
    token: Option<String>,
}

impl DocumentStoreDialect {
    pub fn new(token: Option<String>) -> Self {
        DocumentStoreDialect { token }
    }
}

impl RemoteDialect for DocumentStoreDialect {
    fn source_type(&self) -> RemoteSourceType {
        RemoteSourceType::DocumentStore
    }

    fn collection_path(&self) -> String {
        format!("{COLLECTION}.json")
    }

    fn record_path(&self, id: i64) -> String {
        format!("{COLLECTION}/{id}.json")
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        bearer(self.token.as_deref()).into_iter().collect()
    }

    fn decode_list(&self, body: &str) -> RemoteResult<Vec<Transaction>> {
        let mut txs = Vec::new();
        match parse_body(body)? {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    let Ok(id) = key.parse::<i64>() else {
                        tracing::warn!("skipping remote record with non-numeric key '{}'", key);
                        continue;
                    };
                    if value.is_null() {
                        continue;
                    }
                    txs.push(decode_with_id(id, value)?);
                }
            }
            // Dense integer keys come back as an array indexed by id.
            Value::Array(items) => {
                for (index, value) in items.into_iter().enumerate() {
                    if value.is_null() {
                        continue;
                    }
                    txs.push(decode_with_id(index as i64, value)?);
                }
            }
            other => {
                return Err(RemoteFailure::Parse(format!(
                    "expected an id-keyed object of transactions, got {}",
                    kind_of(&other)
                )))
            }
        }
        txs.sort_by_key(|t| t.id);
        Ok(txs)
    }

    fn decode_created_id(&self, body: &str) -> RemoteResult<i64> {
        let value = parse_body(body)?;
        value
            .get("name")
            .and_then(parse_id)
            .ok_or_else(|| RemoteFailure::Parse(format!("no numeric 'name' in create response: {body}")))
    }
}

/// Table-based REST backend: dual API-key and bearer auth, PATCH updates,
/// created rows echoed back as an array.
pub struct TableRestDialect {
    key: Option<String>,
}

impl TableRestDialect {
    pub fn new(key: Option<String>) -> Self {
        TableRestDialect { key }
    }
}

impl RemoteDialect for TableRestDialect {
    fn source_type(&self) -> RemoteSourceType {
        RemoteSourceType::TableRestBackend
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(key) = &self.key {
            headers.push(("apikey".to_string(), key.clone()));
        }
        headers.extend(bearer(self.key.as_deref()));
        headers
    }

    fn update_method(&self) -> Method {
        Method::Patch
    }

    fn add_headers(&self) -> Vec<(String, String)> {
        vec![("Prefer".to_string(), "return=representation".to_string())]
    }

    fn upsert_plan(&self, tx: &Transaction) -> RemoteResult<RequestPlan> {
        Ok(RequestPlan {
            method: Method::Post,
            path: self.collection_path(),
            headers: vec![(
                "Prefer".to_string(),
                "resolution=merge-duplicates,return=minimal".to_string(),
            )],
            body: Some(encode(tx)?),
        })
    }

    fn decode_record(&self, id: i64, body: &str) -> RemoteResult<Option<Transaction>> {
        match parse_body(body)? {
            Value::Null => Ok(None),
            Value::Array(rows) => match rows.into_iter().next() {
                Some(row) => decode_with_id(id, row).map(Some),
                None => Ok(None),
            },
            value => decode_with_id(id, value).map(Some),
        }
    }

    fn decode_created_id(&self, body: &str) -> RemoteResult<i64> {
        let value = parse_body(body)?;
        let row = match &value {
            Value::Array(rows) => rows.first(),
            Value::Object(_) => Some(&value),
            _ => None,
        };
        row.and_then(|r| r.get("id"))
            .and_then(parse_id)
            .ok_or_else(|| RemoteFailure::Parse(format!("no inserted row in create response: {body}")))
    }
}

/// Generic REST API: API-key header, optional basic auth, and a created id
/// returned either bare or inside an object.
pub struct GenericRestDialect {
    api_key: Option<String>,
    basic: Option<(String, String)>,
}

impl GenericRestDialect {
    pub fn new(api_key: Option<String>, basic: Option<(String, String)>) -> Self {
        GenericRestDialect { api_key, basic }
    }
}

impl RemoteDialect for GenericRestDialect {
    fn source_type(&self) -> RemoteSourceType {
        RemoteSourceType::GenericRestApi
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(key) = &self.api_key {
            headers.push(("X-API-Key".to_string(), key.clone()));
        }
        if let Some((user, pass)) = &self.basic {
            let encoded = BASE64.encode(format!("{user}:{pass}"));
            headers.push(("Authorization".to_string(), format!("Basic {encoded}")));
        }
        headers
    }

    fn decode_created_id(&self, body: &str) -> RemoteResult<i64> {
        let value = parse_body(body)?;
        parse_id(&value)
            .or_else(|| value.get("id").and_then(parse_id))
            .ok_or_else(|| RemoteFailure::Parse(format!("no id in create response: {body}")))
    }
}

fn bearer(token: Option<&str>) -> Option<(String, String)> {
    token.map(|t| ("Authorization".to_string(), format!("Bearer {t}")))
}

/// Accept an id given as a JSON number or a numeric string.
fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_body(body: &str) -> RemoteResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| RemoteFailure::Parse(e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> RemoteResult<Value> {
    serde_json::to_value(value).map_err(|e| RemoteFailure::Parse(e.to_string()))
}

fn decode_transaction(value: Value) -> RemoteResult<Transaction> {
    serde_json::from_value(value).map_err(|e| RemoteFailure::Parse(e.to_string()))
}

/// Decode a record whose id is known from its address rather than its body.
fn decode_with_id(id: i64, value: Value) -> RemoteResult<Transaction> {
    let mut tx = decode_transaction(value)?;
    tx.id = id;
    Ok(tx)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
