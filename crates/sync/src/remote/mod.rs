// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote backend client.
//!
//! Presents one CRUD surface over three backend dialects.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ RemoteClient │────►│  Transport  │────►│   Backend   │
//! │              │◄────│   (trait)   │◄────│  (HTTP/JSON)│
//! └──────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Dialect    │  (paths, auth, body encoding)
//! │   (trait)    │
//! └──────────────┘
//! ```
//!
//! The client never retries. Failures surface as [`RemoteFailure`] and the
//! caller decides whether to queue the work.

mod dialect;
mod transport;

pub use dialect::{
    DocumentStoreDialect, GenericRestDialect, RemoteDialect, RemoteSourceType, RequestPlan,
    TableRestDialect, COLLECTION,
};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError,
    TransportResult,
};

use std::sync::Arc;

use serde_json::Value;
use tally_core::{NewTransaction, Transaction};

use crate::config::Credentials;

/// Error type for remote operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteFailure {
    /// No base URL was configured; every call fails.
    #[error("remote backend is not configured: no base URL")]
    NotConfigured,

    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The backend answered with a non-2xx status.
    #[error("remote returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be understood.
    #[error("malformed remote response: {0}")]
    Parse(String),
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteFailure>;

/// Connection and authentication settings for the remote backend.
///
/// Credentials are passed through to the dialect untouched.
#[derive(Debug, Clone, Default)]
pub struct RemoteSettings {
    pub source_type: RemoteSourceType,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub credentials: Credentials,
}

/// Uniform CRUD client over the configured backend dialect.
pub struct RemoteClient {
    base_url: Option<String>,
    dialect: Box<dyn RemoteDialect>,
    transport: Arc<dyn HttpTransport>,
}

impl RemoteClient {
    /// Create a client for the configured dialect.
    ///
    /// A missing or blank base URL still yields a client; its calls all
    /// fail with [`RemoteFailure::NotConfigured`].
    pub fn new(settings: &RemoteSettings, transport: Arc<dyn HttpTransport>) -> Self {
        let dialect = settings.source_type.dialect(settings);
        RemoteClient::with_dialect(settings.base_url.clone(), dialect, transport)
    }

    /// Create a client with an explicit dialect.
    pub fn with_dialect(
        base_url: Option<String>,
        dialect: Box<dyn RemoteDialect>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        RemoteClient {
            base_url,
            dialect,
            transport,
        }
    }

    /// True if a base URL is set.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn source_type(&self) -> RemoteSourceType {
        self.dialect.source_type()
    }

    fn url(&self, path: &str) -> RemoteResult<String> {
        let base = self.base_url.as_ref().ok_or(RemoteFailure::NotConfigured)?;
        Ok(format!("{base}/{path}"))
    }

    /// Send a request and return the response, whatever its status.
    async fn send(
        &self,
        method: Method,
        path: &str,
        extra_headers: Vec<(String, String)>,
        body: Option<Value>,
    ) -> RemoteResult<HttpResponse> {
        let url = self.url(path)?;
        let mut headers = self.dialect.auth_headers();
        headers.extend(extra_headers);

        tracing::debug!("{} {}", method, url);
        let response = self
            .transport
            .execute(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;
        tracing::debug!("{} {} -> {}", method, path, response.status);
        Ok(response)
    }

    /// Send a request, treating any non-2xx status as a failure.
    async fn send_ok(
        &self,
        method: Method,
        path: &str,
        extra_headers: Vec<(String, String)>,
        body: Option<Value>,
    ) -> RemoteResult<HttpResponse> {
        let response = self.send(method, path, extra_headers, body).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(status_failure(response))
        }
    }

    /// Fetch every remote transaction.
    pub async fn get_all(&self) -> RemoteResult<Vec<Transaction>> {
        let path = self.dialect.collection_path();
        let response = self.send_ok(Method::Get, &path, Vec::new(), None).await?;
        self.dialect.decode_list(&response.body)
    }

    /// Fetch one transaction. Not-found is `None`, not a failure.
    pub async fn get_by_id(&self, id: i64) -> RemoteResult<Option<Transaction>> {
        let path = self.dialect.record_path(id);
        let response = self.send(Method::Get, &path, Vec::new(), None).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(status_failure(response));
        }
        self.dialect.decode_record(id, &response.body)
    }

    /// Create a transaction and return the id the backend assigned.
    pub async fn add(&self, new: &NewTransaction) -> RemoteResult<i64> {
        let body = serde_json::to_value(new).map_err(|e| RemoteFailure::Parse(e.to_string()))?;
        let path = self.dialect.collection_path();
        let response = self
            .send_ok(Method::Post, &path, self.dialect.add_headers(), Some(body))
            .await?;
        self.dialect.decode_created_id(&response.body)
    }

    /// Overwrite a transaction by id.
    ///
    /// Returns false if the backend reports the record does not exist.
    pub async fn update(&self, tx: &Transaction) -> RemoteResult<bool> {
        let body = serde_json::to_value(tx).map_err(|e| RemoteFailure::Parse(e.to_string()))?;
        let path = self.dialect.record_path(tx.id);
        let response = self
            .send(self.dialect.update_method(), &path, Vec::new(), Some(body))
            .await?;
        success_or_missing(response)
    }

    /// Delete a transaction by id.
    ///
    /// Returns false if the backend reports the record does not exist.
    pub async fn delete(&self, id: i64) -> RemoteResult<bool> {
        let path = self.dialect.record_path(id);
        let response = self.send(Method::Delete, &path, Vec::new(), None).await?;
        success_or_missing(response)
    }

    /// Create or replace a transaction under its local id.
    pub async fn upsert(&self, tx: &Transaction) -> RemoteResult<()> {
        let plan = self.dialect.upsert_plan(tx)?;
        self.send_ok(plan.method, &plan.path, plan.headers, plan.body)
            .await?;
        Ok(())
    }
}

fn status_failure(response: HttpResponse) -> RemoteFailure {
    RemoteFailure::Status {
        status: response.status,
        body: response.body,
    }
}

fn success_or_missing(response: HttpResponse) -> RemoteResult<bool> {
    if response.is_success() {
        Ok(true)
    } else if response.is_not_found() {
        Ok(false)
    } else {
        Err(status_failure(response))
    }
}


#[cfg(test)]
mod dialect_tests;
