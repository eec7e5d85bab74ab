// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tally_core::{NewTransaction, Transaction, TransactionType};
use tokio::sync::Notify;

use crate::remote::{
    GenericRestDialect, HttpRequest, HttpResponse, HttpTransport, Method, RemoteClient,
    TransportError, TransportResult, COLLECTION,
};

/// In-memory generic REST backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    records: Arc<Mutex<BTreeMap<i64, Transaction>>>,
    failing: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    slow_amount: Arc<Mutex<Option<(f64, Duration)>>>,
    list_gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl FakeBackend {
    pub const BASE_URL: &'static str = "http://fake.test";

    pub fn new() -> Self {
        Self::default()
    }

    /// Client speaking the generic REST dialect to this backend.
    pub fn client(&self) -> RemoteClient {
        RemoteClient::with_dialect(
            Some(Self::BASE_URL.to_string()),
            Box::new(GenericRestDialect::new(None, None)),
            Arc::new(self.clone()),
        )
    }

    /// Every request fails at the network level.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Reads work, writes answer 503.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Writes carrying `amount` take `delay` before the backend applies them.
    pub fn delay_writes_of(&self, amount: f64, delay: Duration) {
        *self.slow_amount.lock().unwrap() = Some((amount, delay));
    }

    /// List reads wait until the returned gate is notified.
    pub fn hold_list_reads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn write_delay(&self, request: &HttpRequest) -> Option<Duration> {
        let (amount, delay) = (*self.slow_amount.lock().unwrap())?;
        let body = decode(request)?;
        (body.amount == amount).then_some(delay)
    }

    fn list_gate(&self, request: &HttpRequest) -> Option<Arc<Notify>> {
        let is_list = request.method == Method::Get
            && request.url.trim_end_matches('/').ends_with(COLLECTION);
        if !is_list {
            return None;
        }
        self.list_gate.lock().unwrap().clone()
    }

    pub fn seed(&self, tx: Transaction) {
        self.records.lock().unwrap().insert(tx.id, tx);
    }

    pub fn get(&self, id: i64) -> Option<Transaction> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    pub fn records(&self) -> Vec<Transaction> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Writes the backend accepted.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let Some(path) = request.url.strip_prefix(Self::BASE_URL) else {
            return HttpResponse::new(404, "");
        };
        let path = path.trim_start_matches('/');
        let id = match path.strip_prefix(COLLECTION) {
            Some("") => None,
            Some(rest) => match rest.trim_start_matches('/').parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => return HttpResponse::new(404, ""),
            },
            None => return HttpResponse::new(404, ""),
        };

        if request.method != Method::Get && self.fail_writes.load(Ordering::SeqCst) {
            return HttpResponse::new(503, "writes unavailable");
        }

        let mut records = self.records.lock().unwrap();
        match (request.method, id) {
            (Method::Get, None) => {
                let all: Vec<_> = records.values().collect();
                HttpResponse::new(200, &serde_json::to_string(&all).unwrap())
            }
            (Method::Get, Some(id)) => match records.get(&id) {
                Some(tx) => HttpResponse::new(200, &serde_json::to_string(tx).unwrap()),
                None => HttpResponse::new(404, ""),
            },
            (Method::Post, None) => {
                let Some(mut tx) = decode(request) else {
                    return HttpResponse::new(400, "bad body");
                };
                tx.id = records.keys().next_back().copied().unwrap_or(0) + 1;
                let id = tx.id;
                records.insert(id, tx);
                self.writes.fetch_add(1, Ordering::SeqCst);
                HttpResponse::new(201, &format!(r#"{{"id": {id}}}"#))
            }
            (Method::Put, Some(id)) | (Method::Patch, Some(id)) => {
                let Some(mut tx) = decode(request) else {
                    return HttpResponse::new(400, "bad body");
                };
                if request.method == Method::Patch && !records.contains_key(&id) {
                    return HttpResponse::new(404, "");
                }
                tx.id = id;
                records.insert(id, tx);
                self.writes.fetch_add(1, Ordering::SeqCst);
                HttpResponse::new(200, "")
            }
            (Method::Delete, Some(id)) => match records.remove(&id) {
                Some(_) => {
                    self.writes.fetch_add(1, Ordering::SeqCst);
                    HttpResponse::new(204, "")
                }
                None => HttpResponse::new(404, ""),
            },
            _ => HttpResponse::new(405, ""),
        }
    }
}

fn decode(request: &HttpRequest) -> Option<Transaction> {
    serde_json::from_value(request.body.clone()?).ok()
}

impl HttpTransport for FakeBackend {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            self.requests.fetch_add(1, Ordering::SeqCst);
            // Suspend like a real network call so concurrent callers interleave.
            tokio::task::yield_now().await;
            if let Some(delay) = self.write_delay(&request) {
                tokio::time::sleep(delay).await;
            }
            if let Some(gate) = self.list_gate(&request) {
                gate.notified().await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(TransportError::RequestFailed("backend unreachable".into()));
            }
            Ok(self.handle(&request))
        })
    }
}

/// A transaction with a fixed date.
pub fn make_tx(id: i64, kind: TransactionType, amount: f64, description: &str) -> Transaction {
    NewTransaction::new(
        kind,
        amount,
        description,
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
    )
    .with_id(id)
}

pub fn expense(id: i64, amount: f64) -> Transaction {
    make_tx(id, TransactionType::Expense, amount, "expense")
}
