//! In-memory [`Backend`] for tests.
//!
//! Responses are queued per endpoint as JSON and decoded through the same
//! wire types the HTTP client uses. An endpoint with nothing queued answers
//! `{}`. Every call is recorded, and calls can be held open to exercise the
//! busy gate.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use crate::backend::Backend;
use crate::error::ClientError;
use crate::types::{AnalysisKind, DocumentRef};
use crate::wire::{
    AnalysisPayload, DocumentListPayload, Endpoint, MultiQueryBody, MultiQueryPayload,
    SingleQueryBody, SingleQueryPayload, TranslateBody, TranslatePayload, TranslatedQueryBody,
    TranslatedQueryPayload, UploadPayload,
};

/// A request received by [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Probe,
    ListDocuments,
    Upload { file_name: String, size: usize },
    QuerySingle(SingleQueryBody),
    QueryMultiple(MultiQueryBody),
    QueryTranslated(TranslatedQueryBody),
    Translate(TranslateBody),
    Analyze { document: DocumentRef, kind: AnalysisKind },
    BatchAnalyze { document: DocumentRef },
}

impl BackendCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            BackendCall::Probe => Endpoint::Root,
            BackendCall::ListDocuments => Endpoint::ListDocuments,
            BackendCall::Upload { .. } => Endpoint::Upload,
            BackendCall::QuerySingle(_) => Endpoint::QuerySingle,
            BackendCall::QueryMultiple(_) => Endpoint::QueryMultiple,
            BackendCall::QueryTranslated(_) => Endpoint::QueryTranslated,
            BackendCall::Translate(_) => Endpoint::Translate,
            BackendCall::Analyze { .. } => Endpoint::Analyze,
            BackendCall::BatchAnalyze { .. } => Endpoint::BatchAnalyze,
        }
    }
}

type Queue = VecDeque<Result<Value, ClientError>>;

pub struct MockBackend {
    base_url: String,
    responses: Mutex<HashMap<Endpoint, Queue>>,
    calls: Mutex<Vec<BackendCall>>,
    reachable: AtomicBool,
    held: watch::Sender<bool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    pub fn new() -> Self {
        let (held, _) = watch::channel(false);
        Self {
            base_url: "http://localhost:8000".to_string(),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            reachable: AtomicBool::new(true),
            held,
        }
    }

    /// A reachable backend whose next document listing returns `names`.
    pub fn with_documents(names: &[&str]) -> Self {
        let backend = Self::new();
        backend.queue_json(
            Endpoint::ListDocuments,
            serde_json::json!({ "pdfs": names }),
        );
        backend
    }

    /// Queue the JSON body returned by the next call to `endpoint`.
    pub fn queue_json(&self, endpoint: Endpoint, body: Value) {
        lock(&self.responses)
            .entry(endpoint)
            .or_default()
            .push_back(Ok(body));
    }

    /// Queue a failure for the next call to `endpoint`.
    pub fn queue_error(&self, endpoint: Endpoint, error: ClientError) {
        lock(&self.responses)
            .entry(endpoint)
            .or_default()
            .push_back(Err(error));
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Keep every subsequent call pending until [`MockBackend::release`].
    pub fn hold(&self) {
        self.held.send_replace(true);
    }

    pub fn release(&self) {
        self.held.send_replace(false);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Calls made to `endpoint`, in order.
    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<BackendCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.endpoint() == endpoint)
            .cloned()
            .collect()
    }

    async fn respond<T>(&self, call: BackendCall) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Default,
    {
        let endpoint = call.endpoint();
        lock(&self.calls).push(call);

        let mut held = self.held.subscribe();
        // The sender lives as long as `self`, so this only ends on release.
        let _ = held.wait_for(|held| !*held).await;

        let next = lock(&self.responses)
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        match next {
            None => Ok(T::default()),
            Some(Ok(value)) => {
                serde_json::from_value(value).map_err(|e| ClientError::ResponseParse {
                    message: format!("Invalid mock payload for {}: {}", endpoint.path(), e),
                })
            }
            Some(Err(err)) => Err(err),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn probe(&self, _timeout: Duration) -> Result<(), ClientError> {
        lock(&self.calls).push(BackendCall::Probe);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(ClientError::Network {
                message: "connection refused".into(),
            });
        }
        let next = lock(&self.responses)
            .get_mut(&Endpoint::Root)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Err(err)) => Err(err),
            _ => Ok(()),
        }
    }

    async fn list_documents(&self) -> Result<DocumentListPayload, ClientError> {
        self.respond(BackendCall::ListDocuments).await
    }

    async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadPayload, ClientError> {
        self.respond(BackendCall::Upload {
            file_name: file_name.to_string(),
            size: bytes.len(),
        })
        .await
    }

    async fn query_single(&self, body: SingleQueryBody) -> Result<SingleQueryPayload, ClientError> {
        self.respond(BackendCall::QuerySingle(body)).await
    }

    async fn query_multiple(&self, body: MultiQueryBody) -> Result<MultiQueryPayload, ClientError> {
        self.respond(BackendCall::QueryMultiple(body)).await
    }

    async fn query_translated(
        &self,
        body: TranslatedQueryBody,
    ) -> Result<TranslatedQueryPayload, ClientError> {
        self.respond(BackendCall::QueryTranslated(body)).await
    }

    async fn translate(&self, body: TranslateBody) -> Result<TranslatePayload, ClientError> {
        self.respond(BackendCall::Translate(body)).await
    }

    async fn analyze(
        &self,
        document: &DocumentRef,
        kind: AnalysisKind,
    ) -> Result<AnalysisPayload, ClientError> {
        self.respond(BackendCall::Analyze {
            document: document.clone(),
            kind,
        })
        .await
    }

    async fn batch_analyze(&self, document: &DocumentRef) -> Result<AnalysisPayload, ClientError> {
        self.respond(BackendCall::BatchAnalyze {
            document: document.clone(),
        })
        .await
    }
}
