//! Request dispatcher: the single-flight gate in front of the backend.
//!
//! Queries, analyses, standalone translations and uploads all pass through
//! [`Dispatcher`]. Each one claims the lifecycle with an atomic
//! `Idle -> Validating` step on a `watch` channel; a caller that finds any
//! other phase is rejected with [`DispatchError::Busy`] before anything else
//! happens. The claim is a guard that returns the lifecycle to `Idle` when
//! dropped, so every exit path releases it.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::TranslationConfig;
use crate::error::{ClientError, DispatchError, Result, ValidationError};
use crate::normalize;
use crate::selection::{SelectionState, resolve_mode};
use crate::types::{
    AnalysisKind, AnalysisResult, DocumentRef, LanguagePair, OperationPhase, QueryMode,
    QueryOutcome, QueryRequest, QueryView, TargetSet, TranslationOutcome, UploadReceipt,
};
use crate::wire::{MultiQueryBody, SingleQueryBody, TranslateBody, TranslatedQueryBody};

/// Claim on the operation lifecycle. Dropping it returns the phase to `Idle`.
struct PhaseGuard<'a> {
    phase: &'a watch::Sender<OperationPhase>,
}

impl PhaseGuard<'_> {
    fn advance(&self, next: OperationPhase) -> std::result::Result<(), DispatchError> {
        let current = *self.phase.borrow();
        if !current.can_transition_to(next) {
            return Err(DispatchError::InvalidStateTransition {
                from: current,
                to: next,
            });
        }
        debug!(from = %current, to = %next, "Operation phase transition");
        self.phase.send_replace(next);
        Ok(())
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(OperationPhase::Idle);
    }
}

/// Validate a question against the current selection and translation toggle.
///
/// Pure: builds the request that would be dispatched without touching the
/// backend or the busy gate.
pub fn prepare_query(
    question: &str,
    selection: &SelectionState,
    translation: &TranslationConfig,
) -> std::result::Result<QueryRequest, ValidationError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    let target = selection.target_set()?;
    let mode = resolve_mode(selection, translation.enabled)?;
    Ok(QueryRequest {
        question: question.to_string(),
        mode,
        target,
        languages: translation.enabled.then(|| translation.languages()),
    })
}

/// Single-flight dispatcher over a [`Backend`].
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    phase: watch::Sender<OperationPhase>,
    request_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (phase, _) = watch::channel(OperationPhase::Idle);
        Self {
            backend,
            phase,
            request_timeout: None,
        }
    }

    /// Bound query, analysis, translation and upload calls. Unset by default.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn phase(&self) -> OperationPhase {
        *self.phase.borrow()
    }

    pub fn is_busy(&self) -> bool {
        !self.phase().is_idle()
    }

    /// Observe lifecycle changes.
    pub fn subscribe(&self) -> watch::Receiver<OperationPhase> {
        self.phase.subscribe()
    }

    fn acquire(&self) -> std::result::Result<PhaseGuard<'_>, DispatchError> {
        let mut observed = OperationPhase::Idle;
        let acquired = self.phase.send_if_modified(|phase| {
            if phase.is_idle() {
                *phase = OperationPhase::Validating;
                true
            } else {
                observed = *phase;
                false
            }
        });
        if acquired {
            Ok(PhaseGuard { phase: &self.phase })
        } else {
            debug!(phase = %observed, "Rejected operation while busy");
            Err(DispatchError::Busy { phase: observed })
        }
    }

    /// Leave `Validating` after a local rejection.
    fn reject<T>(guard: &PhaseGuard<'_>, err: ValidationError) -> Result<T> {
        guard.advance(OperationPhase::Idle)?;
        debug!(error = %err, "Operation rejected by validation");
        Err(err.into())
    }

    /// Await exactly one backend call, moving through
    /// `AwaitingResponse -> {Rendering | ErrorDisplay}`.
    async fn await_backend<T, F>(&self, guard: &PhaseGuard<'_>, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ClientError>>,
    {
        guard.advance(OperationPhase::AwaitingResponse)?;
        let result = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ClientError::Timeout {
                    timeout_secs: limit.as_secs(),
                })),
            None => call.await,
        };
        match result {
            Ok(value) => {
                guard.advance(OperationPhase::Rendering)?;
                Ok(value)
            }
            Err(err) => {
                guard.advance(OperationPhase::ErrorDisplay)?;
                warn!(error = %err, "Backend call failed");
                Err(err.into())
            }
        }
    }

    /// Map a failed normalization into the error display phase.
    fn render<T>(guard: &PhaseGuard<'_>, result: std::result::Result<T, ClientError>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                guard.advance(OperationPhase::ErrorDisplay)?;
                warn!(error = %err, "Backend reported an error in its payload");
                Err(err.into())
            }
        }
    }

    /// Validate and submit a question for the current selection.
    pub async fn submit_query(
        &self,
        question: &str,
        selection: &SelectionState,
        translation: &TranslationConfig,
    ) -> Result<QueryOutcome> {
        let guard = self.acquire()?;
        let request = match prepare_query(question, selection, translation) {
            Ok(request) => request,
            Err(err) => return Self::reject(&guard, err),
        };
        guard.advance(OperationPhase::Dispatching)?;

        info!(
            mode = %request.mode,
            documents = request.target.len_hint().unwrap_or(0),
            search_all = request.target.search_all(),
            "Submitting query"
        );

        let question = request.question.clone();
        let (view, translation_summary) = match (request.mode, &request.target) {
            (QueryMode::Translated(scope), _) => {
                let languages = request.languages.unwrap_or_else(|| translation.languages());
                let body = TranslatedQueryBody {
                    question,
                    filenames: request.target.filenames(),
                    search_all: request.target.search_all(),
                    source_lang: languages.source.code().to_string(),
                    target_lang: languages.target.code().to_string(),
                };
                let payload = self
                    .await_backend(&guard, self.backend.query_translated(body))
                    .await?;
                normalize::translated(payload, scope)
            }
            (_, TargetSet::Single(doc)) => {
                let body = SingleQueryBody {
                    question,
                    filename: doc.as_str().to_string(),
                };
                let payload = self
                    .await_backend(&guard, self.backend.query_single(body))
                    .await?;
                (QueryView::Single(normalize::single(payload)), None)
            }
            (_, TargetSet::Explicit(_) | TargetSet::All) => {
                let body = MultiQueryBody {
                    question,
                    filenames: request.target.filenames(),
                    search_all: request.target.search_all(),
                };
                let payload = self
                    .await_backend(&guard, self.backend.query_multiple(body))
                    .await?;
                (QueryView::Multi(normalize::multi(payload)), None)
            }
        };

        let outcome = normalize::outcome(&request, view, translation_summary);
        debug!(matches = outcome.view.total_matches(), "Query completed");
        guard.advance(OperationPhase::Idle)?;
        Ok(outcome)
    }

    /// Run one analysis over `document`. [`AnalysisKind::All`] uses the batch route.
    pub async fn submit_analysis(
        &self,
        document: &DocumentRef,
        kind: AnalysisKind,
    ) -> Result<AnalysisResult> {
        let guard = self.acquire()?;
        guard.advance(OperationPhase::Dispatching)?;
        info!(document = %document, kind = %kind, "Submitting analysis");

        let payload = match kind {
            AnalysisKind::All => {
                self.await_backend(&guard, self.backend.batch_analyze(document))
                    .await?
            }
            _ => {
                self.await_backend(&guard, self.backend.analyze(document, kind))
                    .await?
            }
        };

        let result = Self::render(&guard, normalize::analysis(payload, kind))?;
        guard.advance(OperationPhase::Idle)?;
        Ok(result)
    }

    /// Translate free text without touching query state.
    pub async fn submit_translation(
        &self,
        text: &str,
        languages: LanguagePair,
    ) -> Result<TranslationOutcome> {
        let guard = self.acquire()?;
        if text.trim().is_empty() {
            return Self::reject(&guard, ValidationError::EmptyText);
        }
        guard.advance(OperationPhase::Dispatching)?;
        info!(languages = %languages, "Submitting translation");

        let body = TranslateBody {
            text: text.to_string(),
            source_lang: languages.source.code().to_string(),
            target_lang: languages.target.code().to_string(),
        };
        let payload = self
            .await_backend(&guard, self.backend.translate(body))
            .await?;
        let outcome = normalize::translation(payload);
        guard.advance(OperationPhase::Idle)?;
        Ok(outcome)
    }

    /// Upload a local PDF. Only files ending in `.pdf` are accepted.
    pub async fn upload(&self, path: &Path) -> Result<UploadReceipt> {
        let guard = self.acquire()?;

        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        let file_name = path.file_name().and_then(|name| name.to_str());
        let file_name = match (is_pdf, file_name) {
            (true, Some(name)) => name.to_string(),
            _ => {
                return Self::reject(
                    &guard,
                    ValidationError::UnsupportedFileType {
                        path: path.to_path_buf(),
                    },
                );
            }
        };
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Self::reject(
                &guard,
                ValidationError::FileNotFound {
                    path: path.to_path_buf(),
                },
            );
        }

        guard.advance(OperationPhase::Dispatching)?;
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed to read upload");
                return Err(err.into());
            }
        };
        info!(file_name = file_name.as_str(), size = bytes.len(), "Uploading document");

        let payload = self
            .await_backend(&guard, self.backend.upload_document(&file_name, bytes))
            .await?;
        guard.advance(OperationPhase::Idle)?;

        let message = if payload.message.trim().is_empty() {
            format!("{file_name} uploaded")
        } else {
            payload.message
        };
        Ok(UploadReceipt {
            document: DocumentRef::from(file_name),
            message,
        })
    }
}
