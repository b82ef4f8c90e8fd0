//! Client session: one place that owns selection, registry, health, dispatcher
//! and the last results shown to the user.
//!
//! A failed operation records its message in [`Session::last_error`] and leaves
//! every previous result in place.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::{self, Backend};
use crate::config::{DocQueryConfig, TranslationConfig};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::health::HealthMonitor;
use crate::http::HttpBackend;
use crate::registry::DocumentRegistry;
use crate::selection::SelectionState;
use crate::translation::TranslationCoordinator;
use crate::types::{
    AnalysisKind, AnalysisResult, ConnectionStatus, DocumentRef, LanguagePair, QueryOutcome,
    TranslationOutcome, UploadReceipt,
};

/// What [`Session::start`] found.
#[derive(Debug)]
pub struct StartupReport {
    pub status: ConnectionStatus,
    /// Number of documents listed, or the refresh failure.
    pub documents: Result<usize>,
}

pub struct Session {
    config: DocQueryConfig,
    backend: Arc<dyn Backend>,
    dispatcher: Dispatcher,
    registry: DocumentRegistry,
    health: HealthMonitor,
    selection: SelectionState,
    translation: TranslationConfig,
    last_outcome: Option<QueryOutcome>,
    last_analysis: Option<(DocumentRef, AnalysisResult)>,
    last_translation: Option<TranslationOutcome>,
    last_error: Option<String>,
}

impl Session {
    /// Build a session talking HTTP to the configured backend.
    pub fn connect(config: DocQueryConfig) -> Result<Self> {
        let backend = HttpBackend::from_config(&config.backend)?;
        info!(base_url = backend.base_url(), "Backend resolved");
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: DocQueryConfig, backend: Arc<dyn Backend>) -> Self {
        let dispatcher = Dispatcher::new(backend.clone())
            .with_request_timeout(config.backend.request_timeout());
        let registry = DocumentRegistry::new(backend.clone());
        let health = HealthMonitor::new(backend.clone(), config.backend.probe_timeout());
        let translation = config.translation;
        Self {
            config,
            backend,
            dispatcher,
            registry,
            health,
            selection: SelectionState::new(),
            translation,
            last_outcome: None,
            last_analysis: None,
            last_translation: None,
            last_error: None,
        }
    }

    /// Probe the backend and load the document list concurrently.
    pub async fn start(&mut self) -> StartupReport {
        let (status, refreshed) = tokio::join!(self.health.probe(), self.registry.refresh());
        let documents = match refreshed {
            Ok(docs) => {
                self.prune_stale().await;
                Ok(docs.len())
            }
            Err(err) => {
                warn!(error = %err, "Initial document listing failed");
                Err(err)
            }
        };
        StartupReport { status, documents }
    }

    pub fn config(&self) -> &DocQueryConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn status(&self) -> ConnectionStatus {
        self.health.status()
    }

    pub async fn probe(&self) -> ConnectionStatus {
        self.health.probe().await
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn translation(&self) -> &TranslationConfig {
        &self.translation
    }

    pub fn select_single(&mut self, document: DocumentRef) {
        self.selection.select_single(document);
    }

    pub fn toggle_multi(&mut self, document: DocumentRef) -> bool {
        self.selection.toggle_multi(document)
    }

    pub fn set_search_all(&mut self, on: bool) {
        self.selection.set_search_all(on);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn set_translation_enabled(&mut self, enabled: bool) {
        self.translation.enabled = enabled;
    }

    pub fn set_languages(&mut self, languages: LanguagePair) {
        self.translation.source_lang = languages.source;
        self.translation.target_lang = languages.target;
    }

    /// Look a name up in the registry, ignoring ASCII case when there is no
    /// exact match.
    pub async fn find_document(&self, name: &str) -> Option<DocumentRef> {
        let documents = self.registry.documents().await;
        let trimmed = name.trim();
        documents
            .iter()
            .find(|d| d.as_str() == name)
            .or_else(|| documents.iter().find(|d| d.as_str() == trimmed))
            .or_else(|| {
                documents
                    .iter()
                    .find(|d| d.as_str().eq_ignore_ascii_case(trimmed))
            })
            .cloned()
    }

    pub fn base_url(&self) -> &str {
        self.backend.base_url()
    }

    pub fn view_url(&self, document: &DocumentRef, page: u32) -> String {
        backend::view_url(self.backend.base_url(), document, page)
    }

    pub fn last_outcome(&self) -> Option<&QueryOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn last_analysis(&self) -> Option<&(DocumentRef, AnalysisResult)> {
        self.last_analysis.as_ref()
    }

    pub fn last_translation(&self) -> Option<&TranslationOutcome> {
        self.last_translation.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(err) => self.last_error = Some(err.user_message()),
        }
        result
    }

    /// Submit a question for the current selection. With the translation
    /// toggle on, the question goes through the translation coordinator.
    pub async fn ask(&mut self, question: &str) -> Result<QueryOutcome> {
        let result = if self.translation.enabled {
            TranslationCoordinator::new(&self.dispatcher, self.translation)
                .translate_and_query(question, &self.selection)
                .await
        } else {
            self.dispatcher
                .submit_query(question, &self.selection, &self.translation)
                .await
        };
        if let Ok(outcome) = &result {
            self.last_outcome = Some(outcome.clone());
        }
        self.record(result)
    }

    /// Translate free text with the session's language pair.
    pub async fn translate(&mut self, text: &str) -> Result<TranslationOutcome> {
        let result = TranslationCoordinator::new(&self.dispatcher, self.translation)
            .translate_only(text)
            .await;
        if let Ok(outcome) = &result {
            self.last_translation = Some(outcome.clone());
        }
        self.record(result)
    }

    pub async fn analyze(
        &mut self,
        document: &DocumentRef,
        kind: AnalysisKind,
    ) -> Result<AnalysisResult> {
        let result = self.dispatcher.submit_analysis(document, kind).await;
        if let Ok(analysis) = &result {
            self.last_analysis = Some((document.clone(), analysis.clone()));
        }
        self.record(result)
    }

    /// Upload a PDF, then reload the document list.
    ///
    /// A failed reload after a successful upload is logged, not returned.
    pub async fn upload(&mut self, path: &Path) -> Result<UploadReceipt> {
        let result = self.dispatcher.upload(path).await;
        let result = self.record(result);
        if result.is_ok()
            && let Err(err) = self.refresh().await
        {
            warn!(error = %err, "Document list refresh after upload failed");
        }
        result
    }

    /// Reload the document list and drop selections it no longer contains.
    pub async fn refresh(&mut self) -> Result<Vec<DocumentRef>> {
        let documents = self.registry.refresh().await?;
        self.prune_stale().await;
        Ok(documents)
    }

    async fn prune_stale(&mut self) -> Vec<DocumentRef> {
        let stale = self.registry.stale_in(&self.selection).await;
        if stale.is_empty() {
            return stale;
        }
        let removed = self.selection.retain(|doc| !stale.contains(doc));
        for doc in &removed {
            warn!(document = %doc, "Dropped selection of a document the backend no longer lists");
        }
        removed
    }
}
