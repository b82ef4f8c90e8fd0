//! Document registry: the list of documents the backend currently holds.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::Result;
use crate::normalize;
use crate::selection::SelectionState;
use crate::types::DocumentRef;

pub struct DocumentRegistry {
    backend: Arc<dyn Backend>,
    documents: RwLock<Vec<DocumentRef>>,
}

impl DocumentRegistry {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Replace the list with the backend's. On failure the previous list stays.
    pub async fn refresh(&self) -> Result<Vec<DocumentRef>> {
        let payload = self.backend.list_documents().await?;
        let fresh = normalize::documents(payload);
        info!(count = fresh.len(), "Document list refreshed");
        *self.documents.write().await = fresh.clone();
        Ok(fresh)
    }

    pub async fn documents(&self) -> Vec<DocumentRef> {
        self.documents.read().await.clone()
    }

    pub async fn contains(&self, document: &DocumentRef) -> bool {
        self.documents.read().await.contains(document)
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Documents referenced by `selection` that the registry no longer lists.
    pub async fn stale_in(&self, selection: &SelectionState) -> Vec<DocumentRef> {
        let documents = self.documents.read().await;
        let stale: Vec<DocumentRef> = selection
            .referenced()
            .into_iter()
            .filter(|doc| !documents.contains(doc))
            .cloned()
            .collect();
        if !stale.is_empty() {
            debug!(count = stale.len(), "Selection references unknown documents");
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::mock::MockBackend;
    use crate::wire::Endpoint;
    use serde_json::json;

    #[tokio::test]
    async fn test_refresh_replaces_wholesale() {
        let mock = Arc::new(MockBackend::with_documents(&["a.pdf", "b.pdf"]));
        mock.queue_json(Endpoint::ListDocuments, json!({"documents": ["c.pdf"]}));
        let registry = DocumentRegistry::new(mock.clone());

        registry.refresh().await.unwrap();
        assert_eq!(registry.len().await, 2);
        registry.refresh().await.unwrap();
        assert_eq!(registry.documents().await, vec![DocumentRef::from("c.pdf")]);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_list() {
        let mock = Arc::new(MockBackend::with_documents(&["a.pdf"]));
        mock.queue_error(
            Endpoint::ListDocuments,
            ClientError::Network {
                message: "connection refused".into(),
            },
        );
        let registry = DocumentRegistry::new(mock.clone());
        registry.refresh().await.unwrap();
        assert!(registry.refresh().await.is_err());
        assert!(registry.contains(&DocumentRef::from("a.pdf")).await);
    }

    #[tokio::test]
    async fn test_stale_in_reports_missing_selection() {
        let mock = Arc::new(MockBackend::with_documents(&["a.pdf"]));
        let registry = DocumentRegistry::new(mock);
        registry.refresh().await.unwrap();

        let mut selection = SelectionState::new();
        selection.toggle_multi("a.pdf".into());
        selection.toggle_multi("deleted.pdf".into());
        assert_eq!(
            registry.stale_in(&selection).await,
            vec![DocumentRef::from("deleted.pdf")]
        );
    }
}
