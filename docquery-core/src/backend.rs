//! Backend abstraction.
//!
//! [`Backend`] is the seam between orchestration and transport: the HTTP
//! client implements it against the real service, [`crate::mock::MockBackend`]
//! implements it for tests. Every method returns the raw wire payload; the
//! dispatcher normalizes it.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{AnalysisKind, DocumentRef};
use crate::wire::{
    AnalysisPayload, DocumentListPayload, MultiQueryBody, MultiQueryPayload, SingleQueryBody,
    SingleQueryPayload, TranslateBody, TranslatePayload, TranslatedQueryBody,
    TranslatedQueryPayload, UploadPayload,
};

/// One backend request per method. Implementations never retry.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Base URL requests are resolved against, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Reachability probe against the root route.
    async fn probe(&self, timeout: Duration) -> Result<(), ClientError>;

    async fn list_documents(&self) -> Result<DocumentListPayload, ClientError>;

    /// Upload a PDF as multipart field `file`.
    async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadPayload, ClientError>;

    async fn query_single(&self, body: SingleQueryBody) -> Result<SingleQueryPayload, ClientError>;

    async fn query_multiple(&self, body: MultiQueryBody) -> Result<MultiQueryPayload, ClientError>;

    async fn query_translated(
        &self,
        body: TranslatedQueryBody,
    ) -> Result<TranslatedQueryPayload, ClientError>;

    async fn translate(&self, body: TranslateBody) -> Result<TranslatePayload, ClientError>;

    /// Single-kind analysis. `kind` is never [`AnalysisKind::All`].
    async fn analyze(
        &self,
        document: &DocumentRef,
        kind: AnalysisKind,
    ) -> Result<AnalysisPayload, ClientError>;

    async fn batch_analyze(&self, document: &DocumentRef) -> Result<AnalysisPayload, ClientError>;
}

/// Link to a document page in the backend's PDF viewer.
///
/// Pages are 1-based; 0 is treated as the first page.
pub fn view_url(base_url: &str, document: &DocumentRef, page: u32) -> String {
    format!(
        "{}/view-pdf/{}#page={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(document.as_str()),
        page.max(1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_url() {
        let doc = DocumentRef::from("report.pdf");
        assert_eq!(
            view_url("http://localhost:8000", &doc, 4),
            "http://localhost:8000/view-pdf/report.pdf#page=4"
        );
    }

    #[test]
    fn test_view_url_encodes_and_clamps() {
        let doc = DocumentRef::from("Q3 costs/ü.pdf");
        assert_eq!(
            view_url("http://10.0.0.5:8000/", &doc, 0),
            "http://10.0.0.5:8000/view-pdf/Q3%20costs%2F%C3%BC.pdf#page=1"
        );
    }
}
