//! HTTP implementation of [`Backend`] over `reqwest`.
//!
//! JSON bodies go out with `.json(..)`; replies are read as text first so a
//! failed status can still surface the backend's `detail` message.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::config::BackendConfig;
use crate::error::{ClientError, DocQueryError};
use crate::types::{AnalysisKind, DocumentRef};
use crate::wire::{
    AnalysisPayload, DocumentListPayload, Endpoint, ErrorPayload, MultiQueryBody,
    MultiQueryPayload, SingleQueryBody, SingleQueryPayload, TranslateBody, TranslatePayload,
    TranslatedQueryBody, TranslatedQueryPayload, UploadPayload,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the document query backend.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for `base_url`. A trailing slash is dropped.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        url::Url::parse(&base_url).map_err(|_| ClientError::InvalidUrl {
            url: base_url.clone(),
        })?;

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, DocQueryError> {
        let base_url = config.resolve_base_url()?;
        Ok(Self::new(base_url)?)
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn document_url(&self, endpoint: Endpoint, document: &DocumentRef) -> String {
        format!(
            "{}{}",
            self.url(endpoint),
            urlencoding::encode(document.as_str())
        )
    }

    /// Send a request and decode a successful JSON reply.
    ///
    /// An empty 2xx body decodes as the payload's default.
    async fn send<T>(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Default,
    {
        let response = request.send().await.map_err(|e| {
            warn!(endpoint = endpoint.path(), error = %e, "Backend request failed");
            ClientError::Network {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| ClientError::ResponseParse {
            message: format!("Failed to read response body: {}", e),
        })?;

        debug!(
            endpoint = endpoint.path(),
            status = status.as_u16(),
            bytes = body_text.len(),
            "Backend responded"
        );

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        if body_text.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&body_text).map_err(|e| ClientError::ResponseParse {
            message: format!("Invalid JSON from {}: {}", endpoint.path(), e),
        })
    }

    /// Map a non-2xx response to a backend error carrying the best detail text
    /// available: the JSON `detail`, else the raw body, else the status reason.
    fn map_http_error(status: StatusCode, body_text: &str) -> ClientError {
        let detail = serde_json::from_str::<ErrorPayload>(body_text)
            .ok()
            .and_then(|payload| payload.detail_text())
            .or_else(|| {
                let trimmed = body_text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            });

        ClientError::Backend {
            status: status.as_u16(),
            detail,
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn probe(&self, timeout: Duration) -> Result<(), ClientError> {
        let response = self
            .client
            .get(self.url(Endpoint::Root))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    }
                } else {
                    ClientError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body_text = response.text().await.unwrap_or_default();
            Err(Self::map_http_error(status, &body_text))
        }
    }

    async fn list_documents(&self) -> Result<DocumentListPayload, ClientError> {
        let request = self.client.get(self.url(Endpoint::ListDocuments));
        self.send(Endpoint::ListDocuments, request).await
    }

    async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadPayload, ClientError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| ClientError::Network {
                message: format!("invalid upload part: {e}"),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        debug!(file_name, "Uploading document");
        let request = self.client.post(self.url(Endpoint::Upload)).multipart(form);
        self.send(Endpoint::Upload, request).await
    }

    async fn query_single(&self, body: SingleQueryBody) -> Result<SingleQueryPayload, ClientError> {
        let request = self.client.post(self.url(Endpoint::QuerySingle)).json(&body);
        self.send(Endpoint::QuerySingle, request).await
    }

    async fn query_multiple(&self, body: MultiQueryBody) -> Result<MultiQueryPayload, ClientError> {
        let request = self
            .client
            .post(self.url(Endpoint::QueryMultiple))
            .json(&body);
        self.send(Endpoint::QueryMultiple, request).await
    }

    async fn query_translated(
        &self,
        body: TranslatedQueryBody,
    ) -> Result<TranslatedQueryPayload, ClientError> {
        let request = self
            .client
            .post(self.url(Endpoint::QueryTranslated))
            .json(&body);
        self.send(Endpoint::QueryTranslated, request).await
    }

    async fn translate(&self, body: TranslateBody) -> Result<TranslatePayload, ClientError> {
        let request = self.client.post(self.url(Endpoint::Translate)).json(&body);
        self.send(Endpoint::Translate, request).await
    }

    async fn analyze(
        &self,
        document: &DocumentRef,
        kind: AnalysisKind,
    ) -> Result<AnalysisPayload, ClientError> {
        let url = format!(
            "{}?analysis_type={}",
            self.document_url(Endpoint::Analyze, document),
            kind.as_param()
        );
        self.send(Endpoint::Analyze, self.client.post(url)).await
    }

    async fn batch_analyze(&self, document: &DocumentRef) -> Result<AnalysisPayload, ClientError> {
        let url = self.document_url(Endpoint::BatchAnalyze, document);
        self.send(Endpoint::BatchAnalyze, self.client.post(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(
            backend.url(Endpoint::ListDocuments),
            "http://localhost:8000/list-pdfs"
        );
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            HttpBackend::new("localhost 8000"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_document_url_is_encoded() {
        let backend = HttpBackend::new("http://localhost:8000").unwrap();
        assert_eq!(
            backend.document_url(Endpoint::BatchAnalyze, &DocumentRef::from("my report.pdf")),
            "http://localhost:8000/batch-analyze/my%20report.pdf"
        );
    }

    #[test]
    fn test_http_error_mapping() {
        // JSON detail is surfaced verbatim.
        let err = HttpBackend::map_http_error(
            StatusCode::NOT_FOUND,
            r#"{"detail":"PDF not found: missing.pdf"}"#,
        );
        match err {
            ClientError::Backend { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "PDF not found: missing.pdf");
            }
            _ => panic!("Expected Backend, got {:?}", err),
        }

        // Non-JSON body falls back to the text.
        let err = HttpBackend::map_http_error(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(err.user_message(), "upstream down");

        // Empty body falls back to the reason phrase.
        let err = HttpBackend::map_http_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.user_message(), "Internal Server Error");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_http_error_structured_detail() {
        let err = HttpBackend::map_http_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","question"],"msg":"field required"}]}"#,
        );
        assert!(err.user_message().contains("field required"));
    }
}
