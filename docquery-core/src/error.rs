//! Error types for the DocQuery core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering input validation, backend communication, dispatch gating and
//! configuration.

use std::path::PathBuf;

use crate::types::OperationPhase;

/// Top-level error type for the DocQuery core library.
#[derive(Debug, thiserror::Error)]
pub enum DocQueryError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backend and transport failures keep their own text so a backend
    /// `detail` reaches the user verbatim.
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocQueryError {
    /// Text shown to the user for this failure.
    ///
    /// Backend rejections surface their `detail` string unchanged; every
    /// other kind uses its display form.
    pub fn user_message(&self) -> String {
        match self {
            DocQueryError::Client(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    /// Whether the failure was raised locally, before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, DocQueryError::Validation(_))
    }

    /// Whether the operation was rejected because another one was in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, DocQueryError::Dispatch(DispatchError::Busy { .. }))
    }
}

/// Input problems detected before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("no target selected")]
    NoTarget,

    #[error("text to translate must not be empty")]
    EmptyText,

    #[error("unsupported language: {code}")]
    UnknownLanguage { code: String },

    #[error("unsupported analysis type: {kind}")]
    UnknownAnalysisKind { kind: String },

    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("only PDF files can be uploaded: {path}")]
    UnsupportedFileType { path: PathBuf },
}

/// Errors from talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Backend unreachable: {message}")]
    Network { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Non-2xx response. Displays only the backend's detail message.
    #[error("{detail}")]
    Backend { status: u16, detail: String },

    #[error("Backend response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Invalid backend URL: {url}")]
    InvalidUrl { url: String },
}

impl ClientError {
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Backend { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of a backend rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from the single-flight dispatch gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Another operation is already in flight ({phase})")]
    Busy { phase: OperationPhase },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        from: OperationPhase,
        to: OperationPhase,
    },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

impl From<Box<figment::Error>> for ConfigError {
    fn from(err: Box<figment::Error>) -> Self {
        ConfigError::ParseError {
            message: err.to_string(),
        }
    }
}

/// A type alias for results using the top-level `DocQueryError`.
pub type Result<T> = std::result::Result<T, DocQueryError>;
