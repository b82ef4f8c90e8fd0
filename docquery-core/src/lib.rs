//! # DocQuery Core
//!
//! Client-side orchestration for a document question-answering backend.
//! Provides selection state and query mode resolution, the single-flight
//! request dispatcher, result normalization, translation coordination,
//! backend health probing, the document registry, configuration, and the
//! HTTP backend client.

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod health;
pub mod http;
pub mod mock;
pub mod normalize;
pub mod registry;
pub mod selection;
pub mod session;
pub mod translation;
pub mod types;
pub mod wire;

// Re-export commonly used types at the crate root.
pub use backend::{Backend, view_url};
pub use config::{BackendConfig, DocQueryConfig, TranslationConfig, UiConfig};
pub use dispatcher::{Dispatcher, prepare_query};
pub use error::{ClientError, DispatchError, DocQueryError, Result, ValidationError};
pub use health::HealthMonitor;
pub use http::HttpBackend;
pub use mock::{BackendCall, MockBackend};
pub use registry::DocumentRegistry;
pub use selection::{SelectionState, resolve_mode};
pub use session::{Session, StartupReport};
pub use translation::TranslationCoordinator;
pub use types::{
    AnalysisKind, AnalysisResult, ComparisonSummary, ConnectionStatus, DocResult, DocumentRef,
    Language, LanguagePair, LocationHit, MultiResult, OperationPhase, QueryMode, QueryOutcome,
    QueryRequest, QueryView, SearchScope, SingleResult, TargetSet, TextStatistics,
    TranslationOutcome, TranslationSummary, UploadReceipt, WordCount, WordFrequency,
};
