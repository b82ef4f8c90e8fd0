//! Core types for DocQuery.
//!
//! Document references, query modes and target sets, the unified result view
//! model, and the lifecycle/connection states shared by the dispatcher and the
//! health monitor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Identifier of a document known to the backend (its file name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Languages the backend translator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    De,
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::De, Language::En, Language::Es];

    /// Wire code (`de`, `en`, `es`).
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Human-readable label with the native name.
    pub fn label(&self) -> &'static str {
        match self {
            Language::De => "German (Deutsch)",
            Language::En => "English",
            Language::Es => "Spanish (Español)",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" | "german" | "deutsch" => Ok(Language::De),
            "en" | "english" => Ok(Language::En),
            "es" | "spanish" | "español" | "espanol" => Ok(Language::Es),
            other => Err(ValidationError::UnknownLanguage {
                code: other.to_string(),
            }),
        }
    }
}

/// Source and target language of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Which documents a query searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    Single,
    MultiExplicit,
    MultiAll,
}

impl SearchScope {
    pub fn is_multi(&self) -> bool {
        !matches!(self, SearchScope::Single)
    }
}

/// The query mode resolved from selection state and the translation toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "scope")]
pub enum QueryMode {
    Single,
    MultiExplicit,
    MultiAll,
    /// Translate-then-search over the wrapped scope, in one backend call.
    Translated(SearchScope),
}

impl QueryMode {
    pub fn scope(&self) -> SearchScope {
        match self {
            QueryMode::Single => SearchScope::Single,
            QueryMode::MultiExplicit => SearchScope::MultiExplicit,
            QueryMode::MultiAll => SearchScope::MultiAll,
            QueryMode::Translated(scope) => *scope,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, QueryMode::Translated(_))
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMode::Single => write!(f, "single"),
            QueryMode::MultiExplicit => write!(f, "multi"),
            QueryMode::MultiAll => write!(f, "all"),
            QueryMode::Translated(scope) => {
                let inner = match scope {
                    SearchScope::Single => "single",
                    SearchScope::MultiExplicit => "multi",
                    SearchScope::MultiAll => "all",
                };
                write!(f, "translated/{inner}")
            }
        }
    }
}

/// The documents a query applies to, snapshotted from the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "documents")]
pub enum TargetSet {
    Single(DocumentRef),
    Explicit(Vec<DocumentRef>),
    /// Every document in the registry; the backend expands it.
    All,
}

impl TargetSet {
    pub fn scope(&self) -> SearchScope {
        match self {
            TargetSet::Single(_) => SearchScope::Single,
            TargetSet::Explicit(_) => SearchScope::MultiExplicit,
            TargetSet::All => SearchScope::MultiAll,
        }
    }

    /// File names sent on the wire; empty when searching everything.
    pub fn filenames(&self) -> Vec<String> {
        match self {
            TargetSet::Single(doc) => vec![doc.as_str().to_string()],
            TargetSet::Explicit(docs) => docs.iter().map(|d| d.as_str().to_string()).collect(),
            TargetSet::All => Vec::new(),
        }
    }

    pub fn search_all(&self) -> bool {
        matches!(self, TargetSet::All)
    }

    /// Number of targeted documents, when known client-side.
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            TargetSet::Single(_) => Some(1),
            TargetSet::Explicit(docs) => Some(docs.len()),
            TargetSet::All => None,
        }
    }
}

/// A fully validated query, built fresh for each submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub mode: QueryMode,
    pub target: TargetSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<LanguagePair>,
}

/// A page within a document where the backend found matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationHit {
    pub page: u32,
    pub preview: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResult {
    pub answer: String,
    pub locations: Vec<LocationHit>,
    /// Ascending, duplicate free.
    pub pages_found: Vec<u32>,
    pub matches: u64,
    pub keywords: Vec<String>,
}

/// Per-document slice of a multi-document query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocResult {
    pub document: DocumentRef,
    pub matches: u64,
    pub pages_found: Vec<u32>,
    pub locations: Vec<LocationHit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub most_relevant: Option<DocumentRef>,
    pub documents_with_results: u64,
    pub documents_without_results: u64,
    pub average_matches_per_doc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiResult {
    pub answer: String,
    pub results: Vec<DocResult>,
    pub total_matches: u64,
    pub keywords: Vec<String>,
    pub documents_found: u64,
    pub comparison: ComparisonSummary,
}

/// Translation metadata embedded in a translated query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSummary {
    pub original: String,
    pub translated: String,
    pub coverage: f64,
}

/// Result of a standalone translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationOutcome {
    pub original_text: String,
    pub translated_text: String,
    pub words_translated: u64,
    pub total_words: u64,
    /// Always within `0.0..=100.0`.
    pub coverage_percentage: f64,
    pub untranslated_words: Vec<String>,
}

/// Query results, shaped by the target set rather than by translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "shape")]
pub enum QueryView {
    Single(SingleResult),
    Multi(MultiResult),
}

impl QueryView {
    pub fn answer(&self) -> &str {
        match self {
            QueryView::Single(r) => &r.answer,
            QueryView::Multi(r) => &r.answer,
        }
    }

    pub fn total_matches(&self) -> u64 {
        match self {
            QueryView::Single(r) => r.matches,
            QueryView::Multi(r) => r.total_matches,
        }
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            QueryView::Single(r) => &r.keywords,
            QueryView::Multi(r) => &r.keywords,
        }
    }
}

/// The unified view model produced for every query submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub question: String,
    pub mode: QueryMode,
    pub view: QueryView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationSummary>,
}

/// Analyses the backend can run over one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Summary,
    WordFrequency,
    Statistics,
    /// All three at once, through the batch endpoint.
    All,
}

impl AnalysisKind {
    /// Value of the `analysis_type` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::WordFrequency => "word_frequency",
            AnalysisKind::Statistics => "statistics",
            AnalysisKind::All => "all",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for AnalysisKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "summary" => Ok(AnalysisKind::Summary),
            "word_frequency" | "words" | "frequency" => Ok(AnalysisKind::WordFrequency),
            "statistics" | "stats" => Ok(AnalysisKind::Statistics),
            "all" | "batch" => Ok(AnalysisKind::All),
            other => Err(ValidationError::UnknownAnalysisKind {
                kind: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequency {
    /// Most frequent first, in backend order.
    pub words: Vec<WordCount>,
    pub total_unique: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStatistics {
    pub total_words: u64,
    pub total_characters: u64,
    pub total_lines: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_words: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_word_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_characters_no_spaces: Option<u64>,
}

/// Normalized analysis result for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AnalysisResult {
    Summary {
        text: String,
    },
    WordFrequency(WordFrequency),
    Statistics(TextStatistics),
    /// Several branches populated at once; none are dropped.
    Combined {
        summary: Option<String>,
        word_frequency: Option<WordFrequency>,
        statistics: Option<TextStatistics>,
    },
}

impl AnalysisResult {
    pub fn summary(&self) -> Option<&str> {
        match self {
            AnalysisResult::Summary { text } => Some(text),
            AnalysisResult::Combined { summary, .. } => summary.as_deref(),
            _ => None,
        }
    }

    pub fn word_frequency(&self) -> Option<&WordFrequency> {
        match self {
            AnalysisResult::WordFrequency(wf) => Some(wf),
            AnalysisResult::Combined { word_frequency, .. } => word_frequency.as_ref(),
            _ => None,
        }
    }

    pub fn statistics(&self) -> Option<&TextStatistics> {
        match self {
            AnalysisResult::Statistics(stats) => Some(stats),
            AnalysisResult::Combined { statistics, .. } => statistics.as_ref(),
            _ => None,
        }
    }
}

/// Reply to a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub document: DocumentRef,
    pub message: String,
}

/// Backend reachability as reported by the health monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Checking,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Checking => write!(f, "checking"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Lifecycle of a gated operation (query, analysis, translation, upload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationPhase {
    Idle,
    Validating,
    Dispatching,
    AwaitingResponse,
    Rendering,
    ErrorDisplay,
}

impl OperationPhase {
    /// Whether `self -> next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: OperationPhase) -> bool {
        use OperationPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Dispatching)
                | (Validating, Idle)
                | (Dispatching, AwaitingResponse)
                | (AwaitingResponse, Rendering)
                | (AwaitingResponse, ErrorDisplay)
                | (Rendering, Idle)
                | (Rendering, ErrorDisplay)
                | (ErrorDisplay, Idle)
        )
    }

    pub fn is_idle(self) -> bool {
        self == OperationPhase::Idle
    }
}

impl fmt::Display for OperationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationPhase::Idle => write!(f, "idle"),
            OperationPhase::Validating => write!(f, "validating"),
            OperationPhase::Dispatching => write!(f, "dispatching"),
            OperationPhase::AwaitingResponse => write!(f, "awaiting response"),
            OperationPhase::Rendering => write!(f, "rendering"),
            OperationPhase::ErrorDisplay => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_and_display() {
        assert_eq!("de".parse::<Language>().unwrap(), Language::De);
        assert_eq!("English".parse::<Language>().unwrap(), Language::En);
        assert_eq!(" ES ".parse::<Language>().unwrap(), Language::Es);
        assert_eq!(Language::De.to_string(), "de");
        assert!(matches!(
            "fr".parse::<Language>(),
            Err(ValidationError::UnknownLanguage { code }) if code == "fr"
        ));
    }

    #[test]
    fn test_language_serde_is_code() {
        let json = serde_json::to_string(&Language::Es).unwrap();
        assert_eq!(json, "\"es\"");
    }

    #[test]
    fn test_target_set_wire_shape() {
        let single = TargetSet::Single("a.pdf".into());
        assert_eq!(single.filenames(), vec!["a.pdf".to_string()]);
        assert!(!single.search_all());

        let all = TargetSet::All;
        assert!(all.filenames().is_empty());
        assert!(all.search_all());
        assert_eq!(all.len_hint(), None);

        let explicit = TargetSet::Explicit(vec!["a.pdf".into(), "b.pdf".into()]);
        assert_eq!(explicit.scope(), SearchScope::MultiExplicit);
        assert_eq!(explicit.len_hint(), Some(2));
    }

    #[test]
    fn test_query_mode_scope() {
        assert_eq!(QueryMode::Single.scope(), SearchScope::Single);
        let translated = QueryMode::Translated(SearchScope::MultiAll);
        assert_eq!(translated.scope(), SearchScope::MultiAll);
        assert!(translated.is_translated());
        assert_eq!(translated.to_string(), "translated/all");
    }

    #[test]
    fn test_analysis_kind_parse() {
        assert_eq!(
            "word-frequency".parse::<AnalysisKind>().unwrap(),
            AnalysisKind::WordFrequency
        );
        assert_eq!("stats".parse::<AnalysisKind>().unwrap(), AnalysisKind::Statistics);
        assert_eq!("all".parse::<AnalysisKind>().unwrap(), AnalysisKind::All);
        assert!("translate".parse::<AnalysisKind>().is_err());
        assert_eq!(AnalysisKind::WordFrequency.as_param(), "word_frequency");
    }

    #[test]
    fn test_phase_transitions() {
        use OperationPhase::*;
        assert!(Idle.can_transition_to(Validating));
        assert!(Validating.can_transition_to(Idle));
        assert!(AwaitingResponse.can_transition_to(ErrorDisplay));
        assert!(!Idle.can_transition_to(AwaitingResponse));
        assert!(!Rendering.can_transition_to(Dispatching));
        assert!(!Validating.can_transition_to(Validating));
    }

    #[test]
    fn test_analysis_accessors_on_combined() {
        let result = AnalysisResult::Combined {
            summary: Some("short".into()),
            word_frequency: None,
            statistics: Some(TextStatistics::default()),
        };
        assert_eq!(result.summary(), Some("short"));
        assert!(result.word_frequency().is_none());
        assert!(result.statistics().is_some());
    }
}
