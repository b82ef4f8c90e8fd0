//! Backend wire contract: request bodies and raw response payloads.
//!
//! Field names match the backend exactly. Every response field is optional on
//! the wire; absent or `null` values deserialize to their defaults so partial
//! payloads never fail to parse.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Backend routes used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Root,
    ListDocuments,
    Upload,
    QuerySingle,
    QueryMultiple,
    QueryTranslated,
    Translate,
    Analyze,
    BatchAnalyze,
}

impl Endpoint {
    /// Route path; document-scoped routes take the document id as a suffix.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Root => "/",
            Endpoint::ListDocuments => "/list-pdfs",
            Endpoint::Upload => "/upload-pdf",
            Endpoint::QuerySingle => "/query",
            Endpoint::QueryMultiple => "/query-multiple",
            Endpoint::QueryTranslated => "/api/query-translated",
            Endpoint::Translate => "/api/translate",
            Endpoint::Analyze => "/analyze/",
            Endpoint::BatchAnalyze => "/batch-analyze/",
        }
    }
}

// --- Requests ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleQueryBody {
    pub question: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiQueryBody {
    pub question: String,
    pub filenames: Vec<String>,
    pub search_all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedQueryBody {
    pub question: String,
    pub filenames: Vec<String>,
    pub search_all: bool,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateBody {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

// --- Responses ---

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DocumentListPayload {
    #[serde(default, alias = "pdfs", deserialize_with = "null_as_default")]
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UploadPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LocationPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SingleQueryPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<LocationPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages_found: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_matches: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DocResultPayload {
    #[serde(default, alias = "document", deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages_found: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<LocationPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ComparisonPayload {
    #[serde(default)]
    pub most_relevant: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents_with_results: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents_without_results: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_matches_per_doc: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MultiQueryPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<DocResultPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_matches: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents_found: u64,
    #[serde(default)]
    pub comparison: Option<ComparisonPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TranslationSummaryPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translated: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub coverage: f64,
}

/// Superset of the single and multi payloads plus translation metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TranslatedQueryPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<LocationPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages_found: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<DocResultPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_matches: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents_found: u64,
    #[serde(default)]
    pub comparison: Option<ComparisonPayload>,
    #[serde(default)]
    pub translation: Option<TranslationSummaryPayload>,
}

impl TranslatedQueryPayload {
    pub fn into_single(self) -> SingleQueryPayload {
        SingleQueryPayload {
            answer: self.answer,
            locations: self.locations,
            pages_found: self.pages_found,
            total_matches: self.total_matches,
            keywords: self.keywords,
        }
    }

    pub fn into_multi(self) -> MultiQueryPayload {
        MultiQueryPayload {
            answer: self.answer,
            results: self.results,
            total_matches: self.total_matches,
            keywords: self.keywords,
            documents_found: self.documents_found,
            comparison: self.comparison,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TranslationAnalysisPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub words_translated: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_words: u64,
    #[serde(default, alias = "translation_coverage")]
    pub coverage_percentage: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub untranslated_words: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TranslatePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translated_text: String,
    #[serde(default)]
    pub analysis: Option<TranslationAnalysisPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WordCountPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub word: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StatisticsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_words: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_characters: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_lines: u64,
    #[serde(default)]
    pub unique_words: Option<u64>,
    #[serde(default)]
    pub average_word_length: Option<f64>,
    #[serde(default)]
    pub total_characters_no_spaces: Option<u64>,
}

/// Reply of both the single-kind and the batch analysis routes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AnalysisPayload {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub word_frequency: Option<Vec<WordCountPayload>>,
    #[serde(default)]
    pub total_unique_words: Option<u64>,
    #[serde(default)]
    pub statistics: Option<StatisticsPayload>,
    /// Set instead of any analysis when the document has no extractable text.
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorPayload {
    /// The detail as display text: strings verbatim, anything else as compact JSON.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
