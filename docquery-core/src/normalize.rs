//! Result normalizer. Maps raw backend payloads onto the unified view model.
//!
//! There is one function per backend route. None of them fail on partial
//! payloads: absent numbers become 0 and absent lists become empty. The only
//! fallible mapping is analysis, where a payload carrying nothing but an
//! `error` message is turned into a backend error.

use std::collections::BTreeSet;

use crate::error::ClientError;
use crate::types::{
    AnalysisKind, AnalysisResult, ComparisonSummary, DocResult, DocumentRef, LocationHit,
    MultiResult, QueryMode, QueryOutcome, QueryRequest, QueryView, SearchScope, SingleResult,
    TextStatistics, TranslationOutcome, TranslationSummary, WordCount, WordFrequency,
};
use crate::wire::{
    AnalysisPayload, ComparisonPayload, DocResultPayload, DocumentListPayload, LocationPayload,
    MultiQueryPayload, SingleQueryPayload, StatisticsPayload, TranslatePayload,
    TranslatedQueryPayload, TranslationSummaryPayload,
};

/// Registry contents: blank entries dropped, first occurrence wins.
///
/// Names are kept byte-exact; they are sent back to the backend as file ids.
pub fn documents(payload: DocumentListPayload) -> Vec<DocumentRef> {
    let mut seen = BTreeSet::new();
    payload
        .documents
        .into_iter()
        .filter(|name| !name.trim().is_empty() && seen.insert(name.clone()))
        .map(DocumentRef::from)
        .collect()
}

fn location(payload: LocationPayload) -> LocationHit {
    LocationHit {
        // Pages are 1-based; a missing page number is pinned to the first page.
        page: payload.page.max(1),
        preview: payload.preview,
        keywords: payload.keywords,
    }
}

/// Sorted, duplicate-free union of the reported pages and every location page.
fn merge_pages(reported: &[u32], locations: &[LocationHit]) -> Vec<u32> {
    reported
        .iter()
        .copied()
        .filter(|&p| p >= 1)
        .chain(locations.iter().map(|l| l.page))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn single(payload: SingleQueryPayload) -> SingleResult {
    let locations: Vec<LocationHit> = payload.locations.into_iter().map(location).collect();
    let pages_found = merge_pages(&payload.pages_found, &locations);
    SingleResult {
        answer: payload.answer,
        locations,
        pages_found,
        matches: payload.total_matches,
        keywords: payload.keywords,
    }
}

fn doc_result(payload: DocResultPayload) -> DocResult {
    let locations: Vec<LocationHit> = payload.locations.into_iter().map(location).collect();
    let pages_found = merge_pages(&payload.pages_found, &locations);
    DocResult {
        document: DocumentRef::from(payload.filename),
        matches: payload.matches,
        pages_found,
        locations,
    }
}

/// Aggregate statistics computed from per-document results.
pub fn compare(results: &[DocResult]) -> ComparisonSummary {
    let queried = results.len() as u64;
    let with_results = results.iter().filter(|r| r.matches > 0).count() as u64;
    let total: u64 = results.iter().map(|r| r.matches).sum();
    // First document wins ties, matching the backend's ordering.
    let most_relevant = results
        .iter()
        .filter(|r| r.matches > 0)
        .fold(None::<&DocResult>, |best, r| match best {
            Some(b) if b.matches >= r.matches => Some(b),
            _ => Some(r),
        })
        .map(|r| r.document.clone());
    ComparisonSummary {
        most_relevant,
        documents_with_results: with_results,
        documents_without_results: queried - with_results,
        average_matches_per_doc: if queried == 0 {
            0.0
        } else {
            total as f64 / queried as f64
        },
    }
}

fn comparison(block: Option<ComparisonPayload>, results: &[DocResult]) -> ComparisonSummary {
    match block {
        Some(block) => ComparisonSummary {
            most_relevant: block
                .most_relevant
                .filter(|name| !name.trim().is_empty())
                .map(DocumentRef::from),
            documents_with_results: block.documents_with_results,
            documents_without_results: block.documents_without_results,
            average_matches_per_doc: block.average_matches_per_doc,
        },
        None => compare(results),
    }
}

pub fn multi(payload: MultiQueryPayload) -> MultiResult {
    let results: Vec<DocResult> = payload.results.into_iter().map(doc_result).collect();
    let comparison = comparison(payload.comparison, &results);
    MultiResult {
        answer: payload.answer,
        results,
        total_matches: payload.total_matches,
        keywords: payload.keywords,
        documents_found: payload.documents_found,
        comparison,
    }
}

fn translation_summary(payload: TranslationSummaryPayload) -> TranslationSummary {
    TranslationSummary {
        original: payload.original,
        translated: payload.translated,
        coverage: clamp_percentage(payload.coverage),
    }
}

/// Translated query: the shape follows the target scope, not the translation.
pub fn translated(
    payload: TranslatedQueryPayload,
    scope: SearchScope,
) -> (QueryView, Option<TranslationSummary>) {
    let mut payload = payload;
    let translation = payload.translation.take().map(translation_summary);
    let view = if scope.is_multi() {
        QueryView::Multi(multi(payload.into_multi()))
    } else {
        QueryView::Single(single(payload.into_single()))
    };
    (view, translation)
}

/// Build the outcome for a request from its already normalized view.
pub fn outcome(
    request: &QueryRequest,
    view: QueryView,
    translation: Option<TranslationSummary>,
) -> QueryOutcome {
    QueryOutcome {
        question: request.question.clone(),
        mode: request.mode,
        view,
        translation: match request.mode {
            QueryMode::Translated(_) => translation,
            _ => None,
        },
    }
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

pub fn translation(payload: TranslatePayload) -> TranslationOutcome {
    let analysis = payload.analysis.unwrap_or_default();
    let coverage = match analysis.coverage_percentage {
        Some(reported) => reported,
        None if analysis.total_words > 0 => {
            100.0 * analysis.words_translated as f64 / analysis.total_words as f64
        }
        None => 0.0,
    };
    TranslationOutcome {
        original_text: payload.original_text,
        translated_text: payload.translated_text,
        words_translated: analysis.words_translated,
        total_words: analysis.total_words,
        coverage_percentage: clamp_percentage(coverage),
        untranslated_words: analysis.untranslated_words,
    }
}

fn statistics(payload: StatisticsPayload) -> TextStatistics {
    TextStatistics {
        total_words: payload.total_words,
        total_characters: payload.total_characters,
        total_lines: payload.total_lines,
        unique_words: payload.unique_words,
        average_word_length: payload.average_word_length,
        total_characters_no_spaces: payload.total_characters_no_spaces,
    }
}

/// Map an analysis payload. Every populated branch is kept: more than one
/// branch, or a batch request, yields [`AnalysisResult::Combined`].
pub fn analysis(
    payload: AnalysisPayload,
    requested: AnalysisKind,
) -> Result<AnalysisResult, ClientError> {
    let total_unique_words = payload.total_unique_words;
    let summary = payload.summary;
    let word_frequency = payload.word_frequency.map(|words| {
        let words: Vec<WordCount> = words
            .into_iter()
            .map(|w| WordCount {
                word: w.word,
                count: w.count,
            })
            .collect();
        WordFrequency {
            total_unique: total_unique_words.unwrap_or(words.len() as u64),
            words,
        }
    });
    let stats = payload.statistics.map(statistics);

    let populated = usize::from(summary.is_some())
        + usize::from(word_frequency.is_some())
        + usize::from(stats.is_some());

    if populated == 0
        && let Some(message) = payload.error.filter(|m| !m.trim().is_empty())
    {
        return Err(ClientError::Backend {
            status: 200,
            detail: message,
        });
    }

    if populated > 1 || requested == AnalysisKind::All {
        return Ok(AnalysisResult::Combined {
            summary,
            word_frequency,
            statistics: stats,
        });
    }

    Ok(match (summary, word_frequency, stats) {
        (Some(text), _, _) => AnalysisResult::Summary { text },
        (_, Some(wf), _) => AnalysisResult::WordFrequency(wf),
        (_, _, Some(s)) => AnalysisResult::Statistics(s),
        (None, None, None) => match requested {
            AnalysisKind::WordFrequency => AnalysisResult::WordFrequency(WordFrequency {
                words: Vec::new(),
                total_unique: total_unique_words.unwrap_or(0),
            }),
            AnalysisKind::Statistics => AnalysisResult::Statistics(TextStatistics::default()),
            _ => AnalysisResult::Summary {
                text: String::new(),
            },
        },
    })
}

/// Pages to show for a result, capped at `max`, plus how many were left out.
pub fn page_chips(pages: &[u32], max: usize) -> (&[u32], usize) {
    let shown = pages.len().min(max);
    (&pages[..shown], pages.len() - shown)
}
