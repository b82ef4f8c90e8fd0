//! Human-readable and JSON rendering of results.

use docquery_core::config::UiConfig;
use docquery_core::normalize::page_chips;
use docquery_core::{
    AnalysisResult, ConnectionStatus, DocResult, DocumentRef, LocationHit, MultiResult,
    QueryOutcome, QueryView, SelectionState, SingleResult, TextStatistics, TranslationConfig,
    TranslationOutcome, WordFrequency,
};
use serde::Serialize;
use std::fmt::Write;

/// Pretty-printed JSON of any result type.
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn wrap(text: &str, width: usize, indent: &str) -> String {
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

/// "1, 2, 3 (+4 more)", capped at `max` pages.
pub fn page_list(pages: &[u32], max: usize) -> String {
    let (shown, more) = page_chips(pages, max);
    let mut out = shown
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if more > 0 {
        let _ = write!(out, " (+{more} more)");
    }
    out
}

pub fn connection(status: ConnectionStatus, base_url: &str) -> String {
    format!("Backend: {status} ({base_url})")
}

pub fn documents(docs: &[DocumentRef]) -> String {
    if docs.is_empty() {
        return "No documents uploaded yet.".to_string();
    }
    let mut out = format!("Documents ({}):\n", docs.len());
    for doc in docs {
        let _ = writeln!(out, "  {doc}");
    }
    out
}

pub fn selection(selection: &SelectionState, translation: &TranslationConfig) -> String {
    let target = if selection.search_all() {
        "all documents".to_string()
    } else if !selection.multi().is_empty() {
        let names: Vec<&str> = selection.multi().iter().map(DocumentRef::as_str).collect();
        format!("{} documents: {}", names.len(), names.join(", "))
    } else if let Some(doc) = selection.single() {
        doc.to_string()
    } else {
        "nothing selected".to_string()
    };
    let translate = if translation.enabled {
        format!(
            "on ({} -> {})",
            translation.source_lang.label(),
            translation.target_lang.label()
        )
    } else {
        "off".to_string()
    };
    format!("Target: {target}\nTranslation: {translate}")
}

fn locations(out: &mut String, hits: &[LocationHit], indent: &str, ui: &UiConfig) {
    for hit in hits {
        let preview = hit.preview.split_whitespace().collect::<Vec<_>>().join(" ");
        let _ = writeln!(
            out,
            "{}",
            wrap(
                &format!("p.{}: {}", hit.page, preview),
                ui.wrap_width,
                indent
            )
        );
    }
}

fn single(out: &mut String, result: &SingleResult, ui: &UiConfig) {
    if !result.pages_found.is_empty() {
        let _ = writeln!(
            out,
            "Pages: {}",
            page_list(&result.pages_found, ui.max_page_chips)
        );
    }
    locations(out, &result.locations, "  ", ui);
}

fn doc_result(out: &mut String, result: &DocResult, ui: &UiConfig) {
    let _ = write!(out, "  {}  {} matches", result.document, result.matches);
    if !result.pages_found.is_empty() {
        let _ = write!(
            out,
            "  pages {}",
            page_list(&result.pages_found, ui.max_page_chips)
        );
    }
    out.push('\n');
    locations(out, &result.locations, "      ", ui);
}

fn multi(out: &mut String, result: &MultiResult, ui: &UiConfig) {
    let c = &result.comparison;
    let _ = writeln!(
        out,
        "Documents with results: {} | without: {} | avg {:.2} matches/doc",
        c.documents_with_results, c.documents_without_results, c.average_matches_per_doc
    );
    if let Some(best) = &c.most_relevant {
        let _ = writeln!(out, "Most relevant: {best}");
    }
    for doc in &result.results {
        doc_result(out, doc, ui);
    }
}

/// Full text rendering of a query outcome.
pub fn outcome(outcome: &QueryOutcome, ui: &UiConfig) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Mode: {} | Matches: {}",
        outcome.mode,
        outcome.view.total_matches()
    );
    if !outcome.view.keywords().is_empty() {
        let _ = write!(out, " | Keywords: {}", outcome.view.keywords().join(", "));
    }
    out.push('\n');
    if let Some(t) = &outcome.translation {
        let _ = writeln!(
            out,
            "Translated: \"{}\" -> \"{}\" ({:.0}% coverage)",
            t.original, t.translated, t.coverage
        );
    }
    out.push('\n');
    let _ = writeln!(out, "{}", wrap(outcome.view.answer(), ui.wrap_width, ""));
    out.push('\n');
    match &outcome.view {
        QueryView::Single(result) => single(&mut out, result, ui),
        QueryView::Multi(result) => multi(&mut out, result, ui),
    }
    out
}

pub fn translation(outcome: &TranslationOutcome, ui: &UiConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", wrap(&outcome.translated_text, ui.wrap_width, ""));
    let _ = write!(
        out,
        "\n{}/{} words translated ({:.0}% coverage)",
        outcome.words_translated, outcome.total_words, outcome.coverage_percentage
    );
    if !outcome.untranslated_words.is_empty() {
        let _ = write!(
            out,
            "\nUntranslated: {}",
            outcome.untranslated_words.join(", ")
        );
    }
    out
}

fn word_frequency(out: &mut String, wf: &WordFrequency) {
    let _ = writeln!(out, "Top words ({} unique):", wf.total_unique);
    for (rank, entry) in wf.words.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<20} {}", rank + 1, entry.word, entry.count);
    }
}

fn statistics(out: &mut String, stats: &TextStatistics) {
    let _ = writeln!(out, "Statistics:");
    let _ = writeln!(out, "  words:       {}", stats.total_words);
    let _ = writeln!(out, "  characters:  {}", stats.total_characters);
    if let Some(no_spaces) = stats.total_characters_no_spaces {
        let _ = writeln!(out, "  (no spaces): {no_spaces}");
    }
    let _ = writeln!(out, "  lines:       {}", stats.total_lines);
    if let Some(unique) = stats.unique_words {
        let _ = writeln!(out, "  unique:      {unique}");
    }
    if let Some(avg) = stats.average_word_length {
        let _ = writeln!(out, "  avg length:  {avg:.2}");
    }
}

pub fn analysis(document: &DocumentRef, result: &AnalysisResult, ui: &UiConfig) -> String {
    let mut out = format!("Analysis of {document}\n\n");
    if let Some(summary) = result.summary() {
        let _ = writeln!(out, "Summary:\n{}\n", wrap(summary, ui.wrap_width, "  "));
    }
    if let Some(wf) = result.word_frequency() {
        word_frequency(&mut out, wf);
        out.push('\n');
    }
    if let Some(stats) = result.statistics() {
        statistics(&mut out, stats);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docquery_core::{
        ComparisonSummary, Language, QueryMode, SearchScope, TranslationSummary, WordCount,
    };
    use pretty_assertions::assert_eq;

    fn ui() -> UiConfig {
        UiConfig::default()
    }

    #[test]
    fn test_page_list_overflow() {
        let pages: Vec<u32> = (1..=12).collect();
        assert_eq!(
            page_list(&pages, 10),
            "1, 2, 3, 4, 5, 6, 7, 8, 9, 10 (+2 more)"
        );
        assert_eq!(page_list(&[4, 9], 10), "4, 9");
    }

    #[test]
    fn test_documents_empty_and_listed() {
        assert_eq!(documents(&[]), "No documents uploaded yet.");
        let text = documents(&["a.pdf".into(), "b.pdf".into()]);
        assert!(text.starts_with("Documents (2):"));
        assert!(text.contains("  b.pdf"));
    }

    #[test]
    fn test_single_outcome() {
        let outcome = QueryOutcome {
            question: "Kosten".into(),
            mode: QueryMode::Translated(SearchScope::Single),
            view: QueryView::Single(SingleResult {
                answer: "Costs rose.".into(),
                locations: vec![LocationHit {
                    page: 3,
                    preview: "total   cost\nrose".into(),
                    keywords: vec!["cost".into()],
                }],
                pages_found: vec![3],
                matches: 1,
                keywords: vec!["cost".into()],
            }),
            translation: Some(TranslationSummary {
                original: "Kosten".into(),
                translated: "cost".into(),
                coverage: 100.0,
            }),
        };
        let text = super::outcome(&outcome, &ui());
        assert!(text.starts_with("Mode: translated/single | Matches: 1 | Keywords: cost"));
        assert!(text.contains("Translated: \"Kosten\" -> \"cost\" (100% coverage)"));
        assert!(text.contains("Pages: 3"));
        assert!(text.contains("p.3: total cost rose"));
    }

    #[test]
    fn test_multi_outcome() {
        let outcome = QueryOutcome {
            question: "budget".into(),
            mode: QueryMode::MultiAll,
            view: QueryView::Multi(MultiResult {
                answer: "Found in one document.".into(),
                results: vec![DocResult {
                    document: "a.pdf".into(),
                    matches: 4,
                    pages_found: vec![2, 5],
                    locations: vec![],
                }],
                total_matches: 4,
                keywords: vec![],
                documents_found: 1,
                comparison: ComparisonSummary {
                    most_relevant: Some("a.pdf".into()),
                    documents_with_results: 1,
                    documents_without_results: 1,
                    average_matches_per_doc: 2.0,
                },
            }),
            translation: None,
        };
        let text = super::outcome(&outcome, &ui());
        assert!(text.contains("Documents with results: 1 | without: 1 | avg 2.00 matches/doc"));
        assert!(text.contains("Most relevant: a.pdf"));
        assert!(text.contains("  a.pdf  4 matches  pages 2, 5"));
    }

    #[test]
    fn test_analysis_sections() {
        let result = AnalysisResult::Combined {
            summary: Some("Short.".into()),
            word_frequency: Some(WordFrequency {
                words: vec![WordCount {
                    word: "cost".into(),
                    count: 9,
                }],
                total_unique: 120,
            }),
            statistics: Some(TextStatistics {
                total_words: 900,
                ..Default::default()
            }),
        };
        let text = analysis(&"a.pdf".into(), &result, &ui());
        assert!(text.starts_with("Analysis of a.pdf"));
        assert!(text.contains("Top words (120 unique):"));
        assert!(text.contains("words:       900"));
    }

    #[test]
    fn test_selection_summary() {
        let mut sel = SelectionState::new();
        sel.toggle_multi("a.pdf".into());
        sel.toggle_multi("b.pdf".into());
        let translation = TranslationConfig {
            enabled: true,
            source_lang: Language::Es,
            target_lang: Language::En,
        };
        assert_eq!(
            selection(&sel, &translation),
            "Target: 2 documents: a.pdf, b.pdf\nTranslation: on (Spanish (Español) -> English)"
        );
    }
}
