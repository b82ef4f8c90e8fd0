//! End-to-end dispatch scenarios over `MockBackend`.

use docquery_core::wire::{Endpoint, SingleQueryBody};
use docquery_core::{
    AnalysisKind, AnalysisResult, BackendCall, ClientError, DocQueryConfig, DocumentRef,
    Dispatcher, Language, MockBackend, OperationPhase, QueryMode, QueryView, SearchScope,
    SelectionState, Session, TranslationConfig,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn select(name: &str) -> SelectionState {
    let mut selection = SelectionState::new();
    selection.select_single(DocumentRef::from(name));
    selection
}

#[tokio::test]
async fn test_single_document_query_hits_query_route() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_json(
        Endpoint::QuerySingle,
        json!({
            "answer": "Costs rose 4%.",
            "locations": [{"page": 3, "preview": "cost rose", "keywords": ["cost"]}],
            "pages_found": [3],
            "total_matches": 1,
            "keywords": ["cost"]
        }),
    );
    let dispatcher = Dispatcher::new(mock.clone());

    let outcome = dispatcher
        .submit_query("cost", &select("a.pdf"), &TranslationConfig::default())
        .await
        .unwrap();

    assert_eq!(
        mock.calls(),
        vec![BackendCall::QuerySingle(SingleQueryBody {
            question: "cost".into(),
            filename: "a.pdf".into(),
        })]
    );
    assert_eq!(outcome.mode, QueryMode::Single);
    assert!(outcome.translation.is_none());
    match outcome.view {
        QueryView::Single(result) => assert_eq!(result.pages_found, vec![3]),
        other => panic!("Expected single view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_all_overrides_multi_selection() {
    let mock = Arc::new(MockBackend::new());
    let dispatcher = Dispatcher::new(mock.clone());
    let mut selection = SelectionState::new();
    selection.toggle_multi("a.pdf".into());
    selection.toggle_multi("b.pdf".into());
    selection.set_search_all(true);

    assert!(selection.multi().is_empty());
    assert!(selection.single().is_none());

    let outcome = dispatcher
        .submit_query("budget", &selection, &TranslationConfig::default())
        .await
        .unwrap();
    assert_eq!(outcome.mode, QueryMode::MultiAll);
    match &mock.calls()[0] {
        BackendCall::QueryMultiple(body) => {
            assert!(body.filenames.is_empty());
            assert!(body.search_all);
        }
        other => panic!("Expected QueryMultiple, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translated_single_query_sends_language_pair() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_json(
        Endpoint::QueryTranslated,
        json!({
            "answer": "cost found",
            "locations": [{"page": 1, "preview": "cost", "keywords": ["cost"]}],
            "total_matches": 1,
            "translation": {"original": "Kosten", "translated": "cost", "coverage": 100.0}
        }),
    );
    let dispatcher = Dispatcher::new(mock.clone());
    let translation = TranslationConfig {
        enabled: true,
        source_lang: Language::De,
        target_lang: Language::En,
    };

    let outcome = dispatcher
        .submit_query("Kosten", &select("a.pdf"), &translation)
        .await
        .unwrap();

    assert_eq!(outcome.mode, QueryMode::Translated(SearchScope::Single));
    assert_eq!(outcome.translation.unwrap().original, "Kosten");
    assert!(matches!(outcome.view, QueryView::Single(_)));

    match &mock.calls()[0] {
        BackendCall::QueryTranslated(body) => {
            assert_eq!(body.filenames, vec!["a.pdf"]);
            assert!(!body.search_all);
            assert_eq!(body.source_lang, "de");
            assert_eq!(body.target_lang, "en");
        }
        other => panic!("Expected QueryTranslated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_batch_analysis_keeps_every_section() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_json(
        Endpoint::BatchAnalyze,
        json!({
            "filename": "a.pdf",
            "summary": "Quarterly cost report.",
            "word_frequency": [{"word": "cost", "count": 31}],
            "statistics": {"total_words": 2400, "total_characters": 14100, "total_lines": 210}
        }),
    );
    let dispatcher = Dispatcher::new(mock.clone());

    let result = dispatcher
        .submit_analysis(&"a.pdf".into(), AnalysisKind::All)
        .await
        .unwrap();

    match result {
        AnalysisResult::Combined {
            summary,
            word_frequency,
            statistics,
        } => {
            assert_eq!(summary.as_deref(), Some("Quarterly cost report."));
            assert_eq!(word_frequency.unwrap().words[0].count, 31);
            assert_eq!(statistics.unwrap().total_words, 2400);
        }
        other => panic!("Expected Combined, got {:?}", other),
    }
}

#[tokio::test]
async fn test_backend_detail_is_shown_and_gate_released() {
    let mock = Arc::new(MockBackend::new());
    mock.queue_error(
        Endpoint::QuerySingle,
        ClientError::Backend {
            status: 404,
            detail: "file not found".into(),
        },
    );
    let dispatcher = Dispatcher::new(mock.clone());

    let err = dispatcher
        .submit_query("cost", &select("gone.pdf"), &TranslationConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "file not found");
    assert_eq!(err.to_string(), "file not found");
    assert_eq!(dispatcher.phase(), OperationPhase::Idle);
    assert!(!dispatcher.is_busy());
}

#[tokio::test]
async fn test_second_dispatch_while_busy_is_rejected_without_backend_call() {
    let mock = Arc::new(MockBackend::new());
    mock.hold();
    let dispatcher = Arc::new(Dispatcher::new(mock.clone()));
    let mut phases = dispatcher.subscribe();

    let first = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .submit_query("cost", &select("a.pdf"), &TranslationConfig::default())
                .await
        })
    };

    phases
        .wait_for(|phase| *phase == OperationPhase::AwaitingResponse)
        .await
        .unwrap();
    assert!(dispatcher.is_busy());

    let err = dispatcher
        .submit_analysis(&"a.pdf".into(), AnalysisKind::Summary)
        .await
        .unwrap_err();
    assert!(err.is_busy());
    let err = dispatcher
        .submit_translation("Kosten", TranslationConfig::default().languages())
        .await
        .unwrap_err();
    assert!(err.is_busy());
    assert_eq!(mock.call_count(), 1);

    mock.release();
    first.await.unwrap().unwrap();
    assert!(!dispatcher.is_busy());

    // The gate is reusable once released.
    dispatcher
        .submit_query("cost", &select("a.pdf"), &TranslationConfig::default())
        .await
        .unwrap();
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_validation_happens_after_busy_check() {
    let mock = Arc::new(MockBackend::new());
    mock.hold();
    let dispatcher = Arc::new(Dispatcher::new(mock.clone()));
    let mut phases = dispatcher.subscribe();

    let first = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .submit_analysis(&"a.pdf".into(), AnalysisKind::Statistics)
                .await
        })
    };
    phases
        .wait_for(|phase| *phase == OperationPhase::AwaitingResponse)
        .await
        .unwrap();

    // An invalid request while busy reports busy, not validation.
    let err = dispatcher
        .submit_query("", &SelectionState::new(), &TranslationConfig::default())
        .await
        .unwrap_err();
    assert!(err.is_busy());

    mock.release();
    first.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_upload_refreshes_registry() {
    let mock = Arc::new(MockBackend::with_documents(&["a.pdf"]));
    mock.queue_json(Endpoint::Upload, json!({"message": "uploaded"}));
    mock.queue_json(Endpoint::ListDocuments, json!({"pdfs": ["a.pdf", "new.pdf"]}));
    let mut session = Session::with_backend(DocQueryConfig::default(), mock.clone());
    session.start().await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.pdf");
    std::fs::write(&path, b"%PDF-1.7").unwrap();

    let receipt = session.upload(&path).await.unwrap();
    assert_eq!(receipt.document, DocumentRef::from("new.pdf"));
    assert!(session.registry().contains(&"new.pdf".into()).await);
    assert_eq!(mock.calls_to(Endpoint::ListDocuments).len(), 2);
}
