//! Translation coordinator.
//!
//! Both translation paths share one language pair taken from
//! [`TranslationConfig`]: a standalone translation of free text, and a query
//! that is translated and searched in a single backend call.

use crate::config::TranslationConfig;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::selection::SelectionState;
use crate::types::{QueryOutcome, TranslationOutcome};

pub struct TranslationCoordinator<'a> {
    dispatcher: &'a Dispatcher,
    config: TranslationConfig,
}

impl<'a> TranslationCoordinator<'a> {
    pub fn new(dispatcher: &'a Dispatcher, config: TranslationConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Translate `text` with the configured pair. Query state is untouched,
    /// but the call still occupies the busy gate.
    pub async fn translate_only(&self, text: &str) -> Result<TranslationOutcome> {
        self.dispatcher
            .submit_translation(text, self.config.languages())
            .await
    }

    /// Submit `question` in translated mode regardless of the toggle.
    pub async fn translate_and_query(
        &self,
        question: &str,
        selection: &SelectionState,
    ) -> Result<QueryOutcome> {
        let config = TranslationConfig {
            enabled: true,
            ..self.config
        };
        self.dispatcher
            .submit_query(question, selection, &config)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BackendCall, MockBackend};
    use crate::types::{DocumentRef, Language, QueryMode, SearchScope};
    use crate::wire::Endpoint;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_translate_only_uses_configured_pair() {
        let mock = Arc::new(MockBackend::new());
        mock.queue_json(
            Endpoint::Translate,
            json!({
                "original_text": "Die Kosten steigen",
                "translated_text": "The costs rise",
                "analysis": {
                    "words_translated": 3,
                    "total_words": 3,
                    "coverage_percentage": 100.0,
                    "untranslated_words": []
                }
            }),
        );
        let dispatcher = Dispatcher::new(mock.clone());
        let coordinator = TranslationCoordinator::new(&dispatcher, TranslationConfig::default());

        let outcome = coordinator
            .translate_only("Die Kosten steigen")
            .await
            .unwrap();
        assert_eq!(outcome.translated_text, "The costs rise");
        assert_eq!(outcome.coverage_percentage, 100.0);

        match &mock.calls()[0] {
            BackendCall::Translate(body) => {
                assert_eq!(body.source_lang, "de");
                assert_eq!(body.target_lang, "en");
            }
            other => panic!("Expected Translate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_and_query_forces_translated_mode() {
        let mock = Arc::new(MockBackend::new());
        let dispatcher = Dispatcher::new(mock.clone());
        let config = TranslationConfig {
            enabled: false,
            source_lang: Language::En,
            target_lang: Language::Es,
        };
        let coordinator = TranslationCoordinator::new(&dispatcher, config);
        let mut selection = SelectionState::new();
        selection.select_single(DocumentRef::from("a.pdf"));

        let outcome = coordinator
            .translate_and_query("cost", &selection)
            .await
            .unwrap();
        assert_eq!(outcome.mode, QueryMode::Translated(SearchScope::Single));
        assert_eq!(mock.calls_to(Endpoint::QueryTranslated).len(), 1);
        assert!(mock.calls_to(Endpoint::QuerySingle).is_empty());
    }
}
