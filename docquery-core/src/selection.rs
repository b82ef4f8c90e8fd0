//! Document selection state and query mode resolution.
//!
//! `SelectionState` holds the three mutually exclusive ways of targeting
//! documents. Every mutation clears the competing fields, so the state never
//! shows a contradictory selection. `resolve_mode` maps a selection plus the
//! translation toggle onto exactly one [`QueryMode`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{DocumentRef, QueryMode, SearchScope, TargetSet};

/// Which document(s) the next query targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    single: Option<DocumentRef>,
    /// Insertion ordered, duplicate free.
    multi: Vec<DocumentRef>,
    search_all: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(&self) -> Option<&DocumentRef> {
        self.single.as_ref()
    }

    pub fn multi(&self) -> &[DocumentRef] {
        &self.multi
    }

    pub fn search_all(&self) -> bool {
        self.search_all
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_none() && self.multi.is_empty() && !self.search_all
    }

    /// Target one document. Clears the multi-selection and "all".
    pub fn select_single(&mut self, doc: DocumentRef) {
        self.multi.clear();
        self.search_all = false;
        self.single = Some(doc);
    }

    /// Drop the single selection without choosing anything else.
    pub fn clear_single(&mut self) {
        self.single = None;
    }

    /// Add `doc` to the multi-selection, or remove it if already present.
    /// Clears the single selection and "all". Returns whether `doc` is now selected.
    pub fn toggle_multi(&mut self, doc: DocumentRef) -> bool {
        self.single = None;
        self.search_all = false;
        if let Some(pos) = self.multi.iter().position(|d| d == &doc) {
            self.multi.remove(pos);
            false
        } else {
            self.multi.push(doc);
            true
        }
    }

    /// Turn "search all documents" on or off. Turning it on clears the
    /// single and multi selections.
    pub fn set_search_all(&mut self, on: bool) {
        if on {
            self.single = None;
            self.multi.clear();
        }
        self.search_all = on;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Documents referenced by this selection.
    pub fn referenced(&self) -> Vec<&DocumentRef> {
        self.single.iter().chain(self.multi.iter()).collect()
    }

    /// Remove every referenced document `keep` rejects. Returns the removed ones.
    pub fn retain(&mut self, mut keep: impl FnMut(&DocumentRef) -> bool) -> Vec<DocumentRef> {
        let mut removed = Vec::new();
        if let Some(doc) = self.single.take() {
            if keep(&doc) {
                self.single = Some(doc);
            } else {
                removed.push(doc);
            }
        }
        let mut kept = Vec::with_capacity(self.multi.len());
        for doc in self.multi.drain(..) {
            if keep(&doc) {
                kept.push(doc);
            } else {
                removed.push(doc);
            }
        }
        self.multi = kept;
        removed
    }

    /// Number of active targeting modes. Always 0 or 1.
    pub fn active_count(&self) -> usize {
        usize::from(self.single.is_some())
            + usize::from(!self.multi.is_empty())
            + usize::from(self.search_all)
    }

    /// Snapshot the documents a query would target.
    pub fn target_set(&self) -> Result<TargetSet, ValidationError> {
        if self.search_all {
            Ok(TargetSet::All)
        } else if !self.multi.is_empty() {
            Ok(TargetSet::Explicit(self.multi.clone()))
        } else if let Some(doc) = &self.single {
            Ok(TargetSet::Single(doc.clone()))
        } else {
            Err(ValidationError::NoTarget)
        }
    }
}

/// Resolve the query mode for a selection and translation toggle.
///
/// Precedence is "all", then the multi-selection, then the single document.
pub fn resolve_mode(
    selection: &SelectionState,
    translation_enabled: bool,
) -> Result<QueryMode, ValidationError> {
    let scope = selection.target_set()?.scope();
    Ok(if translation_enabled {
        QueryMode::Translated(scope)
    } else {
        match scope {
            SearchScope::Single => QueryMode::Single,
            SearchScope::MultiExplicit => QueryMode::MultiExplicit,
            SearchScope::MultiAll => QueryMode::MultiAll,
        }
    })
}
