//! Selection set and edit overlay for generated suggestions
//!
//! Suggestions themselves are immutable; this tracks which ones are marked
//! for approval and the user's edits layered on top of them.

use std::collections::{BTreeMap, BTreeSet};

use crate::api::Suggestion;
use crate::validation::{ValidationError, validate_flashcard_content};

/// Which side of a flashcard an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionField {
    Front,
    Back,
}

/// Overridden content for one suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedContent {
    pub front: String,
    pub back: String,
}

impl EditedContent {
    fn from_suggestion(suggestion: Option<&Suggestion>) -> Self {
        match suggestion {
            Some(s) => Self {
                front: s.front_content.clone(),
                back: s.back_content.clone(),
            },
            None => Self {
                front: String::new(),
                back: String::new(),
            },
        }
    }
}

/// Selection and overlay state
///
/// Both collections are ordered so iteration (and the approval request built
/// from them) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<String>,
    edits: BTreeMap<String, EditedContent>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id` in the selection set
    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Clear the selection if its size equals the suggestion count,
    /// otherwise select every suggestion
    pub fn toggle_all(&mut self, suggestions: &[Suggestion]) {
        if self.selected.len() == suggestions.len() {
            self.selected.clear();
        } else {
            self.selected = suggestions
                .iter()
                .map(|s| s.suggestion_id.clone())
                .collect();
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// All of a non-empty list selected
    pub fn is_all_selected(&self, suggestion_count: usize) -> bool {
        suggestion_count > 0 && self.selected.len() == suggestion_count
    }

    /// Set one field of the overlay entry for `id`
    ///
    /// A new entry is seeded from `original` so the other field keeps its
    /// displayed value. No length check here; see [`Self::validate_edits`].
    pub fn edit(
        &mut self,
        id: &str,
        field: SuggestionField,
        value: String,
        original: Option<&Suggestion>,
    ) {
        let entry = self
            .edits
            .entry(id.to_string())
            .or_insert_with(|| EditedContent::from_suggestion(original));

        match field {
            SuggestionField::Front => entry.front = value,
            SuggestionField::Back => entry.back = value,
        }
    }

    pub fn edited(&self, id: &str) -> Option<&EditedContent> {
        self.edits.get(id)
    }

    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Content to show for `id`: the overlay entry, else the original
    pub fn display_content(
        &self,
        id: &str,
        original: Option<&Suggestion>,
    ) -> Option<EditedContent> {
        match self.edits.get(id) {
            Some(edited) => Some(edited.clone()),
            None => original.map(|s| EditedContent::from_suggestion(Some(s))),
        }
    }

    /// Every overlay entry must satisfy the flashcard content bounds
    pub fn validate_edits(&self) -> Result<(), ValidationError> {
        let all_valid = self.edits.values().all(|content| {
            validate_flashcard_content(&content.front, "Question").is_ok()
                && validate_flashcard_content(&content.back, "Answer").is_ok()
        });

        if all_valid {
            Ok(())
        } else {
            Err(ValidationError::InvalidEditedContent)
        }
    }

    /// Drop both the selection and the overlay
    pub fn clear(&mut self) {
        self.selected.clear();
        self.edits.clear();
    }
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod selection_tests;
