//! Approval request construction

use std::collections::HashSet;

use super::selection::SelectionState;
use crate::api::{ApproveSessionRequest, ApprovedSuggestion, Suggestion};

/// Build the approve payload from the current suggestions and selection
///
/// Entries follow suggestion-list order. Selected ids that are not in the
/// list are sent after them, in sorted order, and left for the backend to
/// reject. Only edited entries carry content fields.
pub fn build_approval_request(
    suggestions: &[Suggestion],
    selection: &SelectionState,
) -> ApproveSessionRequest {
    let mut approved = Vec::with_capacity(selection.selected_count());

    for suggestion in suggestions
        .iter()
        .filter(|s| selection.is_selected(&s.suggestion_id))
    {
        approved.push(approved_entry(&suggestion.suggestion_id, selection));
    }

    let known: HashSet<&str> = suggestions
        .iter()
        .map(|s| s.suggestion_id.as_str())
        .collect();
    for id in selection.selected_ids().filter(|id| !known.contains(id)) {
        approved.push(approved_entry(id, selection));
    }

    ApproveSessionRequest {
        approved_suggestions: approved,
    }
}

fn approved_entry(id: &str, selection: &SelectionState) -> ApprovedSuggestion {
    match selection.edited(id) {
        Some(edited) => ApprovedSuggestion {
            suggestion_id: id.to_string(),
            front_content: Some(edited.front.clone()),
            back_content: Some(edited.back.clone()),
        },
        None => ApprovedSuggestion {
            suggestion_id: id.to_string(),
            front_content: None,
            back_content: None,
        },
    }
}

#[cfg(test)]
#[path = "approval_tests.rs"]
mod approval_tests;
