//! Workflow state
//!
//! Everything the presentation layer reads. Transitions live in
//! `lifecycle.rs`; mutation goes through the workflow controller.

use super::error::WorkflowError;
use super::selection::{EditedContent, SelectionState};
use crate::api::{SessionStatus, Suggestion};

mod lifecycle;

/// Client-side status of the current generation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowStatus {
    /// No session, or a cycle ended without reaching the backend's verdict
    #[default]
    Idle,
    Pending,
    Completed,
    Failed,
}

impl From<SessionStatus> for WorkflowStatus {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Pending => WorkflowStatus::Pending,
            SessionStatus::Completed => WorkflowStatus::Completed,
            SessionStatus::Failed => WorkflowStatus::Failed,
        }
    }
}

/// Identifies the session a polling task works for
///
/// Results are applied only while both fields still match the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PollTarget {
    pub cycle: u64,
    pub session_id: String,
}

/// Snapshot-able generation workflow state
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    input_text: String,
    session_id: Option<String>,
    session_created_at: Option<String>,
    status: WorkflowStatus,
    suggestions: Vec<Suggestion>,
    selection: SelectionState,
    generating: bool,
    saving: bool,
    error: Option<WorkflowError>,
    /// Bumped on every generation cycle; stale poll results carry an old value
    cycle: u64,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Creation timestamp reported by the backend, if any
    pub fn session_created_at(&self) -> Option<&str> {
        self.session_created_at.as_deref()
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// True from the start of a cycle, before the create call, until the
    /// session resolves, creation fails or the cycle is abandoned
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.selected_count()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(self.suggestions.len())
    }

    pub fn suggestion(&self, id: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.suggestion_id == id)
    }

    /// Front/back to show for `id`, with edits applied
    pub fn display_content(&self, id: &str) -> Option<EditedContent> {
        self.selection.display_content(id, self.suggestion(id))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;
