//! Workflow state transitions
//!
//! Poll-driven transitions take the [`PollTarget`] of the task reporting
//! them and return without effect when it no longer matches.

use super::{PollTarget, WorkflowState, WorkflowStatus};
use crate::api::{ApproveSessionRequest, CreateSessionResponse, SessionStatus, Suggestion};
use crate::validation::ValidationError;
use crate::workflow::approval::build_approval_request;
use crate::workflow::error::WorkflowError;
use crate::workflow::selection::SuggestionField;

impl WorkflowState {
    /// Replace the input text, clearing an error about the previous text
    pub(crate) fn set_input_text(&mut self, text: String) {
        self.input_text = text;
        if matches!(
            self.error,
            Some(WorkflowError::Validation(
                ValidationError::InputTextRequired
                    | ValidationError::InputTextTooShort
                    | ValidationError::InputTextTooLong
                    | ValidationError::GenerationInProgress
            ))
        ) {
            self.error = None;
        }
    }

    pub(crate) fn set_error(&mut self, error: WorkflowError) {
        self.error = Some(error);
    }

    /// Start a generation cycle
    ///
    /// Drops the previous session, suggestions, selection and overlay, and
    /// returns the new cycle number.
    pub(crate) fn begin_cycle(&mut self) -> u64 {
        self.cycle = self.cycle.wrapping_add(1);
        self.generating = true;
        self.error = None;
        self.status = WorkflowStatus::Idle;
        self.session_id = None;
        self.session_created_at = None;
        self.suggestions.clear();
        self.selection.clear();
        self.cycle
    }

    /// Record the created session; `None` if the cycle was superseded
    pub(crate) fn session_created(
        &mut self,
        cycle: u64,
        response: &CreateSessionResponse,
    ) -> Option<PollTarget> {
        if cycle != self.cycle {
            return None;
        }

        self.session_id = Some(response.session_id.clone());
        self.session_created_at = response.created_at.clone();
        self.status = response.status.into();

        Some(PollTarget {
            cycle,
            session_id: response.session_id.clone(),
        })
    }

    pub(crate) fn creation_failed(&mut self, cycle: u64, error: WorkflowError) {
        if cycle != self.cycle {
            return;
        }
        self.generating = false;
        self.status = WorkflowStatus::Idle;
        self.error = Some(error);
    }

    /// The create call for `cycle` was dropped before it returned
    pub(crate) fn creation_abandoned(&mut self, cycle: u64) {
        if cycle == self.cycle {
            self.abandon_cycle();
        }
    }

    /// Abandon the current cycle without an error
    ///
    /// Bumps the cycle so late results from it are discarded.
    pub(crate) fn abandon_cycle(&mut self) {
        self.cycle = self.cycle.wrapping_add(1);
        if self.generating {
            self.generating = false;
            self.status = WorkflowStatus::Idle;
        }
    }

    pub(crate) fn is_current(&self, target: &PollTarget) -> bool {
        target.cycle == self.cycle && self.session_id.as_deref() == Some(target.session_id.as_str())
    }

    /// Apply a polled status; false if the target is stale
    pub(crate) fn observe_status(&mut self, target: &PollTarget, status: SessionStatus) -> bool {
        if !self.is_current(target) {
            return false;
        }
        self.status = status.into();
        true
    }

    /// Store the fetched suggestions and end the cycle
    pub(crate) fn complete(&mut self, target: &PollTarget, suggestions: Vec<Suggestion>) {
        if !self.is_current(target) {
            return;
        }
        self.error = if suggestions.is_empty() {
            Some(WorkflowError::NoSuggestions)
        } else {
            None
        };
        self.suggestions = suggestions;
        self.selection.clear();
        self.status = WorkflowStatus::Completed;
        self.generating = false;
    }

    pub(crate) fn generation_failed(&mut self, target: &PollTarget) {
        if !self.is_current(target) {
            return;
        }
        self.status = WorkflowStatus::Failed;
        self.generating = false;
        self.error = Some(WorkflowError::GenerationFailed);
    }

    pub(crate) fn polling_timed_out(&mut self, target: &PollTarget) {
        if !self.is_current(target) {
            return;
        }
        self.status = WorkflowStatus::Idle;
        self.generating = false;
        self.error = Some(WorkflowError::PollingTimeout);
    }

    /// A status or suggestions request failed; the last status is kept
    pub(crate) fn polling_failed(&mut self, target: &PollTarget) {
        if !self.is_current(target) {
            return;
        }
        self.generating = false;
        self.error = Some(WorkflowError::PollingFailed);
    }

    pub(crate) fn toggle_selection(&mut self, id: &str) {
        self.selection.toggle(id);
    }

    pub(crate) fn toggle_all_selections(&mut self) {
        self.selection.toggle_all(&self.suggestions);
    }

    pub(crate) fn edit_suggestion(&mut self, id: &str, field: SuggestionField, value: String) {
        let original = self.suggestions.iter().find(|s| s.suggestion_id == id);
        self.selection.edit(id, field, value, original);
    }

    /// Check the approval preconditions and mark the save in flight
    ///
    /// Returns the session id and the request to send.
    pub(crate) fn begin_save(&mut self) -> Result<(String, ApproveSessionRequest), ValidationError> {
        if self.selection.selected_count() == 0 {
            return Err(ValidationError::EmptySelection);
        }
        let session_id = self
            .session_id
            .clone()
            .ok_or(ValidationError::SessionNotInitialized)?;
        self.selection.validate_edits()?;

        let request = build_approval_request(&self.suggestions, &self.selection);
        self.saving = true;
        self.error = None;
        Ok((session_id, request))
    }

    pub(crate) fn save_finished(&mut self, result: Result<(), WorkflowError>) {
        self.saving = false;
        if let Err(error) = result {
            self.error = Some(error);
        }
    }
}
