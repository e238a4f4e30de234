//! Flashcard generation workflow
//!
//! Drives one generation cycle at a time: validate the input, create a
//! session, poll it in a background task until it resolves, then let the
//! caller select and edit suggestions and approve them.
//!
//! State lives behind a shared mutex so the polling task can publish
//! results; callers read it through [`GenerationWorkflow::snapshot`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

mod approval;
mod error;
mod polling;
mod selection;
mod state;

pub use approval::build_approval_request;
pub use error::{ErrorKind, WorkflowError, classify_approve_error, classify_create_error};
pub use polling::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL, PollingConfig};
pub use selection::{EditedContent, SelectionState, SuggestionField};
pub use state::{WorkflowState, WorkflowStatus};

use crate::api::GenerationApi;
use crate::validation::{ValidationError, validate_input_text};
use polling::run_polling;
use state::PollTarget;

/// Generation workflow controller
///
/// At most one polling task is alive at a time. Dropping the controller
/// cancels it.
pub struct GenerationWorkflow<A> {
    api: Arc<A>,
    state: Arc<Mutex<WorkflowState>>,
    polling: PollingConfig,
    poll_cancel: Option<CancellationToken>,
    poll_task: Option<JoinHandle<()>>,
}

impl<A> GenerationWorkflow<A> {
    pub fn new(api: Arc<A>, polling: PollingConfig) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(WorkflowState::new())),
            polling,
            poll_cancel: None,
            poll_task: None,
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> WorkflowState {
        self.state.lock().clone()
    }

    pub fn status(&self) -> WorkflowStatus {
        self.state.lock().status()
    }

    pub fn is_generating(&self) -> bool {
        self.state.lock().is_generating()
    }

    pub fn error(&self) -> Option<WorkflowError> {
        self.state.lock().error().cloned()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error_message()
    }

    pub fn selected_count(&self) -> usize {
        self.state.lock().selected_count()
    }

    pub fn is_all_selected(&self) -> bool {
        self.state.lock().is_all_selected()
    }

    pub fn display_content(&self, suggestion_id: &str) -> Option<EditedContent> {
        self.state.lock().display_content(suggestion_id)
    }

    /// Replace the input text
    ///
    /// Clears the error if it came from validation.
    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.state.lock().set_input_text(text.into());
    }

    pub fn toggle_selection(&mut self, suggestion_id: &str) {
        self.state.lock().toggle_selection(suggestion_id);
    }

    /// Select every suggestion, or clear the selection if all are selected
    pub fn toggle_all_selections(&mut self) {
        self.state.lock().toggle_all_selections();
    }

    /// Edit one side of a suggestion
    ///
    /// Any value is accepted here; bounds are checked when saving.
    pub fn edit_suggestion(
        &mut self,
        suggestion_id: &str,
        field: SuggestionField,
        value: impl Into<String>,
    ) {
        self.state
            .lock()
            .edit_suggestion(suggestion_id, field, value.into());
    }

    /// Whether a polling task is still running
    pub fn is_polling(&self) -> bool {
        self.poll_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Wait for the current polling task to finish
    pub async fn wait_for_polling(&mut self) {
        if let Some(task) = self.poll_task.take()
            && let Err(e) = task.await
        {
            log::warn!("Polling task ended abnormally: {}", e);
        }
    }

    /// Stop the polling task without touching the state
    ///
    /// A request already in flight may complete but its result is discarded.
    fn stop_polling(&mut self) {
        if let Some(cancel) = self.poll_cancel.take() {
            cancel.cancel();
        }
        self.poll_task = None;
    }

    /// Abandon the current generation cycle
    ///
    /// Stops polling and leaves the workflow idle so a new cycle can start.
    pub fn cancel_polling(&mut self) {
        self.stop_polling();
        self.state.lock().abandon_cycle();
    }
}

impl<A: GenerationApi + 'static> GenerationWorkflow<A> {
    /// Validate the input and start a new generation cycle
    ///
    /// Returns once the session is created (or creation failed); results
    /// arrive in the state as the polling task observes them. Rejected while
    /// a cycle is already generating.
    pub async fn generate_flashcards(&mut self) {
        let input_text = {
            let mut state = self.state.lock();
            if state.is_generating() {
                log::debug!("Generation already in progress, ignoring request");
                state.set_error(ValidationError::GenerationInProgress.into());
                return;
            }
            if let Err(e) = validate_input_text(state.input_text()) {
                state.set_error(e.into());
                return;
            }
            state.input_text().trim().to_string()
        };

        self.stop_polling();
        let cycle = self.state.lock().begin_cycle();
        let guard = CreateGuard::new(Arc::clone(&self.state), cycle);
        log::info!(
            "Creating generation session for {} characters",
            input_text.chars().count()
        );

        let result = self.api.create_session(&input_text).await;
        guard.disarm();

        match result {
            Ok(response) => {
                log::debug!("Created session {}", response.session_id);
                let target = self.state.lock().session_created(cycle, &response);
                if let Some(target) = target {
                    self.start_polling(target);
                }
            }
            Err(e) => {
                log::warn!("Failed to create generation session: {}", e);
                self.state
                    .lock()
                    .creation_failed(cycle, classify_create_error(&e));
            }
        }
    }

    /// Approve the selected suggestions, with edits applied
    ///
    /// Returns true only when the backend accepted the approval.
    pub async fn save_approved(&mut self) -> bool {
        let (session_id, request) = {
            let mut state = self.state.lock();
            match state.begin_save() {
                Ok(prepared) => prepared,
                Err(e) => {
                    state.set_error(e.into());
                    return false;
                }
            }
        };

        log::info!(
            "Approving {} suggestions for session {}",
            request.approved_suggestions.len(),
            session_id
        );

        match self.api.approve_session(&session_id, &request).await {
            Ok(()) => {
                self.state.lock().save_finished(Ok(()));
                true
            }
            Err(e) => {
                log::warn!("Failed to approve session {}: {}", session_id, e);
                self.state
                    .lock()
                    .save_finished(Err(classify_approve_error(&e)));
                false
            }
        }
    }

    fn start_polling(&mut self, target: PollTarget) {
        self.stop_polling();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_polling(
            Arc::clone(&self.api),
            Arc::clone(&self.state),
            target,
            self.polling,
            cancel.clone(),
        ));

        self.poll_cancel = Some(cancel);
        self.poll_task = Some(task);
    }
}

/// Abandons the cycle if `generate_flashcards` is dropped mid-create
struct CreateGuard {
    state: Option<Arc<Mutex<WorkflowState>>>,
    cycle: u64,
}

impl CreateGuard {
    fn new(state: Arc<Mutex<WorkflowState>>, cycle: u64) -> Self {
        Self {
            state: Some(state),
            cycle,
        }
    }

    /// The create call returned; its result is applied by the caller
    fn disarm(mut self) {
        self.state = None;
    }
}

impl Drop for CreateGuard {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            log::debug!("Session creation dropped before completing, abandoning cycle");
            state.lock().creation_abandoned(self.cycle);
        }
    }
}

impl<A> Drop for GenerationWorkflow<A> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod workflow_tests;
