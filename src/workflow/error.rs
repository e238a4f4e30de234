//! Workflow error taxonomy
//!
//! Every failure an action can surface, with the user-facing message as its
//! `Display`, plus the classification of transport errors per action.

use thiserror::Error;

use crate::api::ApiError;
use crate::validation::ValidationError;

/// Coarse classification of a [`WorkflowError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local precondition, never reached the network
    Validation,
    /// No response received
    Transport,
    /// 4xx the workflow knows how to explain
    Client,
    /// Anything else; generic retry message
    Server,
    /// The backend reported the session as failed
    Session,
    /// Client-side attempt budget exhausted
    PollingTimeout,
    /// Non-fatal notice, the workflow still completed
    Informational,
}

/// User-facing workflow failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("No connection to server. Check your internet connection.")]
    Connection,

    #[error("Text must be between 1000 and 10000 characters")]
    InputRejected,

    #[error("AI service is currently unavailable. Please try again later.")]
    AiUnavailable,

    #[error("An error occurred. Please try again.")]
    CreateFailed,

    #[error("Generation failed. Please try again.")]
    GenerationFailed,

    #[error("Generation is taking too long. Please try again.")]
    PollingTimeout,

    #[error("Error checking session status. Please try again.")]
    PollingFailed,

    #[error("AI generated no suggestions. Try with different text.")]
    NoSuggestions,

    #[error("Invalid request. Check your selections.")]
    ApprovalRejected,

    #[error("Session not found.")]
    SessionNotFound,

    #[error("Error saving flashcards. Please try again.")]
    SaveFailed,
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Validation(_) => ErrorKind::Validation,
            WorkflowError::Connection => ErrorKind::Transport,
            WorkflowError::InputRejected
            | WorkflowError::AiUnavailable
            | WorkflowError::ApprovalRejected
            | WorkflowError::SessionNotFound => ErrorKind::Client,
            WorkflowError::CreateFailed
            | WorkflowError::PollingFailed
            | WorkflowError::SaveFailed => ErrorKind::Server,
            WorkflowError::GenerationFailed => ErrorKind::Session,
            WorkflowError::PollingTimeout => ErrorKind::PollingTimeout,
            WorkflowError::NoSuggestions => ErrorKind::Informational,
        }
    }
}

/// Map a failed `POST /ai/sessions`
pub fn classify_create_error(err: &ApiError) -> WorkflowError {
    match err {
        ApiError::Api { code: 400, .. } => WorkflowError::InputRejected,
        ApiError::Api { code: 422, .. } => WorkflowError::AiUnavailable,
        ApiError::Network(_) => WorkflowError::Connection,
        ApiError::Api { .. } | ApiError::Parse(_) => WorkflowError::CreateFailed,
    }
}

/// Map a failed `POST /ai/sessions/{id}/approve`
pub fn classify_approve_error(err: &ApiError) -> WorkflowError {
    match err {
        ApiError::Api { code: 400, .. } => WorkflowError::ApprovalRejected,
        ApiError::Api { code: 404, .. } => WorkflowError::SessionNotFound,
        ApiError::Network(_) => WorkflowError::Connection,
        ApiError::Api { .. } | ApiError::Parse(_) => WorkflowError::SaveFailed,
    }
}
