//! Generation API abstraction
//!
//! Defines the `GenerationApi` collaborator trait consumed by the workflow,
//! the `ApiError` type shared by every implementation, and the HTTP client
//! that also covers the auth and flashcard listing endpoints.

use std::future::Future;

use thiserror::Error;

mod client;
pub mod types;

pub use client::HttpClient;
pub use types::{
    AiSession, ApproveSessionRequest, ApprovedSuggestion, CreateSessionResponse, FlashcardSource,
    FlashcardSummary, FlashcardsPage, ListFlashcardsParams, LoginResponse, PageInfo,
    RegisterRequest, RegisterResponse, SessionStatus, Suggestion, SuggestionsResponse,
};

/// Errors that can occur while talking to the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (connection refused, timeout, DNS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    /// The response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { code, .. } => Some(*code),
            ApiError::Network(_) | ApiError::Parse(_) => None,
        }
    }

    /// True when the request never got a response
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Backend operations the generation workflow depends on
///
/// Implemented by [`HttpClient`] for the real backend. Futures must be `Send`
/// because the polling loop runs as a spawned task.
pub trait GenerationApi: Send + Sync {
    /// `POST /ai/sessions`
    fn create_session(
        &self,
        input_text: &str,
    ) -> impl Future<Output = Result<CreateSessionResponse, ApiError>> + Send;

    /// `GET /ai/sessions/{sessionId}`
    fn get_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<AiSession, ApiError>> + Send;

    /// `GET /ai/sessions/{sessionId}/suggestions`
    fn get_suggestions(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<SuggestionsResponse, ApiError>> + Send;

    /// `POST /ai/sessions/{sessionId}/approve`
    fn approve_session(
        &self,
        session_id: &str,
        request: &ApproveSessionRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
