//! Wire types for the generation, flashcard and auth endpoints
//!
//! Field names follow the backend's camelCase JSON.

use serde::{Deserialize, Serialize};

/// Session status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Pending,
    Completed,
    Failed,
}

/// Body of `POST /ai/sessions`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest<'a> {
    pub input_text: &'a str,
}

/// Response of `POST /ai/sessions`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response of `GET /ai/sessions/{sessionId}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSession {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub generated_count: u32,
    #[serde(default)]
    pub accepted_count: u32,
    #[serde(default)]
    pub ai_model: Option<String>,
    #[serde(default)]
    pub api_cost: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One candidate flashcard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub suggestion_id: String,
    pub front_content: String,
    pub back_content: String,
}

/// Response of `GET /ai/sessions/{sessionId}/suggestions`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsResponse {
    pub session_id: String,
    pub status: SessionStatus,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

/// One entry of an approval request
///
/// Content fields are omitted for unedited suggestions; the backend keeps the
/// original content for omitted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedSuggestion {
    pub suggestion_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_content: Option<String>,
}

/// Body of `POST /ai/sessions/{sessionId}/approve`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveSessionRequest {
    pub approved_suggestions: Vec<ApprovedSuggestion>,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub username: String,
    pub access_token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Result of `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponse {
    pub user_id: String,
}

/// How a saved flashcard came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlashcardSource {
    /// Approved unchanged from an AI suggestion
    Ai,
    /// AI suggestion edited before approval
    AiUser,
    /// Written by the user
    User,
}

impl FlashcardSource {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashcardSource::Ai => "AI",
            FlashcardSource::AiUser => "AI_USER",
            FlashcardSource::User => "USER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FlashcardSource::Ai => "AI Generated",
            FlashcardSource::AiUser => "AI Generated (Edited)",
            FlashcardSource::User => "User Created",
        }
    }
}

/// One saved flashcard in a listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSummary {
    pub flashcard_id: String,
    pub front_content: String,
    pub back_content: String,
    pub source: FlashcardSource,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Pagination block of a listing; `number` is 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// Response of `GET /flashcards`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlashcardsPage {
    #[serde(default)]
    pub content: Vec<FlashcardSummary>,
    pub page: PageInfo,
}

/// Default page size of `GET /flashcards`
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the backend honors
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default listing order, newest first
pub const DEFAULT_SORT: &str = "createdAt,desc";

/// Query of `GET /flashcards`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFlashcardsParams {
    /// 0-based page number
    pub page: u32,
    pub size: u32,
    /// `field,asc|desc`
    pub sort: String,
    /// Only flashcards from this source; all when `None`
    pub source: Option<FlashcardSource>,
}

impl Default for ListFlashcardsParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
            source: None,
        }
    }
}

/// Query string form of [`ListFlashcardsParams`]
#[derive(Debug, Serialize)]
pub(crate) struct FlashcardsQuery<'a> {
    page: u32,
    size: u32,
    sort: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'static str>,
}

impl<'a> From<&'a ListFlashcardsParams> for FlashcardsQuery<'a> {
    fn from(params: &'a ListFlashcardsParams) -> Self {
        Self {
            page: params.page,
            size: params.size,
            sort: &params.sort,
            source: params.source.map(FlashcardSource::as_str),
        }
    }
}

/// Error body returned by the backend on failures
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}
