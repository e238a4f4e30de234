//! HTTP client for the flashcard backend
//!
//! Wraps a `reqwest::Client` with the base URL, request timeout and bearer
//! token handling shared by every endpoint.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::types::{CreateSessionRequest, ErrorBody, FlashcardsQuery, LoginRequest};
use super::{
    AiSession, ApiError, ApproveSessionRequest, CreateSessionResponse, FlashcardsPage,
    GenerationApi, ListFlashcardsParams, LoginResponse, RegisterRequest, RegisterResponse,
    SuggestionsResponse,
};
use crate::auth::TokenStore;
use crate::config::ApiConfig;
use crate::error::FlashgenError;

/// Backend HTTP client
pub struct HttpClient {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client for `base_url` with a per-request timeout
    ///
    /// `base_url` may carry a path prefix; endpoint paths are appended to it.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url).map_err(ApiError::Network)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// Create a client from the `[api]` config section
    pub fn from_config(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, FlashgenError> {
        if config.base_url.trim().is_empty() {
            return Err(FlashgenError::InvalidConfig(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if let Err(e) = parse_base_url(config.base_url.trim()) {
            return Err(FlashgenError::InvalidConfig(format!("api.base_url: {}", e)));
        }
        if config.timeout_secs == 0 {
            return Err(FlashgenError::InvalidConfig(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(Self::new(
            config.base_url.trim(),
            Duration::from_secs(config.timeout_secs),
            tokens,
        )?)
    }

    /// Endpoint URL built from path segments
    ///
    /// Each segment is percent-encoded, so an id containing `/` or `?` stays
    /// inside its own segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and turn non-success statuses into `ApiError::Api`
    ///
    /// A 401 clears the token store: the credential is expired or revoked.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            log::debug!("Request failed without response: {}", e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Backend rejected credentials, clearing stored token");
            self.tokens.clear();
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            code: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                ApiError::Parse(e.to_string())
            } else {
                ApiError::Network(e.to_string())
            }
        })
    }

    /// `POST /auth/login`
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = self
            .client
            .post(self.url(&["auth", "login"]))
            .json(&LoginRequest { username, password });
        self.send_json(request).await
    }

    /// `POST /auth/register`
    ///
    /// The backend answers with the new user's id, either as a JSON string or
    /// as plain text.
    pub async fn register(&self, form: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let request = self.client.post(self.url(&["auth", "register"])).json(form);
        let response = self.send(request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let user_id = serde_json::from_str::<String>(&body)
            .unwrap_or_else(|_| body.trim().to_string());
        if user_id.is_empty() {
            return Err(ApiError::Parse("empty registration response".to_string()));
        }
        Ok(RegisterResponse { user_id })
    }

    /// `GET /flashcards`, one page of the user's saved flashcards
    pub async fn list_flashcards(
        &self,
        params: &ListFlashcardsParams,
    ) -> Result<FlashcardsPage, ApiError> {
        let request = self
            .client
            .get(self.url(&["flashcards"]))
            .query(&FlashcardsQuery::from(params));
        self.send_json(request).await
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, String> {
    let url = Url::parse(base_url).map_err(|e| format!("invalid URL '{}': {}", base_url, e))?;
    if url.cannot_be_a_base() {
        return Err(format!("'{}' cannot be used as a base URL", base_url));
    }
    Ok(url)
}

/// Prefer the `message` field of the backend's JSON error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string())
}

impl GenerationApi for HttpClient {
    async fn create_session(&self, input_text: &str) -> Result<CreateSessionResponse, ApiError> {
        let request = self
            .client
            .post(self.url(&["ai", "sessions"]))
            .json(&CreateSessionRequest { input_text });
        self.send_json(request).await
    }

    async fn get_session(&self, session_id: &str) -> Result<AiSession, ApiError> {
        let request = self.client.get(self.url(&["ai", "sessions", session_id]));
        self.send_json(request).await
    }

    async fn get_suggestions(&self, session_id: &str) -> Result<SuggestionsResponse, ApiError> {
        let request = self
            .client
            .get(self.url(&["ai", "sessions", session_id, "suggestions"]));
        self.send_json(request).await
    }

    async fn approve_session(
        &self,
        session_id: &str,
        request: &ApproveSessionRequest,
    ) -> Result<(), ApiError> {
        log::debug!(
            "Approving {} suggestions for session {}",
            request.approved_suggestions.len(),
            session_id
        );
        let builder = self
            .client
            .post(self.url(&["ai", "sessions", session_id, "approve"]))
            .json(request);
        // Response body carries nothing the workflow needs
        self.send(builder).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
