//! Client for AI flashcard generation sessions
//!
//! Submits source text to the backend, polls the generation session until it
//! resolves, and approves a user-curated subset of the suggested flashcards.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod validation;
pub mod workflow;


pub use api::{GenerationApi, HttpClient};
pub use error::FlashgenError;
pub use workflow::{GenerationWorkflow, PollingConfig, WorkflowError, WorkflowStatus};
