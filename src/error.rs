use thiserror::Error;

use crate::api::ApiError;
use crate::workflow::WorkflowError;

/// Custom error types for flashgen
#[derive(Debug, Error)]
pub enum FlashgenError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
