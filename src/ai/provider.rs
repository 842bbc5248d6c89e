//! Generative model trait definition.

use super::types::{GenerationRequest, GenerationResponse};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to a generative model.
///
/// The display strings carry the original status and body so that the
/// studio error classifier can inspect them.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

impl AiError {
    /// True for failures where the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, AiError::Connection(_) | AiError::Timeout)
    }
}

/// Trait for generative model backends.
///
/// Every call issues exactly one request. Implementations never retry and
/// never cache.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Get the provider's name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Get the text model being used.
    fn model(&self) -> &str;

    /// Run a single generation request.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, AiError>;
}
