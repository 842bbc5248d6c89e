//! Generative model abstraction layer.
//!
//! This module provides a trait-based abstraction over the generative AI
//! endpoint, so the studio can run against Gemini or, in tests, an
//! in-process scripted model.

mod gemini;
mod provider;
mod schema;
#[cfg(any(test, feature = "mock"))]
mod scripted;
mod types;

pub use gemini::{
    GeminiProvider, GeminiSettings, DEFAULT_API_BASE_URL, DEFAULT_SPEECH_MODEL,
    DEFAULT_TEXT_MODEL, DEFAULT_VOICE,
};
#[cfg(feature = "mock")]
pub use provider::MockGenerativeModel;
pub use provider::{AiError, GenerativeModel};
pub use schema::{Schema, SchemaType};
#[cfg(any(test, feature = "mock"))]
pub use scripted::ScriptedModel;
pub use types::{GenerationRequest, GenerationResponse, GroundingChunk, ResponseFormat, Source};
