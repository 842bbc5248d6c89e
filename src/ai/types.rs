//! Common types for generative model interactions.

use serde::{Deserialize, Serialize};

use super::schema::Schema;

/// How the model should shape its output for a single request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// Free-form text (markdown, ABC notation, HTML fragments...).
    Text,
    /// JSON mode, optionally constrained by a response schema.
    Json(Option<Schema>),
    /// Free-form text grounded with the web search tool.
    WebSearch,
    /// Spoken audio rendered by the speech model.
    Speech,
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub format: ResponseFormat,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Text,
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json(None),
        }
    }

    pub fn json_with_schema(prompt: impl Into<String>, schema: Schema) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json(Some(schema)),
        }
    }

    pub fn web_search(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::WebSearch,
        }
    }

    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            prompt: text.into(),
            format: ResponseFormat::Speech,
        }
    }
}

/// A grounding citation attached to a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// A raw grounding chunk as reported by the model, before filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl GroundingChunk {
    pub fn web(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            title: Some(title.into()),
        }
    }
}

/// Response from a generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub text: Option<String>,
    /// Grounding chunks of the first candidate (web search only).
    pub grounding: Vec<GroundingChunk>,
    /// Base64 encoded inline audio data (speech only).
    pub audio: Option<String>,
}

impl GenerationResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_grounding(mut self, grounding: Vec<GroundingChunk>) -> Self {
        self.grounding = grounding;
        self
    }

    pub fn from_audio(audio: impl Into<String>) -> Self {
        Self {
            audio: Some(audio.into()),
            ..Default::default()
        }
    }
}
