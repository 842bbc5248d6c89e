//! Gemini `generateContent` provider implementation.

use super::provider::{AiError, GenerativeModel};
use super::types::{
    GenerationRequest, GenerationResponse, GroundingChunk, ResponseFormat,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Kore";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub speech_model: String,
    pub voice: String,
    /// Per-request timeout. `None` leaves it to the transport defaults.
    pub request_timeout: Option<Duration>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_TEXT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            request_timeout: None,
        }
    }
}

/// Gemini provider.
///
/// Uses the REST `models/{model}:generateContent` endpoint with the API key
/// passed in the `x-goog-api-key` header.
pub struct GeminiProvider {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiProvider {
    pub fn new(settings: GeminiSettings) -> Self {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            settings: GeminiSettings {
                base_url,
                ..settings
            },
        }
    }

    fn model_for(&self, format: &ResponseFormat) -> &str {
        match format {
            ResponseFormat::Speech => &self.settings.speech_model,
            _ => &self.settings.model,
        }
    }

    fn to_gemini_request(&self, request: &GenerationRequest) -> GeminiRequest {
        let contents = vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: Some(request.prompt.clone()),
                inline_data: None,
            }],
        }];

        let (generation_config, tools) = match &request.format {
            ResponseFormat::Text => (None, None),
            ResponseFormat::Json(schema) => (
                Some(GeminiGenerationConfig {
                    response_mime_type: Some("application/json".to_string()),
                    response_schema: schema.as_ref().map(|s| s.to_json()),
                    ..Default::default()
                }),
                None,
            ),
            ResponseFormat::WebSearch => (
                None,
                Some(vec![GeminiTool {
                    google_search: serde_json::json!({}),
                }]),
            ),
            ResponseFormat::Speech => (
                Some(GeminiGenerationConfig {
                    response_modalities: Some(vec!["AUDIO".to_string()]),
                    speech_config: Some(GeminiSpeechConfig {
                        voice_config: GeminiVoiceConfig {
                            prebuilt_voice_config: GeminiPrebuiltVoice {
                                voice_name: self.settings.voice.clone(),
                            },
                        },
                    }),
                    ..Default::default()
                }),
                None,
            ),
        };

        GeminiRequest {
            contents,
            generation_config,
            tools,
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, AiError> {
        let model = self.model_for(&request.format);
        let url = format!("{}/models/{}:generateContent", self.settings.base_url, model);
        let body = self.to_gemini_request(request);

        debug!(
            model = %model,
            format = ?std::mem::discriminant(&request.format),
            prompt_len = request.prompt.len(),
            "Sending generateContent request to Gemini"
        );

        let mut req_builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body);
        if let Some(timeout) = self.settings.request_timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout
            } else {
                AiError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            AiError::InvalidResponse(format!("Failed to parse Gemini response: {}", e))
        })?;

        let response = gemini_response.into_generation_response();

        debug!(
            has_text = response.text.is_some(),
            grounding_chunks = response.grounding.len(),
            has_audio = response.audio.is_some(),
            "Received generateContent response from Gemini"
        );

        Ok(response)
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<GeminiSpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiSpeechConfig {
    voice_config: GeminiVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiVoiceConfig {
    prebuilt_voice_config: GeminiPrebuiltVoice,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPrebuiltVoice {
    voice_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    grounding_metadata: Option<GeminiGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GeminiGroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GeminiGroundingChunk {
    #[serde(default)]
    web: Option<GeminiWebChunk>,
}

#[derive(Debug, Deserialize)]
struct GeminiWebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl GeminiResponse {
    /// Flatten the first candidate into our response type.
    fn into_generation_response(self) -> GenerationResponse {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return GenerationResponse::default();
        };

        let mut text_parts = Vec::new();
        let mut audio = None;
        if let Some(content) = candidate.content {
            for part in content.parts {
                if let Some(text) = part.text {
                    text_parts.push(text);
                }
                if audio.is_none() {
                    audio = part.inline_data.map(|d| d.data);
                }
            }
        }

        let grounding = candidate
            .grounding_metadata
            .map(|meta| {
                meta.grounding_chunks
                    .into_iter()
                    .map(|chunk| match chunk.web {
                        Some(web) => GroundingChunk {
                            uri: web.uri,
                            title: web.title,
                        },
                        None => GroundingChunk::default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        GenerationResponse {
            text: if text_parts.is_empty() {
                None
            } else {
                Some(text_parts.concat())
            },
            grounding,
            audio,
        }
    }
}
