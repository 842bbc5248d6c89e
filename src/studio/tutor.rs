//! Live tutor session bookkeeping.
//!
//! The audio stream itself is handled by the client. This module builds the
//! session setup message and folds the server messages the client relays
//! into a transcript, a source list and a connection state.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::errors::StudioError;
use super::interpret::{collect_sources, merge_sources};
use super::models::Language;
use super::prompts;
use crate::ai::{GroundingChunk, Source};

pub const DEFAULT_LIVE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-09-2025";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// The `setup` message opening a live session.
pub fn live_setup(model: &str, language: Language) -> serde_json::Value {
    json!({
        "setup": {
            "model": format!("models/{}", model),
            "generationConfig": { "responseModalities": ["AUDIO"] },
            "systemInstruction": {
                "parts": [{ "text": prompts::tutor_system_instruction(language) }]
            },
            "tools": [{ "googleSearch": {} }],
            "inputAudioTranscription": {},
            "outputAudioTranscription": {}
        }
    })
}

// Live server message, reduced to the fields the session cares about.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveServerMessage {
    #[serde(default)]
    pub server_content: Option<LiveServerContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveServerContent {
    #[serde(default)]
    pub input_transcription: Option<LiveTranscription>,
    #[serde(default)]
    pub output_transcription: Option<LiveTranscription>,
    #[serde(default)]
    pub model_turn: Option<LiveModelTurn>,
    #[serde(default)]
    pub grounding_metadata: Option<LiveGroundingMetadata>,
    #[serde(default)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveTranscription {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveModelTurn {
    #[serde(default)]
    pub parts: Vec<LivePart>,
    #[serde(default)]
    pub grounding_metadata: Option<LiveGroundingMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivePart {
    #[serde(default)]
    pub inline_data: Option<LiveInlineData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveInlineData {
    pub data: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveGroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<LiveGroundingChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveGroundingChunk {
    #[serde(default)]
    pub web: Option<LiveWebChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveWebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Client visible effects of one server message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEffects {
    /// Base64 audio to schedule for playback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Queued playback must be dropped.
    pub interrupted: bool,
}

/// Events a client relays from its live connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TutorEvent {
    Open,
    Message { message: LiveServerMessage },
    Error { message: Option<String> },
    Close,
    Stop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorSession {
    pub state: ConnectionState,
    pub transcript: Vec<TranscriptTurn>,
    pub sources: Vec<Source>,
    pub error: Option<String>,
}

impl TutorSession {
    pub fn start(&mut self) {
        *self = TutorSession {
            state: ConnectionState::Connecting,
            ..Default::default()
        };
    }

    pub fn on_open(&mut self) {
        self.state = ConnectionState::Connected;
    }

    pub fn on_close(&mut self) {
        self.state = ConnectionState::Disconnected;
    }

    pub fn stop(&mut self) {
        self.state = ConnectionState::Idle;
    }

    pub fn on_error(&mut self, message: Option<&str>) -> StudioError {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or("An unknown error occurred with the live connection.");
        let error = StudioError::from_message(message);
        self.state = ConnectionState::Error;
        self.error = Some(error.message.clone());
        error
    }

    fn append(&mut self, speaker: Speaker, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.transcript.last_mut() {
            Some(last) if last.speaker == speaker => last.text.push_str(text),
            _ => self.transcript.push(TranscriptTurn {
                speaker,
                text: text.to_string(),
            }),
        }
    }

    /// Fold one server message into the session.
    pub fn on_message(&mut self, message: &LiveServerMessage) -> MessageEffects {
        let Some(content) = &message.server_content else {
            return MessageEffects::default();
        };

        if let Some(input) = &content.input_transcription {
            self.append(Speaker::User, &input.text);
        }
        if let Some(output) = &content.output_transcription {
            self.append(Speaker::Model, &output.text);
        }

        let metadata = content
            .model_turn
            .as_ref()
            .and_then(|turn| turn.grounding_metadata.as_ref())
            .or(content.grounding_metadata.as_ref());
        if let Some(metadata) = metadata {
            let chunks: Vec<GroundingChunk> = metadata
                .grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .map(|web| GroundingChunk {
                    uri: web.uri.clone(),
                    title: web.title.clone(),
                })
                .collect();
            merge_sources(&mut self.sources, collect_sources(&chunks));
        }

        let audio = content
            .model_turn
            .as_ref()
            .and_then(|turn| turn.parts.first())
            .and_then(|part| part.inline_data.as_ref())
            .map(|data| data.data.clone());

        MessageEffects {
            audio,
            interrupted: content.interrupted,
        }
    }
}
