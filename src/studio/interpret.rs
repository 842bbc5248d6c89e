//! Interpretation of raw model output.
//!
//! JSON features go through a strict parse plus a shallow shape check before
//! typed decoding. The response schema sent to the model is never used here.

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

use crate::ai::{GroundingChunk, Source};

const UNTITLED_SOURCE: &str = "Untitled";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpretError {
    #[error("Received empty response from AI model.")]
    Empty,

    #[error("AI returned invalid JSON.")]
    InvalidJson,

    #[error("AI returned malformed JSON for {feature}.")]
    Shape { feature: &'static str },
}

/// Top level shape a feature expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// An object carrying the given key with a non-null value.
    ObjectWithKey(&'static str),
    /// An object carrying the given key whose value is an array.
    ObjectWithArray(&'static str),
    /// A top level array.
    Array,
}

/// Parse model text as JSON, check its top level shape and decode it.
pub fn parse_json<T: DeserializeOwned>(
    text: Option<&str>,
    feature: &'static str,
    expected: Expected,
) -> Result<T, InterpretError> {
    let text = match text {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(InterpretError::Empty),
    };

    let value: Value = serde_json::from_str(text).map_err(|e| {
        warn!(feature = feature, "Failed to parse JSON response: {}", e);
        InterpretError::InvalidJson
    })?;
    if !(value.is_object() || value.is_array()) {
        return Err(InterpretError::InvalidJson);
    }

    let shape_ok = match expected {
        Expected::ObjectWithKey(key) => value.get(key).is_some_and(|v| !v.is_null()),
        Expected::ObjectWithArray(key) => value.get(key).is_some_and(Value::is_array),
        Expected::Array => value.is_array(),
    };
    if !shape_ok {
        return Err(InterpretError::Shape { feature });
    }

    serde_json::from_value(value).map_err(|e| {
        warn!(feature = feature, "Response does not match the expected shape: {}", e);
        InterpretError::Shape { feature }
    })
}

/// Keep web chunks with a uri, default missing titles and drop repeated
/// uris. The first entry seen for a uri wins.
pub fn collect_sources(chunks: &[GroundingChunk]) -> Vec<Source> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .filter_map(|chunk| {
            let uri = chunk.uri.as_deref().filter(|uri| !uri.is_empty())?;
            let title = chunk
                .title
                .as_deref()
                .filter(|title| !title.is_empty())
                .unwrap_or(UNTITLED_SOURCE);
            Some(Source {
                uri: uri.to_string(),
                title: title.to_string(),
            })
        })
        .filter(|source| seen.insert(source.uri.clone()))
        .collect()
}

/// Merge `incoming` into `existing`, skipping uris already present.
pub fn merge_sources(existing: &mut Vec<Source>, incoming: Vec<Source>) {
    for source in incoming {
        if !existing.iter().any(|s| s.uri == source.uri) {
            existing.push(source);
        }
    }
}

/// Append a `**Sources:**` markdown link list for every web chunk.
pub fn append_source_links(text: &str, chunks: &[GroundingChunk]) -> String {
    let mut out = text.to_string();
    if chunks.is_empty() {
        return out;
    }
    out.push_str("\n\n**Sources:**\n");
    for chunk in chunks {
        if let Some(uri) = chunk.uri.as_deref() {
            out.push_str(&format!(
                "\n- [{}]({})",
                chunk.title.as_deref().unwrap_or_default(),
                uri
            ));
        }
    }
    out
}

lazy_static! {
    static ref ABC_FENCE: Regex = Regex::new(r"`{1,3}(abc)?").unwrap();
}

/// Strip code fences and the `abc` language tag from ABC notation.
pub fn clean_abc(text: &str) -> String {
    ABC_FENCE.replace_all(text, "").trim().to_string()
}
