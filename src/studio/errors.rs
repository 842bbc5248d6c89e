//! Error classification.
//!
//! Every failure reaching a feature is folded into a [`StudioError`] with a
//! closed [`ErrorKind`] and one user facing message.

use serde::Serialize;
use thiserror::Error;

use super::interpret::InterpretError;
use crate::ai::AiError;

pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "API quota has been exceeded. Please check your billing or try again later.";
pub const NETWORK_ERROR_MESSAGE: &str =
    "A network error occurred. Please check your connection and try again.";
pub const INVALID_RESPONSE_MESSAGE: &str = "The AI returned an invalid response. Please try again.";
pub const EMPTY_RESPONSE_MESSAGE: &str =
    "The AI returned an empty response. Please try a different query.";
pub const BAD_REQUEST_MESSAGE: &str =
    "The request sent to the AI was invalid. Please check your input.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred while communicating with the AI.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    QuotaExceeded,
    NetworkError,
    ParseError,
    BadRequest,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::ParseError => "PARSE_ERROR",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

/// A classified failure.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct StudioError {
    pub kind: ErrorKind,
    pub message: String,
    /// The unclassified error text, kept for logs only.
    #[serde(skip)]
    pub original: Option<String>,
}

impl StudioError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            original: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn quota_exceeded() -> Self {
        Self::new(ErrorKind::QuotaExceeded, QUOTA_EXCEEDED_MESSAGE)
    }

    /// Classify a bare message, e.g. one reported by a live session.
    pub fn from_message(message: impl Into<String>) -> Self {
        classify(anyhow::Error::msg(message.into()))
    }

    pub fn is_quota(&self) -> bool {
        self.kind == ErrorKind::QuotaExceeded
    }
}

/// Map any error to a [`StudioError`].
///
/// Already classified errors are returned unchanged. Otherwise the lowercased
/// message chain is matched against known markers in priority order, then
/// typed hints from the adapter and the interpreter are consulted.
pub fn classify(error: anyhow::Error) -> StudioError {
    let error = match error.downcast::<StudioError>() {
        Ok(classified) => return classified,
        Err(error) => error,
    };

    let original = format!("{:#}", error);
    let lower = original.to_lowercase();

    let (kind, message) = if lower.contains("quota") || lower.contains("429") {
        (ErrorKind::QuotaExceeded, QUOTA_EXCEEDED_MESSAGE.to_string())
    } else if lower.contains("failed to fetch") {
        (ErrorKind::NetworkError, NETWORK_ERROR_MESSAGE.to_string())
    } else if lower.contains("invalid json") {
        (ErrorKind::ParseError, INVALID_RESPONSE_MESSAGE.to_string())
    } else if lower.contains("empty response") {
        (ErrorKind::ParseError, EMPTY_RESPONSE_MESSAGE.to_string())
    } else if lower.contains("400") || lower.contains("bad request") {
        (ErrorKind::BadRequest, BAD_REQUEST_MESSAGE.to_string())
    } else if error
        .chain()
        .filter_map(|e| e.downcast_ref::<AiError>())
        .any(AiError::is_transport)
    {
        (ErrorKind::NetworkError, NETWORK_ERROR_MESSAGE.to_string())
    } else if error
        .chain()
        .filter_map(|e| e.downcast_ref::<InterpretError>())
        .any(|e| matches!(e, InterpretError::Shape { .. }))
    {
        (ErrorKind::ParseError, original.clone())
    } else if original.trim().is_empty() {
        (ErrorKind::UnknownError, UNKNOWN_ERROR_MESSAGE.to_string())
    } else {
        (ErrorKind::UnknownError, original.clone())
    };

    StudioError {
        kind,
        message,
        original: Some(original),
    }
}
