// src/errors.rs
use serde::Serialize;
use thiserror::Error;

use crate::contract::ValidationError;

/// Longest diagnostic we print or store for a single failure.
pub const DIAGNOSTIC_LIMIT: usize = 200;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Failed to read fixture '{path}': {source}")]
    Fixture {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response body is not JSON: {source}; body: {body}")]
    NotJson {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid response shape: {source}; body: {body}")]
    Shape {
        body: String,
        #[source]
        source: ValidationError,
    },

    #[error("API error: {message}")]
    Api {
        message: String,
        detail: Option<String>,
    },

    #[error("unexpected {what}: expected {expected}, got {actual}")]
    Semantic {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("contract audit flagged: {0}")]
    Audit(String),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Fixture,
    Transport,
    Protocol,
    Shape,
    Semantic,
    Timeout,
    Internal,
}

impl CheckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckError::Fixture { .. } => ErrorKind::Fixture,
            CheckError::Request(_) => ErrorKind::Transport,
            CheckError::Status { .. } => ErrorKind::Protocol,
            CheckError::NotJson { .. } | CheckError::Shape { .. } | CheckError::Api { .. } => {
                ErrorKind::Shape
            }
            CheckError::Semantic { .. } | CheckError::Audit(_) => ErrorKind::Semantic,
            CheckError::Timeout(_) => ErrorKind::Timeout,
            CheckError::Config(_) | CheckError::Io(_) | CheckError::Json(_) => ErrorKind::Internal,
        }
    }

    pub fn semantic(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        CheckError::Semantic {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Cuts `text` down to `limit` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
