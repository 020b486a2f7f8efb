//! Error types for management operations.
//!
//! # Design
//!
//! - Every failure carries the `message`/`status_code` pair callers render.
//! - Structured service error bodies are kept as parsed JSON, never re-wrapped.
//! - Local failures (URL building, file access, encoding) keep their source.

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Result alias for management operations.
pub type ManagementResult<T> = Result<T, ManagementError>;

/// Prefix used when a successful response body cannot be decoded.
pub const PARSE_FAILURE_PREFIX: &str = "Could not parse response: ";

/// Errors produced by the management client.
#[derive(Debug, Error)]
pub enum ManagementError {
    /// The request never produced a response.
    #[error("{message}")]
    Transport {
        /// Transport failure description.
        message: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// Non-success status with a body that is not a JSON object.
    #[error("{message}")]
    Http {
        /// Raw response text, or the canonical reason when the body was empty.
        message: String,
        /// HTTP status code.
        status_code: u16,
    },
    /// Non-success status with a JSON error body from the service.
    #[error("{}", service_message(.body))]
    Service {
        /// Parsed error body, unchanged.
        body: Value,
        /// HTTP status code.
        status_code: u16,
    },
    /// Successful status whose body could not be decoded.
    #[error("{message}")]
    Parse {
        /// `Could not parse response: ` followed by the raw text.
        message: String,
        /// HTTP status code.
        status_code: u16,
    },
    /// Access token could not be decoded into provider identity fields.
    #[error("access token is not a valid encoded login identity")]
    InvalidAccessToken,
    /// Server URL cannot carry path segments.
    #[error("server URL cannot be used as a base: {url}")]
    InvalidServerUrl {
        /// Offending URL.
        url: String,
    },
    /// User agent contained characters not allowed in a header.
    #[error("invalid user agent header")]
    InvalidUserAgent {
        /// Offending value.
        value: String,
    },
    /// Building the HTTP client failed.
    #[error("failed to build HTTP client")]
    ClientBuild {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// Filesystem access failed while preparing an upload.
    #[error("failed to {operation} {}", .path.display())]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Request payload could not be serialised.
    #[error("failed to encode request body")]
    Encode {
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

impl ManagementError {
    /// Human-readable message for the failure.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status code, when a response was received.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status_code, .. }
            | Self::Service { status_code, .. }
            | Self::Parse { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Structured service error body, when the service returned one.
    #[must_use]
    pub const fn service_body(&self) -> Option<&Value> {
        match self {
            Self::Service { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn transport(source: reqwest::Error) -> Self {
        Self::Transport {
            message: source.to_string(),
            source,
        }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(raw: &str, status_code: u16) -> Self {
        Self::Parse {
            message: format!("{PARSE_FAILURE_PREFIX}{raw}"),
            status_code,
        }
    }
}

fn service_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map_or_else(|| body.to_string(), str::to_string)
}
