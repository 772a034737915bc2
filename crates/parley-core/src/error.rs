// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley relay.

use thiserror::Error;

/// The primary error type used across all Parley adapter traits and the dispatch pipeline.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (missing credentials, unusable URLs, unreadable prompt).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local filesystem errors during first-run bootstrap.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Inbound socket errors (connect failure, read failure, closed stream).
    #[error("source error: {message}")]
    Source {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A frame could not be decoded into an event.
    #[error("failed to decode frame: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input rejected before any network call (empty prompt or empty input).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Conversational backend errors (conversation creation, send failure, bad response).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reply delivery errors (network failure, non-success status).
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Shorthand for a [`RelayError::Source`] without an underlying cause.
    pub fn source_closed(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
            source: None,
        }
    }
}
