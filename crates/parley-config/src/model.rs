// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages. Credential
//! keys keep the camelCase names of the chat platform's own config files
//! (`urlToken`, `wsURL`, `apiKey`).

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Reply delivery endpoint.
    #[serde(default)]
    pub http: HttpConfig,

    /// Inbound event socket.
    #[serde(default)]
    pub websocket: WebSocketConfig,

    /// Gemini backend settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Dispatch pipeline tunables.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Delivery endpoint configuration (`POST {url}/send_private_msg`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Base URL of the chat platform's HTTP API.
    #[serde(default = "default_http_url")]
    pub url: String,

    /// Bearer token sent in the `Authorization` header.
    #[serde(rename = "urlToken", default)]
    pub url_token: String,

    /// Client-side timeout for one delivery request, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            url: default_http_url(),
            url_token: String::new(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_http_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

/// Inbound socket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebSocketConfig {
    /// Websocket URL of the event stream.
    #[serde(rename = "wsURL", default = "default_ws_url")]
    pub ws_url: String,

    /// Token appended as the `access_token` query parameter.
    #[serde(rename = "wsToken", default)]
    pub ws_token: String,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            ws_token: String::new(),
        }
    }
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:3001/".to_string()
}

/// Gemini backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires the `GEMINI_API_KEY` environment variable.
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Timeout for one backend call, in seconds.
    #[serde(default = "default_gemini_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_gemini_timeout_secs(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_timeout_secs() -> u64 {
    60
}

/// Dispatch pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Number of concurrent workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the admission queue. Events beyond it are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Maximum number of remembered fingerprints. `None` keeps every fingerprint.
    #[serde(default)]
    pub dedup_capacity: Option<usize>,

    /// Path of the system prompt file.
    #[serde(default = "default_prompt_file")]
    pub prompt_file: String,

    /// Pause after a failed socket read, in milliseconds.
    #[serde(default = "default_read_retry_delay_ms")]
    pub read_retry_delay_ms: u64,

    /// How long shutdown waits for workers to drain the queue, in seconds.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            dedup_capacity: None,
            prompt_file: default_prompt_file(),
            read_retry_delay_ms: default_read_retry_delay_ms(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

fn default_workers() -> usize {
    8
}

fn default_queue_capacity() -> usize {
    200
}

fn default_prompt_file() -> String {
    "prompt.txt".to_string()
}

fn default_read_retry_delay_ms() -> u64 {
    1000
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

/// Logging configuration. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
