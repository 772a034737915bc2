// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every violation instead of failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let url = config.http.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        fail(format!(
            "http.url must be an http:// or https:// URL, got `{url}`"
        ));
    }
    if config.http.timeout_secs == 0 {
        fail("http.timeout_secs must be at least 1".to_string());
    }

    let ws_url = config.websocket.ws_url.trim();
    if !(ws_url.starts_with("ws://") || ws_url.starts_with("wss://")) {
        fail(format!(
            "websocket.wsURL must be a ws:// or wss:// URL, got `{ws_url}`"
        ));
    }

    if config.gemini.model.trim().is_empty() {
        fail("gemini.model must not be empty".to_string());
    }
    if config.gemini.base_url.trim().is_empty() {
        fail("gemini.base_url must not be empty".to_string());
    }
    if config.gemini.timeout_secs == 0 {
        fail("gemini.timeout_secs must be at least 1".to_string());
    }

    if config.relay.workers == 0 {
        fail("relay.workers must be at least 1".to_string());
    }
    if config.relay.queue_capacity == 0 {
        fail("relay.queue_capacity must be at least 1".to_string());
    }
    if config.relay.dedup_capacity == Some(0) {
        fail("relay.dedup_capacity must be at least 1 when set".to_string());
    }
    if config.relay.prompt_file.trim().is_empty() {
        fail("relay.prompt_file must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "log.level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.log.level
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
