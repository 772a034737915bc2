// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier): compiled defaults, the TOML file,
//! then `PARLEY_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};

use crate::model::ParleyConfig;

/// Top-level sections, used to split env var names into dotted paths.
const SECTIONS: &[&str] = &["http", "websocket", "gemini", "relay", "log"];

/// Load configuration from a TOML file with env var overrides.
///
/// A missing file is not an error here; the caller creates it on first run.
pub fn load_config_from_path(path: &Path) -> Result<ParleyConfig, figment::Error> {
    build_figment(path).extract()
}

/// Load configuration from a TOML string only (no file, no env vars).
///
/// Used for testing and validation of inline content.
pub fn load_config_from_str(toml_content: &str) -> Result<ParleyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ParleyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores (`relay.queue_capacity`) and camelCase (`http.urlToken`).
/// Lowercasing is disabled so the camelCase paths survive; `env_key_path`
/// lowercases everything else itself.
fn env_provider() -> Env {
    Env::prefixed("PARLEY_")
        .map(|key| env_key_path(key.as_str()).into())
        .lowercase(false)
}

/// Map a prefix-stripped env var name to a dotted config path.
///
/// `HTTP_URLTOKEN` -> `http.urlToken`, `RELAY_QUEUE_CAPACITY` -> `relay.queue_capacity`.
pub(crate) fn env_key_path(raw: &str) -> String {
    let key = raw.to_ascii_lowercase();
    match key.as_str() {
        "http_urltoken" => return "http.urlToken".to_string(),
        "websocket_wsurl" => return "websocket.wsURL".to_string(),
        "websocket_wstoken" => return "websocket.wsToken".to_string(),
        "gemini_apikey" => return "gemini.apiKey".to_string(),
        _ => {}
    }
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
