// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini backend adapter for the Parley relay.
//!
//! This crate implements [`BackendAdapter`] for the Gemini `generateContent`
//! API. Each [`GeminiConversation`] keeps its own turn history and replays it
//! with every request.

pub mod client;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::GeminiConfig;
use parley_core::{
    AdapterType, BackendAdapter, Conversation, HealthStatus, PluginAdapter, RelayError,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest};

/// Environment variable consulted when `gemini.apiKey` is unset.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini backend implementing [`BackendAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiBackend {
    client: Arc<GeminiClient>,
}

impl GeminiBackend {
    /// Creates a backend from the `[gemini]` config section.
    pub fn new(config: &GeminiConfig) -> Result<Self, RelayError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = GeminiClient::new(
            &api_key,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_base_url(config.base_url.as_str());

        info!(model = config.model, "Gemini backend initialized");
        Ok(Self::with_client(client))
    }

    /// Creates a backend around an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Backend
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RelayError> {
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for GeminiBackend {
    async fn create_conversation(
        &self,
        system_instruction: &str,
    ) -> Result<Arc<dyn Conversation>, RelayError> {
        debug!(model = self.client.model(), "creating Gemini conversation");
        Ok(Arc::new(GeminiConversation {
            client: Arc::clone(&self.client),
            system_instruction: Content::text(None, system_instruction),
            history: Mutex::new(Vec::new()),
        }))
    }
}

/// A chat with a fixed system instruction and a growing turn history.
pub struct GeminiConversation {
    client: Arc<GeminiClient>,
    system_instruction: Content,
    history: Mutex<Vec<Content>>,
}

impl GeminiConversation {
    /// Number of recorded turns (user and model).
    pub async fn turns(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[async_trait]
impl Conversation for GeminiConversation {
    async fn send(&self, input: &str) -> Result<Option<String>, RelayError> {
        // Held across the request so turns within one conversation never interleave.
        let mut history = self.history.lock().await;

        let user_turn = Content::user(input);
        let mut contents = history.clone();
        contents.push(user_turn.clone());

        let request = GenerateContentRequest {
            system_instruction: self.system_instruction.clone(),
            contents,
        };
        let response = self.client.generate(&request).await?;

        let Some(reply) = response.text() else {
            debug!(
                block_reason = ?response.prompt_feedback.and_then(|f| f.block_reason),
                "Gemini returned no text"
            );
            return Ok(None);
        };

        history.push(user_turn);
        history.push(Content::model(reply.clone()));
        Ok(Some(reply))
    }
}

/// Resolves the API key from config, then `GEMINI_API_KEY`.
pub fn resolve_api_key(config_key: Option<&str>) -> Result<String, RelayError> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Ok(key.trim().to_string());
    }

    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(RelayError::Config(format!(
            "Gemini API key not found. Set gemini.apiKey in config or {API_KEY_ENV} environment variable."
        ))),
    }
}
