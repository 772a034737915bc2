// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational backend traits (Gemini, mocks).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RelayError;
use crate::traits::adapter::PluginAdapter;

/// Factory for stateful conversations with a fixed system instruction.
#[async_trait]
pub trait BackendAdapter: PluginAdapter {
    /// Creates a new conversation. The system instruction is fixed for its lifetime.
    async fn create_conversation(
        &self,
        system_instruction: &str,
    ) -> Result<Arc<dyn Conversation>, RelayError>;
}

/// One ongoing exchange with the backend for one identity.
#[async_trait]
pub trait Conversation: Send + Sync {
    /// Sends one message and returns the reply.
    ///
    /// `Ok(None)` means the backend answered with nothing to say.
    async fn send(&self, input: &str) -> Result<Option<String>, RelayError>;
}
