// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of per-identity backend conversations.
//!
//! Each origin identity maps to exactly one conversation handle, created
//! lazily on its first event and kept for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use parley_core::{BackendAdapter, Conversation, RelayError, UserId};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Maps conversation identities to their backend conversation.
pub struct SessionRegistry {
    backend: Arc<dyn BackendAdapter>,
    system_instruction: String,
    /// Async mutex: conversation creation awaits the backend while holding it.
    conversations: Mutex<HashMap<UserId, Arc<dyn Conversation>>>,
}

impl SessionRegistry {
    /// Creates an empty registry. `system_instruction` is given to every new conversation.
    pub fn new(backend: Arc<dyn BackendAdapter>, system_instruction: impl Into<String>) -> Self {
        Self {
            backend,
            system_instruction: system_instruction.into(),
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Returns the conversation for `identity`, creating it on first use.
    ///
    /// The lookup and the creation happen under one lock, so concurrent callers
    /// for the same identity always receive the same handle. A failed creation
    /// leaves no entry behind and the next event retries it.
    pub async fn get_or_create(
        &self,
        identity: UserId,
    ) -> Result<Arc<dyn Conversation>, RelayError> {
        let mut conversations = self.conversations.lock().await;

        if let Some(existing) = conversations.get(&identity) {
            debug!(user_id = identity, "reusing conversation");
            return Ok(Arc::clone(existing));
        }

        let conversation = self
            .backend
            .create_conversation(&self.system_instruction)
            .await?;
        conversations.insert(identity, Arc::clone(&conversation));
        crate::metrics::set_conversations(conversations.len());
        info!(
            user_id = identity,
            backend = self.backend.name(),
            "created conversation"
        );

        Ok(conversation)
    }

    /// Number of live conversations.
    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
