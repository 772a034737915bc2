// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock conversational backend for deterministic testing.
//!
//! `MockBackend` implements `BackendAdapter` with scripted replies and records
//! every conversation it creates and every message sent through them.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::{
    AdapterType, BackendAdapter, Conversation, HealthStatus, PluginAdapter, RelayError,
};

/// Reply returned once the script runs out.
pub const DEFAULT_MOCK_REPLY: &str = "mock reply";

/// One scripted backend answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    /// The backend answered with no content.
    Empty,
    /// The exchange fails with a backend error carrying this message.
    Error(String),
}

impl From<&str> for MockReply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A message observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// Index of the conversation, in creation order.
    pub conversation: usize,
    pub system_instruction: String,
    pub input: String,
}

#[derive(Default)]
struct Shared {
    script: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<MockCall>>,
    created: AtomicUsize,
    fail_create: AtomicBool,
}

/// A mock backend for testing.
#[derive(Clone, Default)]
pub struct MockBackend {
    shared: Arc<Shared>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose replies are taken from `replies` in order.
    pub fn with_replies<I, R>(replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<MockReply>,
    {
        Self {
            shared: Arc::new(Shared {
                script: Mutex::new(replies.into_iter().map(Into::into).collect()),
                ..Shared::default()
            }),
        }
    }

    pub async fn push_reply(&self, reply: impl Into<MockReply>) {
        self.shared.script.lock().await.push_back(reply.into());
    }

    /// Make `create_conversation` fail until switched off again.
    pub fn fail_create(&self, fail: bool) {
        self.shared.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Number of conversations created so far.
    pub fn conversations_created(&self) -> usize {
        self.shared.created.load(Ordering::SeqCst)
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.shared.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.shared.calls.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
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
impl BackendAdapter for MockBackend {
    async fn create_conversation(
        &self,
        system_instruction: &str,
    ) -> Result<Arc<dyn Conversation>, RelayError> {
        if self.shared.fail_create.load(Ordering::SeqCst) {
            return Err(RelayError::Backend {
                message: "mock conversation creation failed".into(),
                source: None,
            });
        }
        let index = self.shared.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockConversation {
            index,
            system_instruction: system_instruction.to_string(),
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct MockConversation {
    index: usize,
    system_instruction: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl Conversation for MockConversation {
    async fn send(&self, input: &str) -> Result<Option<String>, RelayError> {
        self.shared.calls.lock().await.push(MockCall {
            conversation: self.index,
            system_instruction: self.system_instruction.clone(),
            input: input.to_string(),
        });

        let next = self.shared.script.lock().await.pop_front();
        match next {
            Some(MockReply::Text(text)) => Ok(Some(text)),
            Some(MockReply::Empty) => Ok(None),
            Some(MockReply::Error(message)) => Err(RelayError::Backend {
                message,
                source: None,
            }),
            None => Ok(Some(DEFAULT_MOCK_REPLY.to_string())),
        }
    }
}
