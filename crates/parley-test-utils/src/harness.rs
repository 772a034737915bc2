// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end relay testing.
//!
//! `TestHarness` runs the real dispatch stack (ingestion loop, queue,
//! workers, dedup store, session registry) against mock adapters, so tests
//! drive it with raw frames and assert on captured replies.

use std::sync::Arc;
use std::time::Duration;

use parley_core::RelayError;
use parley_core::traits::EventSource;
use parley_dispatch::{Pipeline, Relay, RelaySettings};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::mock_backend::{MockBackend, MockReply};
use crate::mock_delivery::MockDelivery;
use crate::mock_source::{MockSource, MockSourceHandle};

pub const DEFAULT_TEST_PROMPT: &str = "You are a test companion.\n";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    system_prompt: String,
    settings: RelaySettings,
    unreachable: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            system_prompt: DEFAULT_TEST_PROMPT.to_string(),
            settings: RelaySettings {
                workers: 2,
                queue_capacity: 16,
                read_retry_delay: Duration::from_millis(10),
                shutdown_timeout: Duration::from_secs(5),
                ..RelaySettings::default()
            },
            unreachable: false,
        }
    }

    /// Set scripted backend replies.
    pub fn with_replies<I, R>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<MockReply>,
    {
        self.replies = replies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.settings.workers = workers;
        self
    }

    pub fn with_settings(mut self, settings: RelaySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Make the source refuse to connect, so `start` fails.
    pub fn with_unreachable_source(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Connect the mock source and start the relay in the background.
    pub async fn start(self) -> Result<TestHarness, RelayError> {
        let backend = MockBackend::with_replies(self.replies);
        let delivery = MockDelivery::new();
        let (mut source, frames) = if self.unreachable {
            MockSource::unreachable()
        } else {
            MockSource::new()
        };
        source.connect().await?;

        let relay = Arc::new(Relay::new(
            self.settings,
            Arc::new(backend.clone()),
            Arc::new(delivery.clone()),
            self.system_prompt,
        ));

        let cancel = CancellationToken::new();
        let task = {
            let relay = Arc::clone(&relay);
            let cancel = cancel.clone();
            let source: Box<dyn EventSource> = Box::new(source);
            tokio::spawn(async move { relay.run(source, cancel).await })
        };

        Ok(TestHarness {
            relay,
            backend,
            delivery,
            frames,
            cancel,
            task,
        })
    }
}

/// A running relay wired to mocks.
pub struct TestHarness {
    relay: Arc<Relay>,
    pub backend: MockBackend,
    pub delivery: MockDelivery,
    pub frames: MockSourceHandle,
    cancel: CancellationToken,
    task: JoinHandle<bool>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn pipeline(&self) -> Arc<Pipeline> {
        self.relay.pipeline()
    }

    /// Waits for `count` deliveries, up to five seconds.
    pub async fn wait_for_deliveries(&self, count: usize) -> bool {
        self.delivery.wait_for(count, Duration::from_secs(5)).await
    }

    /// Lets ingestion read every pushed frame, then stops the relay and waits
    /// for the workers to drain. Returns `true` on a clean drain.
    pub async fn shutdown(self) -> bool {
        self.frames.wait_consumed(Duration::from_secs(5)).await;
        self.cancel.cancel();
        self.task.await.unwrap_or(false)
    }
}
