// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock event source with injectable frames and read errors.
//!
//! `MockSource` implements `EventSource`; its [`MockSourceHandle`] pushes
//! frames from the test side. Once every pushed frame is consumed the source
//! blocks, like an idle socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use parley_core::{AdapterType, EventSource, HealthStatus, PluginAdapter, RelayError};

type Frame = Result<String, String>;

#[derive(Default)]
struct Counters {
    pushed: AtomicUsize,
    read: AtomicUsize,
    connected: AtomicBool,
    shut_down: AtomicBool,
}

/// The source half, handed to the relay.
pub struct MockSource {
    frames: Mutex<mpsc::UnboundedReceiver<Frame>>,
    counters: Arc<Counters>,
    fail_connect: bool,
}

/// The test half, used to feed frames.
#[derive(Clone)]
pub struct MockSourceHandle {
    tx: mpsc::UnboundedSender<Frame>,
    counters: Arc<Counters>,
}

impl MockSource {
    pub fn new() -> (Self, MockSourceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        (
            Self {
                frames: Mutex::new(rx),
                counters: Arc::clone(&counters),
                fail_connect: false,
            },
            MockSourceHandle { tx, counters },
        )
    }

    /// A source whose `connect()` fails.
    pub fn unreachable() -> (Self, MockSourceHandle) {
        let (mut source, handle) = Self::new();
        source.fail_connect = true;
        (source, handle)
    }
}

impl MockSourceHandle {
    /// Queue a text frame.
    pub fn push_frame(&self, frame: impl Into<String>) {
        self.push(Ok(frame.into()));
    }

    /// Queue a JSON frame.
    pub fn push_json(&self, value: &serde_json::Value) {
        self.push_frame(value.to_string());
    }

    /// Queue a read failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.push(Err(message.into()));
    }

    fn push(&self, frame: Frame) {
        if self.tx.send(frame).is_ok() {
            self.counters.pushed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Frames and errors returned by `next_frame` so far.
    pub fn reads(&self) -> usize {
        self.counters.read.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.counters.connected.load(Ordering::SeqCst)
    }

    pub fn was_shut_down(&self) -> bool {
        self.counters.shut_down.load(Ordering::SeqCst)
    }

    /// Waits until every pushed frame has been read. Returns `false` on timeout.
    pub async fn wait_consumed(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            while self.reads() < self.counters.pushed.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl PluginAdapter for MockSource {
    fn name(&self) -> &str {
        "mock-source"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        if self.counters.connected.load(Ordering::SeqCst) {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("not connected".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), RelayError> {
        self.counters.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl EventSource for MockSource {
    async fn connect(&mut self) -> Result<(), RelayError> {
        if self.fail_connect {
            return Err(RelayError::source_closed("mock source unreachable"));
        }
        self.counters.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<String, RelayError> {
        let next = self.frames.lock().await.recv().await;
        let Some(frame) = next else {
            // Every handle dropped: behave like a silent socket.
            return std::future::pending().await;
        };
        self.counters.read.fetch_add(1, Ordering::SeqCst);
        frame.map_err(RelayError::source_closed)
    }
}
