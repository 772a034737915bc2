// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion loop: reads frames from the event source, filters them, and
//! offers admissible events to the queue.
//!
//! Reading never stops on its own. Read failures are retried after a fixed
//! delay and malformed frames are dropped; only cancellation ends the loop.

use std::time::Duration;

use parley_core::{Event, EventSource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::queue::{AdmissionQueue, Offer};

/// What happened to a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FrameDisposition {
    Admitted,
    /// Not valid JSON for an event.
    Malformed,
    /// Carries a group context.
    Group,
    /// `message_type` is not `"private"`.
    NotPrivate,
    /// Dropped because the queue was at capacity.
    Full,
    /// Dropped because no worker is listening any more.
    Closed,
}

pub struct IngestLoop {
    source: Box<dyn EventSource>,
    queue: AdmissionQueue,
    retry_delay: Duration,
}

impl IngestLoop {
    pub fn new(source: Box<dyn EventSource>, queue: AdmissionQueue, retry_delay: Duration) -> Self {
        Self {
            source,
            queue,
            retry_delay,
        }
    }

    /// Reads until `cancel` fires, then shuts the source down.
    ///
    /// Consumes the loop so the queue's producer is dropped on return, which
    /// lets the workers drain and exit.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(source = self.source.name(), "ingestion loop started");

        loop {
            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                frame = self.source.next_frame() => frame,
            };

            match frame {
                Ok(text) => {
                    if self.ingest_frame(&text) == FrameDisposition::Closed {
                        warn!("admission queue closed, stopping ingestion");
                        break;
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        retry_ms = self.retry_delay.as_millis() as u64,
                        "failed to read frame, retrying"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        info!("ingestion loop stopping");
        if let Err(e) = self.source.shutdown().await {
            warn!(error = %e, "event source shutdown failed");
        }
    }

    /// Decodes, filters and offers one frame.
    pub fn ingest_frame(&self, frame: &str) -> FrameDisposition {
        let disposition = self.admit(frame);
        crate::metrics::record_admission(disposition.into());
        disposition
    }

    fn admit(&self, frame: &str) -> FrameDisposition {
        let event = match Event::decode(frame) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "dropping malformed frame");
                return FrameDisposition::Malformed;
            }
        };

        if event.has_group_context() {
            debug!(group_id = ?event.group_id, "dropping group event");
            return FrameDisposition::Group;
        }
        if !event.is_private() {
            debug!(message_type = %event.message_type, "dropping non-private event");
            return FrameDisposition::NotPrivate;
        }

        match self.queue.offer(event) {
            Offer::Admitted => FrameDisposition::Admitted,
            Offer::Full(event) => {
                warn!(user_id = event.user_id, "message queue full, dropping event");
                FrameDisposition::Full
            }
            Offer::Closed(event) => {
                warn!(user_id = event.user_id, "message queue closed, dropping event");
                FrameDisposition::Closed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use parley_core::{AdapterType, HealthStatus, PluginAdapter, RelayError};
    use tracing_test::traced_test;

    use super::*;
    use crate::queue::admission_queue;

    /// Replays a fixed script, then idles.
    struct ScriptedSource {
        script: VecDeque<Result<String, String>>,
        shut_down: Arc<AtomicBool>,
    }

    impl ScriptedSource {
        fn boxed(script: Vec<Result<&str, &str>>) -> (Box<dyn EventSource>, Arc<AtomicBool>) {
            let shut_down = Arc::new(AtomicBool::new(false));
            let source = Self {
                script: script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
                shut_down: Arc::clone(&shut_down),
            };
            (Box::new(source), shut_down)
        }
    }

    #[async_trait]
    impl PluginAdapter for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Source
        }
        async fn health_check(&self) -> Result<HealthStatus, RelayError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), RelayError> {
            self.shut_down.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        async fn connect(&mut self) -> Result<(), RelayError> {
            Ok(())
        }
        async fn next_frame(&mut self) -> Result<String, RelayError> {
            match self.script.pop_front() {
                Some(Ok(frame)) => Ok(frame),
                Some(Err(message)) => Err(RelayError::source_closed(message)),
                None => std::future::pending().await,
            }
        }
    }

    const PRIVATE: &str = r#"{"self_id":1,"user_id":42,"message_type":"private","raw_message":"hi"}"#;

    fn idle_loop(capacity: usize) -> (IngestLoop, crate::queue::QueueReceiver) {
        let (queue, rx) = admission_queue(capacity);
        let (source, _) = ScriptedSource::boxed(vec![]);
        (IngestLoop::new(source, queue, Duration::from_millis(1)), rx)
    }

    #[tokio::test]
    async fn private_event_is_admitted() {
        let (ingest, rx) = idle_loop(4);
        assert_eq!(ingest.ingest_frame(PRIVATE), FrameDisposition::Admitted);
        assert_eq!(rx.take().await.map(|e| e.user_id), Some(42));
    }

    #[tokio::test]
    async fn group_and_non_private_events_are_dropped() {
        let (ingest, _rx) = idle_loop(4);
        let group = r#"{"user_id":42,"message_type":"private","group_id":99,"raw_message":"hi"}"#;
        let other = r#"{"user_id":42,"message_type":"notice","raw_message":"hi"}"#;

        assert_eq!(ingest.ingest_frame(group), FrameDisposition::Group);
        assert_eq!(ingest.ingest_frame(other), FrameDisposition::NotPrivate);
        assert_eq!(ingest.queue.pending(), 0);
    }

    #[tokio::test]
    async fn null_group_id_is_not_a_group() {
        let (ingest, _rx) = idle_loop(4);
        let frame = r#"{"user_id":42,"message_type":"private","group_id":null,"raw_message":"hi"}"#;
        assert_eq!(ingest.ingest_frame(frame), FrameDisposition::Admitted);
    }

    #[tokio::test]
    #[traced_test]
    async fn malformed_frame_is_dropped_and_logged() {
        let (ingest, _rx) = idle_loop(4);
        assert_eq!(ingest.ingest_frame("{not json"), FrameDisposition::Malformed);
        assert!(logs_contain("dropping malformed frame"));
    }

    #[tokio::test]
    #[traced_test]
    async fn full_queue_drops_and_logs_user() {
        let (ingest, _rx) = idle_loop(1);
        assert_eq!(ingest.ingest_frame(PRIVATE), FrameDisposition::Admitted);
        assert_eq!(ingest.ingest_frame(PRIVATE), FrameDisposition::Full);
        assert!(logs_contain("message queue full"));
        assert!(logs_contain("user_id=42"));
    }

    #[tokio::test]
    async fn read_error_is_retried() {
        let (queue, rx) = admission_queue(4);
        let (source, shut_down) = ScriptedSource::boxed(vec![Err("reset"), Ok(PRIVATE)]);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(
            IngestLoop::new(source, queue, Duration::from_millis(5)).run(cancel.clone()),
        );

        let event = tokio::time::timeout(Duration::from_secs(2), rx.take())
            .await
            .expect("frame after the error should be admitted");
        assert_eq!(event.map(|e| e.user_id), Some(42));

        cancel.cancel();
        task.await.unwrap();
        assert!(shut_down.load(Ordering::SeqCst));
        // Ingestion dropped the producer, so the queue is closed.
        assert!(rx.take().await.is_none());
    }

    #[tokio::test]
    async fn cancellation_interrupts_retry_backoff() {
        let (queue, _rx) = admission_queue(4);
        let (source, shut_down) = ScriptedSource::boxed(vec![Err("down")]);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(
            IngestLoop::new(source, queue, Duration::from_secs(3600)).run(cancel.clone()),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("loop should stop during backoff")
            .unwrap();
        assert!(shut_down.load(Ordering::SeqCst));
    }
}
