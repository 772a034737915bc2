// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the dispatch pipeline, session registry and worker pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parley_core::{
    AdapterType, DeliveryAdapter, Event, HealthStatus, OutboundReply, PluginAdapter, RelayError,
};
use parley_dispatch::{DedupStore, Outcome, Pipeline, SessionRegistry, WorkerPool, admission_queue};
use parley_test_utils::fixtures::{private_message, raw_element_message};
use parley_test_utils::{MockBackend, MockDelivery, MockReply};
use tracing_test::traced_test;

const PROMPT: &str = "Be brief.\n";

fn pipeline_with(backend: &MockBackend, delivery: &MockDelivery, prompt: &str) -> Pipeline {
    Pipeline::new(
        Arc::new(DedupStore::default()),
        Arc::new(SessionRegistry::new(Arc::new(backend.clone()), prompt)),
        Arc::new(delivery.clone()),
    )
}

fn event(value: serde_json::Value) -> Event {
    Event::decode(&value.to_string()).unwrap()
}

#[tokio::test]
async fn delivers_backend_reply_to_origin() {
    let backend = MockBackend::with_replies(["hi there"]);
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);

    let outcome = pipeline.handle(event(private_message(42, "hello"))).await;

    assert_eq!(outcome, Outcome::Delivered);
    assert_eq!(
        delivery.delivered().await,
        vec![OutboundReply {
            user_id: 42,
            message: "hi there".into()
        }]
    );
    let calls = backend.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].input, "hello");
    assert_eq!(calls[0].system_instruction, PROMPT);
}

#[tokio::test]
async fn duplicate_event_is_processed_once() {
    let backend = MockBackend::new();
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);
    let frame = private_message(42, "hello");

    assert_eq!(pipeline.handle(event(frame.clone())).await, Outcome::Delivered);
    assert_eq!(pipeline.handle(event(frame)).await, Outcome::Duplicate);

    assert_eq!(backend.call_count().await, 1);
    assert_eq!(delivery.delivered_count().await, 1);
    assert_eq!(pipeline.dedup().len(), 1);
}

#[tokio::test]
async fn empty_event_never_reaches_backend() {
    let backend = MockBackend::new();
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);

    let outcome = pipeline.handle(event(private_message(42, ""))).await;

    assert_eq!(outcome, Outcome::EmptyInput);
    assert_eq!(backend.conversations_created(), 0);
    assert_eq!(delivery.delivered_count().await, 0);
}

#[tokio::test]
async fn raw_element_text_is_used_as_last_resort() {
    let backend = MockBackend::new();
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);

    pipeline.handle(event(raw_element_message(7, "from raw"))).await;

    assert_eq!(backend.calls().await[0].input, "from raw");
}

#[tokio::test]
async fn whitespace_input_is_rejected_without_backend_call() {
    let backend = MockBackend::new();
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);

    let outcome = pipeline.handle(event(private_message(42, "   "))).await;

    assert_eq!(outcome, Outcome::Rejected);
    assert_eq!(backend.conversations_created(), 0);
}

#[tokio::test]
async fn blank_prompt_rejects_every_exchange() {
    let backend = MockBackend::new();
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, " \n");

    let outcome = pipeline.handle(event(private_message(42, "hello"))).await;

    assert_eq!(outcome, Outcome::Rejected);
    assert_eq!(backend.conversations_created(), 0);
    let err = pipeline.exchange(42, "hello").await.unwrap_err();
    assert!(matches!(err, RelayError::InvalidInput(_)));
}

#[tokio::test]
async fn empty_backend_reply_sends_nothing() {
    let backend = MockBackend::with_replies([MockReply::Empty, MockReply::Text(String::new())]);
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);

    assert_eq!(pipeline.handle(event(private_message(1, "a"))).await, Outcome::NoReply);
    assert_eq!(pipeline.handle(event(private_message(1, "b"))).await, Outcome::NoReply);
    assert_eq!(delivery.delivered_count().await, 0);
}

#[tokio::test]
async fn backend_failure_is_contained() {
    let backend = MockBackend::with_replies([MockReply::Error("quota".into())]);
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);

    assert_eq!(
        pipeline.handle(event(private_message(1, "a"))).await,
        Outcome::BackendFailed
    );
    // The next event for the same user goes through normally.
    assert_eq!(
        pipeline.handle(event(private_message(1, "b"))).await,
        Outcome::Delivered
    );
}

#[tokio::test]
#[traced_test]
async fn delivery_failure_keeps_dedup_record() {
    let backend = MockBackend::new();
    let delivery = MockDelivery::new();
    delivery.fail_deliveries(true);
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);
    let frame = event(private_message(1, "a"));
    let fingerprint = frame.fingerprint().to_string();

    assert_eq!(pipeline.handle(frame.clone()).await, Outcome::DeliveryFailed);
    assert!(logs_contain("reply delivery failed"));
    assert!(logs_contain(&fingerprint));

    // A redelivered frame is still a duplicate once delivery works again.
    delivery.fail_deliveries(false);
    assert_eq!(pipeline.handle(frame).await, Outcome::Duplicate);
    assert_eq!(backend.call_count().await, 1);
    assert_eq!(delivery.delivered_count().await, 1);
}

#[tokio::test]
async fn one_conversation_per_identity() {
    let backend = MockBackend::new();
    let delivery = MockDelivery::new();
    let pipeline = pipeline_with(&backend, &delivery, PROMPT);

    pipeline.handle(event(private_message(1, "a"))).await;
    pipeline.handle(event(private_message(1, "b"))).await;
    pipeline.handle(event(private_message(2, "c"))).await;

    assert_eq!(backend.conversations_created(), 2);
    assert_eq!(pipeline.sessions().len().await, 2);
    let calls = backend.calls().await;
    assert_eq!(calls[0].conversation, calls[1].conversation);
    assert_ne!(calls[0].conversation, calls[2].conversation);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_events_create_one_conversation() {
    let backend = MockBackend::new();
    let registry = Arc::new(SessionRegistry::new(Arc::new(backend.clone()), PROMPT));

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.get_or_create(42).await.map(|_| ()) })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(backend.conversations_created(), 1);
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn failed_creation_is_retried_on_next_event() {
    let backend = MockBackend::new();
    let registry = SessionRegistry::new(Arc::new(backend.clone()), PROMPT);

    backend.fail_create(true);
    assert!(registry.get_or_create(5).await.is_err());
    assert!(registry.is_empty().await);

    backend.fail_create(false);
    assert!(registry.get_or_create(5).await.is_ok());
    assert_eq!(registry.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pool_drains_queue_before_exiting() {
    let backend = MockBackend::new();
    let delivery = MockDelivery::new();
    let pipeline = Arc::new(pipeline_with(&backend, &delivery, PROMPT));

    let (queue, receiver) = admission_queue(32);
    for i in 0..20 {
        assert!(queue.offer(event(private_message(i, "ping"))).is_admitted());
    }
    let pool = WorkerPool::spawn(4, receiver, pipeline);
    assert_eq!(pool.size(), 4);
    drop(queue);

    assert!(pool.join(Duration::from_secs(5)).await);
    assert_eq!(delivery.delivered_count().await, 20);
}

/// Delivery that never completes.
struct StalledDelivery;

#[async_trait]
impl PluginAdapter for StalledDelivery {
    fn name(&self) -> &str {
        "stalled"
    }
    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Delivery
    }
    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        Ok(HealthStatus::Healthy)
    }
    async fn shutdown(&self) -> Result<(), RelayError> {
        Ok(())
    }
}

#[async_trait]
impl DeliveryAdapter for StalledDelivery {
    async fn deliver(&self, _reply: &OutboundReply) -> Result<(), RelayError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn pool_join_gives_up_after_timeout() {
    let backend = MockBackend::new();
    let pipeline = Arc::new(Pipeline::new(
        Arc::new(DedupStore::default()),
        Arc::new(SessionRegistry::new(Arc::new(backend), PROMPT)),
        Arc::new(StalledDelivery),
    ));

    let (queue, receiver) = admission_queue(4);
    queue.offer(event(private_message(1, "stuck")));
    let pool = WorkerPool::spawn(1, receiver, pipeline);
    drop(queue);

    assert!(!pool.join(Duration::from_millis(50)).await);
}
