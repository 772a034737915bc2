// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch core for the Parley relay.
//!
//! The [`Relay`] is the central coordinator that:
//! - Reads frames from an event source and admits private events to a bounded queue
//! - Runs a fixed pool of workers over the queue
//! - Deduplicates events and keeps one backend conversation per user
//! - Delivers replies back through the delivery adapter
//! - Stops ingestion on cancellation and drains in-flight work

pub mod dedup;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod pool;
pub mod queue;
pub mod session;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use parley_config::model::RelayConfig;
use parley_core::{BackendAdapter, DeliveryAdapter, EventSource};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use dedup::{DedupPolicy, DedupStore, DedupVerdict};
pub use ingest::{FrameDisposition, IngestLoop};
pub use pipeline::{Outcome, Pipeline};
pub use pool::WorkerPool;
pub use queue::{AdmissionQueue, Offer, QueueReceiver, admission_queue};
pub use session::SessionRegistry;

/// Sizing and timing knobs for a [`Relay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub workers: usize,
    pub queue_capacity: usize,
    pub dedup: DedupPolicy,
    pub read_retry_delay: Duration,
    pub shutdown_timeout: Duration,
}

impl RelaySettings {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            workers: config.workers,
            queue_capacity: config.queue_capacity,
            dedup: DedupPolicy::from_capacity(config.dedup_capacity),
            read_retry_delay: Duration::from_millis(config.read_retry_delay_ms),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

/// Everything needed to run the relay except the event source.
pub struct Relay {
    settings: RelaySettings,
    pipeline: Arc<Pipeline>,
}

impl Relay {
    pub fn new(
        settings: RelaySettings,
        backend: Arc<dyn BackendAdapter>,
        delivery: Arc<dyn DeliveryAdapter>,
        system_prompt: impl Into<String>,
    ) -> Self {
        let dedup = Arc::new(DedupStore::new(settings.dedup));
        let sessions = Arc::new(SessionRegistry::new(backend, system_prompt));
        let pipeline = Arc::new(Pipeline::new(dedup, sessions, delivery));
        Self { settings, pipeline }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub fn pipeline(&self) -> Arc<Pipeline> {
        Arc::clone(&self.pipeline)
    }

    /// Runs until `cancel` fires, then drains.
    ///
    /// `source` must already be connected. Returns `true` when every worker
    /// finished within the shutdown timeout.
    pub async fn run(&self, source: Box<dyn EventSource>, cancel: CancellationToken) -> bool {
        let (queue, receiver) = admission_queue(self.settings.queue_capacity);
        let pool = WorkerPool::spawn(self.settings.workers, receiver, Arc::clone(&self.pipeline));

        info!(
            workers = pool.size(),
            queue_capacity = queue.capacity(),
            dedup = ?self.pipeline.dedup().policy(),
            "relay running"
        );

        IngestLoop::new(source, queue, self.settings.read_retry_delay)
            .run(cancel)
            .await;

        pool.join(self.settings.shutdown_timeout).await
    }
}
