// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-size pool of workers consuming the admission queue.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::pipeline::Pipeline;
use crate::queue::QueueReceiver;

/// Handles to the running workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `workers` tasks that each take events until the queue closes.
    pub fn spawn(workers: usize, queue: QueueReceiver, pipeline: Arc<Pipeline>) -> Self {
        let workers = workers.max(1);
        let handles = (0..workers)
            .map(|id| tokio::spawn(worker_loop(id, queue.clone(), Arc::clone(&pipeline))))
            .collect();
        info!(workers, "worker pool started");
        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to finish draining the queue.
    ///
    /// The queue's producer must be dropped first or this only returns on
    /// timeout. Workers still running after `timeout` are aborted; returns
    /// `false` in that case.
    pub async fn join(self, timeout: Duration) -> bool {
        let aborts: Vec<AbortHandle> = self.handles.iter().map(|h| h.abort_handle()).collect();

        match tokio::time::timeout(timeout, join_all(self.handles)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result
                        && e.is_panic()
                    {
                        error!(error = %e, "worker panicked");
                    }
                }
                info!("worker pool drained");
                true
            }
            Err(_) => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "worker pool did not drain in time, aborting workers"
                );
                for abort in aborts {
                    abort.abort();
                }
                false
            }
        }
    }
}

async fn worker_loop(id: usize, queue: QueueReceiver, pipeline: Arc<Pipeline>) {
    debug!(worker = id, "worker started");
    while let Some(event) = queue.take().await {
        let outcome = pipeline.handle(event).await;
        crate::metrics::record_outcome(outcome);
        debug!(worker = id, %outcome, "event finished");
    }
    debug!(worker = id, "queue closed, worker exiting");
}
