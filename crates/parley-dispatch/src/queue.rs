// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded admission queue between the ingestion loop and the worker pool.
//!
//! Admission never blocks: when the queue is full the event is handed back to
//! the caller, which drops it. Any number of workers share one receiver.

use std::sync::Arc;

use parley_core::Event;
use tokio::sync::{Mutex, mpsc};

/// Outcome of offering an event to the queue.
#[derive(Debug)]
pub enum Offer {
    Admitted,
    /// Queue at capacity. The event is returned unqueued.
    Full(Event),
    /// Every receiver is gone. The event is returned unqueued.
    Closed(Event),
}

impl Offer {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Producer half. Dropping every clone closes the queue.
#[derive(Clone)]
pub struct AdmissionQueue {
    tx: mpsc::Sender<Event>,
}

/// Consumer half, shared by all workers.
#[derive(Clone)]
pub struct QueueReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Event>>>,
}

/// Creates a queue holding at most `capacity` pending events.
pub fn admission_queue(capacity: usize) -> (AdmissionQueue, QueueReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        AdmissionQueue { tx },
        QueueReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

impl AdmissionQueue {
    /// Non-blocking enqueue.
    pub fn offer(&self, event: Event) -> Offer {
        match self.tx.try_send(event) {
            Ok(()) => Offer::Admitted,
            Err(mpsc::error::TrySendError::Full(event)) => Offer::Full(event),
            Err(mpsc::error::TrySendError::Closed(event)) => Offer::Closed(event),
        }
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Events currently waiting for a worker.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

impl QueueReceiver {
    /// Waits for the next event. Returns `None` once the queue is closed and
    /// drained.
    pub async fn take(&self) -> Option<Event> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(user_id: i64) -> Event {
        Event {
            user_id,
            message_type: "private".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn full_queue_hands_event_back() {
        let (queue, _rx) = admission_queue(2);
        assert!(queue.offer(event(1)).is_admitted());
        assert!(queue.offer(event(2)).is_admitted());
        assert_eq!(queue.pending(), 2);

        match queue.offer(event(3)) {
            Offer::Full(rejected) => assert_eq!(rejected.user_id, 3),
            other => panic!("expected Full, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_queue_hands_event_back() {
        let (queue, rx) = admission_queue(1);
        drop(rx);
        assert!(matches!(queue.offer(event(1)), Offer::Closed(_)));
    }

    #[tokio::test]
    async fn receiver_drains_then_ends_after_sender_drop() {
        let (queue, rx) = admission_queue(4);
        queue.offer(event(1));
        queue.offer(event(2));
        drop(queue);

        assert_eq!(rx.take().await.map(|e| e.user_id), Some(1));
        assert_eq!(rx.take().await.map(|e| e.user_id), Some(2));
        assert!(rx.take().await.is_none());
    }

    #[tokio::test]
    async fn shared_receivers_each_get_distinct_events() {
        let (queue, rx) = admission_queue(8);
        for id in 0..6 {
            queue.offer(event(id));
        }
        drop(queue);

        let a = rx.clone();
        let b = rx.clone();
        let (left, right) = tokio::join!(
            async move {
                let mut got = Vec::new();
                while let Some(e) = a.take().await {
                    got.push(e.user_id);
                }
                got
            },
            async move {
                let mut got = Vec::new();
                while let Some(e) = b.take().await {
                    got.push(e.user_id);
                }
                got
            }
        );

        let mut all: Vec<_> = left.into_iter().chain(right).collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (queue, _rx) = admission_queue(0);
        assert_eq!(queue.capacity(), 1);
    }
}
