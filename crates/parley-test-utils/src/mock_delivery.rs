// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery adapter that captures outbound replies for assertion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use parley_core::{
    AdapterType, DeliveryAdapter, HealthStatus, OutboundReply, PluginAdapter, RelayError,
};

/// A mock delivery endpoint for testing.
///
/// Every reply passed to `deliver()` is captured, including ones that are
/// then reported as failed.
#[derive(Clone, Default)]
pub struct MockDelivery {
    delivered: Arc<Mutex<Vec<OutboundReply>>>,
    fail: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery report failure.
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn delivered(&self) -> Vec<OutboundReply> {
        self.delivered.lock().await.clone()
    }

    pub async fn delivered_count(&self) -> usize {
        self.delivered.lock().await.len()
    }

    /// Waits until at least `count` replies were captured.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.notify.notified();
                if self.delivered_count().await >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl PluginAdapter for MockDelivery {
    fn name(&self) -> &str {
        "mock-delivery"
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
impl DeliveryAdapter for MockDelivery {
    async fn deliver(&self, reply: &OutboundReply) -> Result<(), RelayError> {
        self.delivered.lock().await.push(reply.clone());
        self.notify.notify_waiters();

        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayError::Delivery {
                message: "mock delivery rejected".into(),
                source: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(text: &str) -> OutboundReply {
        OutboundReply {
            user_id: 7,
            message: text.to_string(),
        }
    }

    #[tokio::test]
    async fn captures_replies() {
        let delivery = MockDelivery::new();
        delivery.deliver(&reply("one")).await.unwrap();
        assert_eq!(delivery.delivered().await, vec![reply("one")]);
    }

    #[tokio::test]
    async fn failing_delivery_still_captures() {
        let delivery = MockDelivery::new();
        delivery.fail_deliveries(true);
        assert!(delivery.deliver(&reply("x")).await.is_err());
        assert_eq!(delivery.delivered_count().await, 1);
    }

    #[tokio::test]
    async fn wait_for_times_out_without_deliveries() {
        let delivery = MockDelivery::new();
        assert!(!delivery.wait_for(1, Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn wait_for_wakes_on_delivery() {
        let delivery = MockDelivery::new();
        let sender = delivery.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            sender.deliver(&reply("late")).await.unwrap();
        });
        assert!(delivery.wait_for(1, Duration::from_secs(2)).await);
    }
}
