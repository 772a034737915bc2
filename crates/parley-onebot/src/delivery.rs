// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply delivery through the OneBot HTTP API (`send_private_msg`).

use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::HttpConfig;
use parley_core::{
    AdapterType, DeliveryAdapter, HealthStatus, OutboundReply, PluginAdapter, RelayError,
};
use reqwest::StatusCode;
use tracing::debug;

/// Path of the private-message action, relative to `http.url`.
pub const SEND_PRIVATE_MSG: &str = "/send_private_msg";

/// [`DeliveryAdapter`] posting replies to the OneBot HTTP API.
pub struct OneBotDelivery {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    timeout: Duration,
}

impl OneBotDelivery {
    pub fn new(config: &HttpConfig) -> Result<Self, RelayError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Delivery {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}{SEND_PRIVATE_MSG}", config.url.trim_end_matches('/')),
            token: config.url_token.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PluginAdapter for OneBotDelivery {
    fn name(&self) -> &str {
        "onebot-http"
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
impl DeliveryAdapter for OneBotDelivery {
    async fn deliver(&self, reply: &OutboundReply) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(reply)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    RelayError::Delivery {
                        message: format!("send_private_msg request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        debug!(status = %status, user_id = reply.user_id, "send_private_msg response received");

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Delivery {
                message: format!("send_private_msg returned {status}: {body}"),
                source: None,
            });
        }
        Ok(())
    }
}
