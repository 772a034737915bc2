// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery trait for sending replies back to the chat platform.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OutboundReply;

/// Outbound request channel for replies.
#[async_trait]
pub trait DeliveryAdapter: PluginAdapter {
    /// Delivers one reply. Any failure is reported, never retried here.
    async fn deliver(&self, reply: &OutboundReply) -> Result<(), RelayError>;
}
