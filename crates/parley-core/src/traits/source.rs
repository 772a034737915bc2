// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event source trait for the inbound socket.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::traits::adapter::PluginAdapter;

/// A long-lived inbound connection that yields discrete text frames.
///
/// The ingestion loop owns its source exclusively, hence `&mut self`.
#[async_trait]
pub trait EventSource: PluginAdapter {
    /// Establishes the connection. Called once at startup; failure is fatal.
    async fn connect(&mut self) -> Result<(), RelayError>;

    /// Blocks until the next text frame arrives.
    ///
    /// An error means the read failed; the caller backs off and calls again.
    /// Implementations may re-establish a dropped connection on the next call.
    async fn next_frame(&mut self) -> Result<String, RelayError>;
}
