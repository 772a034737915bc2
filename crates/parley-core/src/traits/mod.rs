// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the relay's external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod backend;
pub mod delivery;
pub mod source;

pub use adapter::PluginAdapter;
pub use backend::{BackendAdapter, Conversation};
pub use delivery::DeliveryAdapter;
pub use source::EventSource;
