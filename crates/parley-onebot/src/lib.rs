// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OneBot adapters for the Parley relay.
//!
//! Implements [`EventSource`](parley_core::EventSource) over the OneBot
//! websocket and [`DeliveryAdapter`](parley_core::DeliveryAdapter) over the
//! OneBot HTTP API.

pub mod delivery;
pub mod source;

pub use delivery::OneBotDelivery;
pub use source::OneBotSource;
