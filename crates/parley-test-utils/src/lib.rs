// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a live socket, backend or
//! delivery endpoint.
//!
//! # Components
//!
//! - [`MockBackend`] - Mock conversational backend with scripted replies
//! - [`MockDelivery`] - Mock delivery endpoint capturing outbound replies
//! - [`MockSource`] - Mock event source with frame injection
//! - [`TestHarness`] - The real relay running over the mocks

pub mod fixtures;
pub mod harness;
pub mod mock_backend;
pub mod mock_delivery;
pub mod mock_source;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_backend::{MockBackend, MockCall, MockReply};
pub use mock_delivery::MockDelivery;
pub use mock_source::{MockSource, MockSourceHandle};
