// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a
//! no-op.

use metrics::{describe_counter, describe_gauge, describe_histogram};

use crate::pipeline::Outcome;

/// Register all Parley metric descriptions.
pub fn register_metrics() {
    describe_counter!("parley_events_total", "Events handled by a worker, by outcome");
    describe_counter!(
        "parley_admission_total",
        "Frames seen by the ingestion loop, by admission result"
    );
    describe_gauge!("parley_conversations", "Live backend conversations");
    describe_histogram!(
        "parley_backend_latency_seconds",
        "Backend exchange latency in seconds"
    );
}

/// Record the terminal outcome of one event.
pub fn record_outcome(outcome: Outcome) {
    let label: &'static str = outcome.into();
    metrics::counter!("parley_events_total", "outcome" => label).increment(1);
}

/// Record an ingestion decision (`admitted`, `full`, `group`, ...).
pub fn record_admission(result: &'static str) {
    metrics::counter!("parley_admission_total", "result" => result).increment(1);
}

pub fn set_conversations(count: usize) {
    metrics::gauge!("parley_conversations").set(count as f64);
}

pub fn record_backend_latency(seconds: f64) {
    metrics::histogram!("parley_backend_latency_seconds").record(seconds);
}
