// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event processing: deduplicate, extract, exchange, deliver.
//!
//! Every stage either passes the event on or ends it with an [`Outcome`].
//! No failure here propagates past the worker that runs the pipeline.

use std::sync::Arc;
use std::time::Instant;

use parley_core::{DeliveryAdapter, Event, OutboundReply, RelayError, UserId};
use tracing::{debug, error, info, warn};

use crate::dedup::{DedupStore, DedupVerdict};
use crate::session::SessionRegistry;

/// Terminal state of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// A reply was accepted by the delivery endpoint.
    Delivered,
    /// The fingerprint was already recorded.
    Duplicate,
    /// No input text could be extracted.
    EmptyInput,
    /// The system prompt or the input was blank.
    Rejected,
    /// The backend answered with nothing to send.
    NoReply,
    BackendFailed,
    DeliveryFailed,
}

/// The shared state and collaborators every worker runs events through.
pub struct Pipeline {
    dedup: Arc<DedupStore>,
    sessions: Arc<SessionRegistry>,
    delivery: Arc<dyn DeliveryAdapter>,
}

impl Pipeline {
    pub fn new(
        dedup: Arc<DedupStore>,
        sessions: Arc<SessionRegistry>,
        delivery: Arc<dyn DeliveryAdapter>,
    ) -> Self {
        Self {
            dedup,
            sessions,
            delivery,
        }
    }

    pub fn dedup(&self) -> &DedupStore {
        &self.dedup
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Runs one admitted event to completion.
    pub async fn handle(&self, event: Event) -> Outcome {
        let fingerprint = event.fingerprint();

        if self.dedup.check_and_insert(&fingerprint) == DedupVerdict::Duplicate {
            debug!(%fingerprint, "duplicate event, skipping");
            return Outcome::Duplicate;
        }

        let Some(input) = event.extract_input() else {
            info!(user_id = event.user_id, "message content empty, skipping");
            return Outcome::EmptyInput;
        };

        info!(user_id = event.user_id, %fingerprint, input, "received message");

        let reply = match self.exchange(event.user_id, input).await {
            Ok(Some(reply)) if !reply.is_empty() => reply,
            Ok(_) => {
                info!(user_id = event.user_id, "backend returned no reply");
                return Outcome::NoReply;
            }
            Err(RelayError::InvalidInput(reason)) => {
                warn!(user_id = event.user_id, reason = %reason, "input rejected");
                return Outcome::Rejected;
            }
            Err(e) => {
                error!(user_id = event.user_id, error = %e, "backend exchange failed");
                return Outcome::BackendFailed;
            }
        };

        let outbound = OutboundReply {
            user_id: event.user_id,
            message: reply,
        };
        match self.delivery.deliver(&outbound).await {
            Ok(()) => {
                info!(user_id = event.user_id, %fingerprint, "reply delivered");
                Outcome::Delivered
            }
            Err(e) => {
                error!(user_id = event.user_id, %fingerprint, error = %e, "reply delivery failed");
                Outcome::DeliveryFailed
            }
        }
    }

    /// One conversational turn for `identity`.
    ///
    /// Blank prompts and blank inputs are rejected before any backend call.
    pub async fn exchange(
        &self,
        identity: UserId,
        input: &str,
    ) -> Result<Option<String>, RelayError> {
        if self.sessions.system_instruction().trim().is_empty() {
            return Err(RelayError::InvalidInput("system prompt is empty".into()));
        }
        if input.trim().is_empty() {
            return Err(RelayError::InvalidInput("input is empty".into()));
        }

        let conversation = self.sessions.get_or_create(identity).await?;

        let started = Instant::now();
        let reply = conversation.send(input).await;
        crate::metrics::record_backend_latency(started.elapsed().as_secs_f64());

        reply
    }
}
