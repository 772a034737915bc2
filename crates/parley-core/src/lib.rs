// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley relay.
//!
//! This crate provides the event model, the error type, and the adapter
//! traits that separate the dispatch pipeline from its external
//! collaborators: the inbound socket, the conversational backend, and the
//! reply delivery endpoint.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RelayError;
pub use types::{AdapterType, Event, Fingerprint, HealthStatus, OutboundReply, UserId};

pub use traits::{BackendAdapter, Conversation, DeliveryAdapter, EventSource, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_error_messages() {
        let config = RelayError::Config("missing gemini.apiKey".into());
        assert_eq!(config.to_string(), "configuration error: missing gemini.apiKey");

        let source = RelayError::source_closed("socket closed");
        assert_eq!(source.to_string(), "source error: socket closed");

        let decode = RelayError::from(serde_json::from_str::<Event>("{").unwrap_err());
        assert!(decode.to_string().starts_with("failed to decode frame"));

        let timeout = RelayError::Timeout {
            duration: std::time::Duration::from_secs(10),
        };
        assert_eq!(timeout.to_string(), "operation timed out after 10s");

        let _io = RelayError::from(std::io::Error::other("test"));
        let _input = RelayError::InvalidInput("empty".into());
        let _backend = RelayError::Backend {
            message: "test".into(),
            source: None,
        };
        let _delivery = RelayError::Delivery {
            message: "test".into(),
            source: None,
        };
        let _internal = RelayError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Source, AdapterType::Backend, AdapterType::Delivery] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_event_source<T: EventSource>() {}
        fn _assert_backend_adapter<T: BackendAdapter>() {}
        fn _assert_delivery_adapter<T: DeliveryAdapter>() {}
        fn _assert_conversation<T: Conversation>() {}
    }
}
