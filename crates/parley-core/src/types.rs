// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event model and common types shared by the adapters and the dispatch pipeline.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Account identity on the chat platform (both the bot and its peers).
pub type UserId = i64;

/// The `message_type` of a one-to-one conversation.
pub const PRIVATE_MESSAGE_TYPE: &str = "private";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the relay.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Source,
    Backend,
    Delivery,
}

/// One decoded inbound chat notification.
///
/// Every field tolerates being absent or `null` in the frame; the OneBot
/// implementations omit fields depending on the event kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "null_as_default")]
    pub self_id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender: Sender,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: Vec<MessageSegment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw: RawContent,
    /// Present (non-null) only for group conversations.
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// Sender details attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Sender {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nickname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub card: String,
}

/// A structured message segment (`{"type": "text", "data": {"text": "..."}}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageSegment {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: SegmentData,
}

/// Payload of a message segment. Only the text is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SegmentData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// The platform's raw message body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub elements: Vec<RawElement>,
}

/// One raw element; non-text elements carry no `textElement`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawElement {
    #[serde(rename = "textElement", default)]
    pub text_element: Option<TextElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TextElement {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl Event {
    /// Decodes one text frame from the inbound socket.
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }

    /// Whether the event belongs to a group conversation.
    pub fn has_group_context(&self) -> bool {
        self.group_id.is_some()
    }

    /// Whether the event is a one-to-one conversation message.
    pub fn is_private(&self) -> bool {
        self.message_type == PRIVATE_MESSAGE_TYPE
    }

    /// Computes the deduplication key for this event.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }

    /// Extracts the text to send to the backend.
    ///
    /// Precedence: the raw message, then the first structured segment's text,
    /// then the first raw element's content. Returns `None` when the chosen
    /// fallback chain ends in empty text.
    pub fn extract_input(&self) -> Option<&str> {
        if !self.raw_message.is_empty() {
            return Some(&self.raw_message);
        }
        if let Some(segment) = self.message.first()
            && !segment.data.text.is_empty()
        {
            return Some(&segment.data.text);
        }
        self.raw
            .elements
            .first()
            .and_then(|e| e.text_element.as_ref())
            .map(|t| t.content.as_str())
            .filter(|c| !c.is_empty())
    }
}

/// Deterministic deduplication key derived from an event's content fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// `{self_id}_{user_id}_{raw_message}_{post_type}_{sub_type}_{target_id}`
    pub fn of(event: &Event) -> Self {
        Self(format!(
            "{}_{}_{}_{}_{}_{}",
            event.self_id,
            event.user_id,
            event.raw_message,
            event.post_type,
            event.sub_type,
            event.target_id
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reply to deliver back to the sender of an event.
///
/// Serializes to the delivery endpoint's body: `{"user_id": 42, "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub user_id: UserId,
    pub message: String,
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
