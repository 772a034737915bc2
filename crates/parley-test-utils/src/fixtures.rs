// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned OneBot frames.

use serde_json::{Value, json};

pub const SELF_ID: i64 = 10001;

/// A private text message carried in `raw_message`.
pub fn private_message(user_id: i64, text: &str) -> Value {
    json!({
        "self_id": SELF_ID,
        "user_id": user_id,
        "post_type": "message",
        "message_type": "private",
        "sub_type": "friend",
        "target_id": SELF_ID,
        "raw_message": text,
        "message": [{"type": "text", "data": {"text": text}}],
        "sender": {"user_id": user_id, "nickname": "tester"}
    })
}

/// A group message that must never be admitted.
pub fn group_message(user_id: i64, group_id: i64, text: &str) -> Value {
    let mut frame = private_message(user_id, text);
    frame["group_id"] = json!(group_id);
    frame["message_type"] = json!("group");
    frame
}

/// A private message whose only text is in `raw.elements[0].textElement.content`.
pub fn raw_element_message(user_id: i64, text: &str) -> Value {
    json!({
        "self_id": SELF_ID,
        "user_id": user_id,
        "message_type": "private",
        "raw_message": "",
        "message": [],
        "raw": {"elements": [{"textElement": {"content": text}}]}
    })
}
