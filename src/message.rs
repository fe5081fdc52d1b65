// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission payload and the outbound Slack message built from it.
//!
//! The outbound layout is fixed: a header, a two-column field section,
//! the free-text message, and a context line with the source tag and a
//! human-readable timestamp captured at build time.

use crate::config::SlackConfig;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Contact-form payload as posted by the public client.
///
/// Every field deserializes as optional so that presence is enforced by
/// [`SubmissionRequest::has_required_fields`] with a 400, not by a
/// serde-level rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl SubmissionRequest {
    /// True when `name`, `email` and `message` are all present and non-empty.
    pub fn has_required_fields(&self) -> bool {
        [&self.name, &self.email, &self.message]
            .iter()
            .all(|f| matches!(f.as_deref(), Some(v) if !v.is_empty()))
    }
}

/// Block Kit text object.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

/// Block Kit layout block.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        text: TextObject,
    },
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<TextObject>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<TextObject>>,
    },
    Context {
        elements: Vec<TextObject>,
    },
}

/// Message payload for `chat.postMessage`.
///
/// Built exactly once per accepted submission and immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub channel: String,
    pub text: String,
    pub blocks: Vec<Block>,
}

impl OutboundMessage {
    /// Build the fixed-layout message for one submission.
    pub fn build(
        submission: &SubmissionRequest,
        slack: &SlackConfig,
        at: DateTime<Local>,
    ) -> Self {
        let blocks = vec![
            Block::Header {
                text: TextObject::plain("📨 New Contact CTA Submission"),
            },
            Block::Section {
                text: None,
                fields: Some(vec![
                    TextObject::mrkdwn(format!("*Name:*\n{}", field_or_dash(&submission.name))),
                    TextObject::mrkdwn(format!("*Email:*\n{}", field_or_dash(&submission.email))),
                    TextObject::mrkdwn(format!("*Phone:*\n{}", field_or_dash(&submission.phone))),
                    TextObject::mrkdwn(format!(
                        "*Company:*\n{}",
                        field_or_dash(&submission.company)
                    )),
                ]),
            },
            Block::Section {
                text: Some(TextObject::mrkdwn(format!(
                    "*Message:*\n{}",
                    field_or_dash(&submission.message)
                ))),
                fields: None,
            },
            Block::Context {
                elements: vec![TextObject::mrkdwn(format!(
                    "🌐 Source: *{}* • {}",
                    slack.source_tag,
                    at.format("%Y-%m-%d %H:%M:%S"),
                ))],
            },
        ];

        Self {
            channel: slack.channel_id.clone(),
            text: "New Contact CTA Message".to_string(),
            blocks,
        }
    }
}

/// Render an optional field, substituting a dash when absent or empty.
fn field_or_dash(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("—")
}
