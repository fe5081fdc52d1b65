// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Slack API client for `chat.postMessage`.
//!
//! One outbound attempt per accepted submission, no retries. The request
//! carries an explicit timeout so a stalled upstream cannot pin handler
//! tasks indefinitely.

use crate::message::OutboundMessage;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound delivery errors.
#[derive(Debug, Error)]
pub enum SlackError {
    /// The request never completed (connect failure, timeout, or an
    /// undecodable response body).
    #[error("transport failure reaching Slack: {0}")]
    Transport(#[from] reqwest::Error),

    /// Slack responded but declined the message.
    #[error("Slack declined the message: {}", code.as_deref().unwrap_or("unknown error"))]
    Rejected { code: Option<String> },
}

/// Response envelope from `chat.postMessage`.
#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack API client.
pub struct SlackClient {
    api_base: String,
    bot_token: String,
    client: reqwest::Client,
}

impl SlackClient {
    /// Create a new client for the given API base URL and bot token.
    pub fn new(api_base: impl Into<String>, bot_token: impl Into<String>) -> Result<Self, SlackError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            api_base: api_base.into(),
            bot_token: bot_token.into(),
            client,
        })
    }

    /// Post one message to the configured workspace.
    ///
    /// The response body is decoded regardless of HTTP status; only the
    /// envelope's `ok` flag decides acceptance.
    pub async fn post_message(&self, message: &OutboundMessage) -> Result<(), SlackError> {
        let url = format!("{}/chat.postMessage", self.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.bot_token)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        let result: PostMessageResponse = response.json().await?;

        if result.ok {
            info!(channel = %message.channel, "Slack message posted");
            Ok(())
        } else {
            warn!(%status, error = ?result.error, "Slack declined the message");
            Err(SlackError::Rejected { code: result.error })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = SlackClient::new("http://localhost:9999", "xoxb-test").unwrap();
        assert_eq!(client.api_base, "http://localhost:9999");
        assert_eq!(client.bot_token, "xoxb-test");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        let client = SlackClient::new("http://127.0.0.1:1", "xoxb-test").unwrap();
        let message = OutboundMessage {
            channel: "C012345".to_string(),
            text: "test".to_string(),
            blocks: vec![],
        };

        let err = client.post_message(&message).await.unwrap_err();
        assert!(matches!(err, SlackError::Transport(_)));
    }
}
