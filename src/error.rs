// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Error types for the contact relay.
//!
//! Every failure is handled at the request boundary and converted to a
//! `{ok: false, error: "..."}` JSON body. The `#[error]` display strings
//! are the wire messages.

use crate::slack::SlackError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Failure response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

/// Request-path error taxonomy.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Client input incomplete
    #[error("Missing required fields.")]
    MissingFields,

    /// Submission quota exceeded
    #[error("Too many submissions. Please try again later.")]
    RateLimited { limit: u32, retry_after: Duration },

    /// Transport-level failure reaching Slack
    #[error("Internal server error")]
    UpstreamUnavailable {
        #[source]
        source: SlackError,
    },

    /// Slack responded but declined the message
    #[error("Slack message failed")]
    UpstreamRejected { code: Option<String> },
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnavailable { .. } | Self::UpstreamRejected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorBody {
            ok: false,
            error: self.to_string(),
        });

        match self {
            Self::RateLimited { limit, retry_after } => {
                let secs = retry_after.as_secs().max(1);
                (
                    status,
                    [
                        ("Retry-After", secs.to_string()),
                        ("RateLimit-Limit", limit.to_string()),
                        ("RateLimit-Remaining", "0".to_string()),
                        ("RateLimit-Reset", secs.to_string()),
                    ],
                    body,
                )
                    .into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
