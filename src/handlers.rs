// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact relay.
//!
//! The submit pipeline runs rate limiting before validation, matching the
//! middleware order of the public endpoint: a request that reaches the
//! handler consumes quota even when its fields are incomplete. The health
//! probe sits outside the limiter entirely.

use crate::config::Config;
use crate::error::RelayError;
use crate::limiter::{RateLimitDecision, SubmissionLimiter};
use crate::message::{OutboundMessage, SubmissionRequest};
use crate::slack::{SlackClient, SlackError};
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: SubmissionLimiter,
    pub slack: SlackClient,
    pub config: Config,
}

/// Success response body.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
}

/// Build the application router with CORS outermost, so disallowed-origin
/// preflights are refused before the limiter ever sees them.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/", get(health))
        .route("/contact-submit", post(submit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint. Never rate limited, never validated.
pub async fn health() -> &'static str {
    "✅ Contact relay is running"
}

/// Handle one contact-form submission.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(submission): Json<SubmissionRequest>,
) -> Response {
    let ip = client_ip(&headers, peer);

    let (limit, remaining, reset_in) = match state.limiter.check(ip).await {
        RateLimitDecision::Limited { limit, retry_after } => {
            warn!(%ip, "submission rate limited");
            return RelayError::RateLimited { limit, retry_after }.into_response();
        }
        RateLimitDecision::Allowed {
            limit,
            remaining,
            reset_in,
        } => (limit, remaining, reset_in),
    };

    let quota_headers = [
        ("RateLimit-Limit", limit.to_string()),
        ("RateLimit-Remaining", remaining.to_string()),
        ("RateLimit-Reset", reset_in.as_secs().to_string()),
    ];

    if !submission.has_required_fields() {
        info!(%ip, "submission missing required fields");
        return (quota_headers, RelayError::MissingFields.into_response()).into_response();
    }

    let message = OutboundMessage::build(&submission, &state.config.slack, Local::now());

    match state.slack.post_message(&message).await {
        Ok(()) => {
            info!(%ip, channel = %message.channel, "submission relayed");
            (
                StatusCode::OK,
                quota_headers,
                Json(SubmitResponse { ok: true }),
            )
                .into_response()
        }
        Err(SlackError::Rejected { code }) => {
            error!(%ip, code = ?code, "Slack rejected the submission");
            (
                quota_headers,
                RelayError::UpstreamRejected { code }.into_response(),
            )
                .into_response()
        }
        Err(err) => {
            error!(%ip, error = %err, "failed to reach Slack");
            (
                quota_headers,
                RelayError::UpstreamUnavailable { source: err }.into_response(),
            )
                .into_response()
        }
    }
}

/// Resolve the originating client identity.
///
/// The relay runs behind a reverse proxy, so the first `X-Forwarded-For`
/// hop wins; direct connections fall back to the socket peer.
fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| peer.ip())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let patterns = allowed_origins.to_vec();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts| {
                origin
                    .to_str()
                    .map(|o| patterns.iter().any(|p| origin_matches(p, o)))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Match an origin against an allow-list entry with an optional single
/// `*` wildcard (e.g. `https://*.up.railway.app`).
fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            origin.len() > prefix.len() + suffix.len()
                && origin.starts_with(prefix)
                && origin.ends_with(suffix)
        }
        None => pattern == origin,
    }
}
