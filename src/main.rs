// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Submission Relay Service
//!
//! Accepts contact-form submissions over HTTP and forwards each accepted
//! submission to a Slack channel via `chat.postMessage`, shielding the bot
//! credential from the public client.
//!
//! - Allow-listed CORS (local dev origin plus the hosting domain)
//! - Per-IP submission quota (5 per 5 minutes default)
//! - Required-field validation
//! - Single outbound attempt per submission, explicit timeout
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (see `config`);
//! `SLACK_BOT_TOKEN` and `SLACK_CHANNEL_ID` are required and validated at
//! startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{
    config::Config,
    handlers::{router, AppState},
    limiter::SubmissionLimiter,
    slack::SlackClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration, failing fast on missing Slack credentials
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        channel = %config.slack.channel_id,
        max_submissions = config.rate_limit.max_submissions,
        window_secs = config.rate_limit.window_secs,
        "Starting contact relay"
    );

    // Create application state
    let limiter = SubmissionLimiter::new(config.rate_limit.clone());
    let slack = SlackClient::new(config.slack.api_base.clone(), config.slack.bot_token.clone())?;

    let state = Arc::new(AppState {
        limiter,
        slack,
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    // Build router
    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
