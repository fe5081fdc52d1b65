// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Submission Relay
//!
//! This crate provides a small HTTP relay that accepts contact-form
//! submissions from browser clients and forwards each accepted submission
//! to a Slack channel via `chat.postMessage`, keeping the bot credential
//! out of the public client:
//!
//! - Per-IP submission quota (5 per 5 minutes default)
//! - Required-field validation (name, email, message)
//! - Single-attempt forwarding with an explicit request timeout
//! - Allow-listed CORS for browser clients

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod message;
pub mod slack;

pub use config::Config;
pub use error::RelayError;
pub use limiter::{RateLimitDecision, SubmissionLimiter};
pub use message::{OutboundMessage, SubmissionRequest};
pub use slack::{SlackClient, SlackError};
