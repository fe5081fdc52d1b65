// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Configuration is loaded once at startup from environment variables
//! (optionally via a `.env` file). The two Slack values have no defaults
//! and are validated eagerly: a missing bot token or channel is a startup
//! failure, not a request-time one.
//!
//! - `PORT`: listening port, Railway convention (default: 3001)
//! - `BIND_ADDR`: full bind address, overridden by `PORT` (default: 0.0.0.0:3001)
//! - `SLACK_BOT_TOKEN`: bearer credential for `chat.postMessage` (required)
//! - `SLACK_CHANNEL_ID`: destination channel (required)
//! - `SLACK_API_BASE`: Slack API base URL (default: https://slack.com/api)
//! - `SOURCE_TAG`: source label on the message context line (default: Contact CTA)
//! - `MAX_SUBMISSIONS`: submissions allowed per window per client (default: 5)
//! - `WINDOW_SECS`: rate-limit window length in seconds (default: 300)
//! - `ALLOWED_ORIGINS`: comma-separated CORS allow-list; entries may carry
//!   a `*` host wildcard

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },
}

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:3001)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Slack delivery configuration
    pub slack: SlackConfig,

    /// CORS origin allow-list; entries may carry a `*` host wildcard
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// Rate limiting configuration for the submission endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per window per client (default: 5)
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,

    /// Window length in seconds (default: 300)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Slack delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Slack API base URL (default: https://slack.com/api)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bot token used as the bearer credential (required)
    pub bot_token: String,

    /// Destination channel identifier (required)
    pub channel_id: String,

    /// Source label rendered on the message context line
    #[serde(default = "default_source_tag")]
    pub source_tag: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_max_submissions() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    300 // 5 minutes
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_source_tag() -> String {
    "Contact CTA".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "https://*.up.railway.app".to_string(),
    ]
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_secs: default_window_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = required(&get, "SLACK_BOT_TOKEN")?;
        let channel_id = required(&get, "SLACK_CHANNEL_ID")?;

        let bind_addr = match get("PORT") {
            Some(raw) => {
                let port: u16 = raw.parse().map_err(|_| ConfigError::InvalidVar {
                    var: "PORT",
                    value: raw.clone(),
                })?;
                format!("0.0.0.0:{port}")
            }
            None => get("BIND_ADDR").unwrap_or_else(default_bind_addr),
        };

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => default_allowed_origins(),
        };

        Ok(Self {
            bind_addr,
            rate_limit: RateLimitConfig {
                max_submissions: get("MAX_SUBMISSIONS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_max_submissions),
                window_secs: get("WINDOW_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_window_secs),
            },
            slack: SlackConfig {
                api_base: get("SLACK_API_BASE").unwrap_or_else(default_api_base),
                bot_token,
                channel_id,
                source_tag: get("SOURCE_TAG").unwrap_or_else(default_source_tag),
            },
            allowed_origins,
        })
    }
}

fn required<F>(get: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("SLACK_CHANNEL_ID", "C012345"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.rate_limit.max_submissions, 5);
        assert_eq!(config.rate_limit.window_secs, 300);
        assert_eq!(config.slack.api_base, "https://slack.com/api");
        assert_eq!(config.slack.source_tag, "Contact CTA");
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_missing_token_fails_fast() {
        let result = Config::from_lookup(lookup(&[("SLACK_CHANNEL_ID", "C012345")]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingVar("SLACK_BOT_TOKEN"))
        ));
    }

    #[test]
    fn test_blank_channel_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("SLACK_CHANNEL_ID", "   "),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingVar("SLACK_CHANNEL_ID"))
        ));
    }

    #[test]
    fn test_port_overrides_bind_addr() {
        let config = Config::from_lookup(lookup(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("SLACK_CHANNEL_ID", "C012345"),
            ("PORT", "8080"),
            ("BIND_ADDR", "127.0.0.1:9999"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_unparseable_port_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("SLACK_CHANNEL_ID", "C012345"),
            ("PORT", "not-a-port"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar { var: "PORT", .. })
        ));
    }

    #[test]
    fn test_allowed_origins_split_and_trimmed() {
        let config = Config::from_lookup(lookup(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("SLACK_CHANNEL_ID", "C012345"),
            (
                "ALLOWED_ORIGINS",
                "http://localhost:5173, https://*.example.app,",
            ),
        ]))
        .unwrap();

        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:5173", "https://*.example.app"]
        );
    }

    #[test]
    fn test_window_duration() {
        let config = RateLimitConfig {
            window_secs: 300,
            ..Default::default()
        };
        assert_eq!(config.window_duration(), Duration::from_secs(300));
    }
}
