//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.hookrelay/config.json`) and environment.
//! The Slack bot token and API base may come from env so the file can stay secret-free.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::slack::SLACK_API_BASE;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound Slack settings.
    #[serde(default)]
    pub slack: SlackConfig,
}

/// Server bind, port, and webhook path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// HTTP port (default 3000).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,

    /// Path the webhook is served on (default "/api/webhook").
    #[serde(default = "default_webhook_path")]
    pub path: String,
}

fn default_server_port() -> u16 {
    3000
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_path() -> String {
    "/api/webhook".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
            path: default_webhook_path(),
        }
    }
}

/// Slack Web API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    /// Bot token (xoxb-...). Overridden by SLACK_BOT_TOKEN env when set.
    pub bot_token: Option<String>,
    /// Channel to post to when the message does not name one.
    pub channel: Option<String>,
    /// Web API base URL (default https://slack.com/api). Overridden by SLACK_API_BASE env.
    pub api_base: Option<String>,
    /// Request timeout in seconds. Unset: no explicit timeout.
    pub timeout_secs: Option<u64>,
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Resolve the Slack bot token: env SLACK_BOT_TOKEN overrides config.
pub fn resolve_slack_token(config: &Config) -> Option<String> {
    std::env::var("SLACK_BOT_TOKEN")
        .ok()
        .and_then(|s| non_empty(&s))
        .or_else(|| config.slack.bot_token.as_deref().and_then(non_empty))
}

/// Resolve the Slack API base URL: env SLACK_API_BASE, then config, then the public endpoint.
pub fn resolve_slack_api_base(config: &Config) -> String {
    std::env::var("SLACK_API_BASE")
        .ok()
        .and_then(|s| non_empty(&s))
        .or_else(|| config.slack.api_base.as_deref().and_then(non_empty))
        .unwrap_or_else(|| SLACK_API_BASE.to_string())
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("HOOKRELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".hookrelay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or HOOKRELAY_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
