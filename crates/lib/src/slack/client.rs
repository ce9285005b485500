//! Slack Web API client: one chat.postMessage call per dispatch.

use crate::config::{self, Config};
use crate::slack::message::OutboundMessage;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;

pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Acknowledgment body returned by the Slack Web API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlackAck {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("SLACK_BOT_TOKEN이 설정되지 않음")]
    MissingToken,
    #[error("슬랙 API 에러: {0}")]
    Api(String),
    #[error("slack request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("slack returned unexpected response: {status} {body}")]
    UnexpectedResponse { status: u16, body: String },
    #[error("encoding slack message failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type DispatchResult = Result<SlackAck, DispatchError>;

/// Sends a formatted message somewhere. The server holds one of these; tests swap in doubles.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, message: &OutboundMessage) -> DispatchResult;
}

/// Client for Slack chat.postMessage. The bot token is fixed at construction.
#[derive(Clone)]
pub struct SlackClient {
    token: Option<String>,
    channel: Option<String>,
    api_base: String,
    client: reqwest::Client,
}

impl SlackClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            channel: None,
            api_base: SLACK_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from config: token and API base honor their env overrides; optional request timeout.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.slack.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("building slack http client")?;
        Ok(Self {
            client,
            ..Self::new(config::resolve_slack_token(config))
        }
        .with_api_base(config::resolve_slack_api_base(config))
        .with_channel(config.slack.channel.clone()))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Default channel stamped onto messages that do not name one.
    pub fn with_channel(mut self, channel: Option<String>) -> Self {
        self.channel = channel.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// POST chat.postMessage. `ok: false` is an error even on HTTP 200.
    pub async fn post_message(&self, message: &OutboundMessage) -> DispatchResult {
        let token = self.token.as_deref().ok_or(DispatchError::MissingToken)?;
        let message = match (&message.channel, &self.channel) {
            (None, Some(channel)) => {
                let mut m = message.clone();
                m.channel = Some(channel.clone());
                Cow::Owned(m)
            }
            _ => Cow::Borrowed(message),
        };
        let body = serde_json::to_vec(message.as_ref())?;
        let url = format!("{}/chat.postMessage", self.api_base);
        log::debug!("posting slack message to {}", url);
        let res = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        let ack: SlackAck = match serde_json::from_str(&text) {
            Ok(ack) => ack,
            Err(_) => {
                return Err(DispatchError::UnexpectedResponse {
                    status: status.as_u16(),
                    body: text,
                })
            }
        };
        if !ack.ok {
            return Err(DispatchError::Api(
                ack.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        if !status.is_success() {
            return Err(DispatchError::UnexpectedResponse {
                status: status.as_u16(),
                body: text,
            });
        }
        if let Some(ref w) = ack.warning {
            log::warn!("slack chat.postMessage warning: {}", w);
        }
        Ok(ack)
    }
}

#[async_trait]
impl Dispatch for SlackClient {
    async fn dispatch(&self, message: &OutboundMessage) -> DispatchResult {
        self.post_message(message).await
    }
}
