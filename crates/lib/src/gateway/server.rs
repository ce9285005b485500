//! Webhook HTTP server: method check, format, dispatch, status mapping.

use crate::cafe24::{parse_body, InboundPayload};
use crate::config::{self, Config};
use crate::slack::{format_message, Dispatch, SlackClient};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Reply text for a successfully relayed webhook.
pub const CONFIRMATION_MESSAGE: &str = "슬랙으로 메시지 전송완료";

const HEALTH_PATH: &str = "/health";

/// Shared state for the webhook server. Nothing in it changes between requests.
#[derive(Clone)]
pub struct RelayState {
    pub dispatcher: Arc<dyn Dispatch>,
    /// Reported by the health probe.
    pub port: u16,
}

impl RelayState {
    pub fn new(dispatcher: Arc<dyn Dispatch>, port: u16) -> Self {
        Self { dispatcher, port }
    }
}

/// Build the router: the webhook at `webhook_path` (any method; non-POST is rejected in the handler)
/// and GET /health.
pub fn router(state: RelayState, webhook_path: &str) -> Router {
    let path = normalize_path(webhook_path);
    let mut app = Router::new().route(&path, any(webhook));
    if path != HEALTH_PATH {
        app = app.route(HEALTH_PATH, get(health_http));
    }
    app.with_state(state)
}

fn normalize_path(path: &str) -> String {
    let p = path.trim();
    if p.starts_with('/') {
        p.to_string()
    } else {
        format!("/{}", p)
    }
}

/// Run the webhook server; binds to config.server.bind:config.server.port.
/// A missing Slack token does not stop startup; every webhook then fails with 500.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_server(config: Config) -> Result<()> {
    let bind = config.server.bind.trim();
    if !config::is_loopback_bind(bind) {
        log::warn!(
            "binding webhook server to {}: inbound webhooks are not authenticated",
            bind
        );
    }

    let slack = SlackClient::from_config(&config)?;
    if !slack.has_token() {
        log::warn!("SLACK_BOT_TOKEN is not set; webhooks will be rejected until it is configured");
    }
    let state = RelayState::new(Arc::new(slack), config.server.port);
    let app = router(state, &config.server.path);

    let bind_addr = format!("{}:{}", bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!(
        "webhook server listening on {} (path {})",
        bind_addr,
        normalize_path(&config.server.path)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server exited")?;
    log::info!("webhook server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// ANY <webhook path> — POST is formatted and relayed to Slack; anything else is 405.
async fn webhook(
    State(state): State<RelayState>,
    method: Method,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({ "error": "Method not allowed" })),
        );
    }

    let raw = parse_body(&body);
    log::info!("received webhook payload: {}", raw);

    let payload = InboundPayload::parse(raw);
    if !payload.is_platform_event() {
        log::warn!("webhook payload is not a cafe24 event; forwarding raw dump");
    }
    let message = format_message(&payload);
    if let Some(attachment) = message.attachments.first() {
        log::debug!("formatted \"{}\" (color {})", message.text, attachment.color);
    }
    match state.dispatcher.dispatch(&message).await {
        Ok(ack) => {
            log::debug!(
                "slack accepted message (channel {:?}, ts {:?})",
                ack.channel,
                ack.ts
            );
            (
                StatusCode::OK,
                Json(json!({ "success": true, "message": CONFIRMATION_MESSAGE })),
            )
        }
        Err(e) => {
            log::error!("relaying webhook to slack failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": e.to_string() })),
            )
        }
    }
}

/// GET /health returns a simple health JSON (for probes).
async fn health_http(State(state): State<RelayState>) -> Json<Value> {
    Json(json!({
        "runtime": "running",
        "port": state.port,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_path_gets_leading_slash() {
        assert_eq!(normalize_path("api/webhook"), "/api/webhook");
        assert_eq!(normalize_path(" /hook "), "/hook");
    }
}
