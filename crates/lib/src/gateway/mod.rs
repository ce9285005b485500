//! Webhook gateway: HTTP server that accepts cafe24 webhooks and relays them to Slack.
//!
//! One route takes the webhook (POST only; other methods get 405), plus a health probe.

mod server;

pub use server::{router, run_server, RelayState, CONFIRMATION_MESSAGE};
