//! hookrelay core library: cafe24 webhook classification, Slack message formatting and dispatch,
//! and the HTTP server that ties them together. Used by the `hookrelay` CLI.

pub mod cafe24;
pub mod config;
pub mod gateway;
pub mod init;
pub mod slack;
