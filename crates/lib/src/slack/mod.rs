//! Slack side of the relay: message payload, formatter, and the chat.postMessage client.

mod client;
mod message;

pub use client::{Dispatch, DispatchError, DispatchResult, SlackAck, SlackClient, SLACK_API_BASE};
pub use message::{
    format_deleted_date, format_message, format_message_at, Attachment, AttachmentField,
    OutboundMessage,
};
