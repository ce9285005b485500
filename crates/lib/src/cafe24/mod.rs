//! cafe24 webhook events: event-code classification and inbound payload parsing.

mod classify;
mod payload;

pub use classify::{classify_event, EventClassification, EventColor};
pub use payload::{parse_body, InboundPayload, Resource};
