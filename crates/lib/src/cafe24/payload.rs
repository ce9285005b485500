//! Inbound webhook payload: decided once as a cafe24 platform event or an unrecognized document.

use serde_json::{Map, Value};

/// `resource` object of a cafe24 event. Fields are `None` when absent, null, or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub mall_id: Option<String>,
    pub client_id: Option<String>,
    pub app_name: Option<String>,
    pub deleted_date: Option<String>,
}

/// Parsed webhook body.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// Body with a non-zero `event_no` code and an object `resource`.
    PlatformEvent { event_no: i64, resource: Resource },
    /// Any other body, kept verbatim for the raw dump.
    Unrecognized(Value),
}

impl InboundPayload {
    /// Parse a raw request body; see [`parse_body`].
    pub fn from_body(body: &[u8]) -> Self {
        Self::parse(parse_body(body))
    }

    /// Classify a JSON body. Never fails; anything that is not a platform event is `Unrecognized`.
    pub fn parse(raw: Value) -> Self {
        let Some(obj) = raw.as_object() else {
            return InboundPayload::Unrecognized(raw);
        };
        let event_no = obj.get("event_no").and_then(event_code).filter(|n| *n != 0);
        let resource = obj.get("resource").and_then(Value::as_object);
        match (event_no, resource) {
            (Some(event_no), Some(resource)) => {
                let resource = Resource {
                    mall_id: text_field(resource, "mall_id"),
                    client_id: text_field(resource, "client_id"),
                    app_name: text_field(resource, "app_name"),
                    // Some senders put deleted_date next to resource rather than inside it.
                    deleted_date: text_field(resource, "deleted_date")
                        .or_else(|| text_field(obj, "deleted_date")),
                };
                InboundPayload::PlatformEvent { event_no, resource }
            }
            _ => InboundPayload::Unrecognized(raw),
        }
    }

    pub fn is_platform_event(&self) -> bool {
        matches!(self, InboundPayload::PlatformEvent { .. })
    }
}

/// Request body as JSON. Empty or whitespace-only → null; non-JSON → the body text as a JSON string.
pub fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Event code from an integer, an integral float (`90001.0`), or a numeric string (`"90077"`).
/// Values outside the i64 range are not codes.
fn event_code(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Display text for a field: strings as-is, other non-empty scalars via their JSON form.
/// Null, false, zero, and empty strings count as absent.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
