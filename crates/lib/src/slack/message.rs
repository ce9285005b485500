//! Slack message payload (chat.postMessage with legacy attachments) and the webhook → message formatter.

use crate::cafe24::{classify_event, EventColor, InboundPayload, Resource};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const EVENT_TITLE: &str = "이벤트 수신";
const EVENT_FOOTER: &str = "cafe24 웹훅";
const UNKNOWN_TEXT: &str = "📋 알 수 없는 데이터 수신";
const MISSING_VALUE: &str = "N/A";
const DISPLAY_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Body of a chat.postMessage call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Target channel. Filled from config by the client when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub color: EventColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl AttachmentField {
    fn new(title: &str, value: Option<&str>, short: bool) -> Self {
        Self {
            title: title.to_string(),
            value: value.unwrap_or(MISSING_VALUE).to_string(),
            short,
        }
    }
}

/// Format a payload using the current time for the attachment timestamp.
pub fn format_message(payload: &InboundPayload) -> OutboundMessage {
    format_message_at(payload, Utc::now().timestamp())
}

/// Format a payload with an explicit attachment timestamp (seconds). Deterministic.
pub fn format_message_at(payload: &InboundPayload, ts: i64) -> OutboundMessage {
    match payload {
        InboundPayload::PlatformEvent { event_no, resource } => {
            format_platform_event(*event_no, resource, ts)
        }
        InboundPayload::Unrecognized(raw) => {
            // Serializing a Value cannot fail; fall back to the compact form just in case.
            let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
            OutboundMessage {
                channel: None,
                text: UNKNOWN_TEXT.to_string(),
                attachments: vec![Attachment {
                    color: EventColor::Warning,
                    title: None,
                    text: Some(format!("```{}```", pretty)),
                    fields: Vec::new(),
                    footer: None,
                    ts: None,
                }],
            }
        }
    }
}

fn format_platform_event(event_no: i64, resource: &Resource, ts: i64) -> OutboundMessage {
    let class = classify_event(event_no);
    let mut fields = vec![
        AttachmentField::new("쇼핑몰 ID", resource.mall_id.as_deref(), true),
        AttachmentField::new("클라이언트 ID", resource.client_id.as_deref(), true),
        AttachmentField::new("앱 이름", resource.app_name.as_deref(), true),
    ];
    if let Some(ref deleted) = resource.deleted_date {
        fields.push(AttachmentField {
            title: "삭제 일시".to_string(),
            value: format_deleted_date(deleted),
            short: false,
        });
    }
    OutboundMessage {
        channel: None,
        text: class.label,
        attachments: vec![Attachment {
            color: class.color,
            title: Some(EVENT_TITLE.to_string()),
            text: None,
            fields,
            footer: Some(EVENT_FOOTER.to_string()),
            ts: Some(ts),
        }],
    }
}

/// Render a deletion date as `YYYY-MM-DD HH:MM:SS`. RFC 3339 values keep their own offset;
/// date-only values render at midnight. Unparseable input is returned unchanged.
pub fn format_deleted_date(raw: &str) -> String {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.format(DISPLAY_DATETIME).to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.format(DISPLAY_DATETIME).to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return dt.format(DISPLAY_DATETIME).to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TS: i64 = 1_700_000_000;

    fn field<'a>(msg: &'a OutboundMessage, title: &str) -> Option<&'a AttachmentField> {
        msg.attachments[0].fields.iter().find(|f| f.title == title)
    }

    #[test]
    fn order_created_event() {
        let payload = InboundPayload::parse(json!({
            "event_no": 90001,
            "resource": { "mall_id": "m1", "client_id": "c1", "app_name": "App" }
        }));
        let msg = format_message_at(&payload, TS);
        assert_eq!(msg.text, "주문 생성");
        assert_eq!(msg.attachments.len(), 1);
        let a = &msg.attachments[0];
        assert_eq!(a.color, EventColor::Good);
        assert_eq!(a.title.as_deref(), Some("이벤트 수신"));
        assert_eq!(a.footer.as_deref(), Some("cafe24 웹훅"));
        assert_eq!(a.ts, Some(TS));
        assert_eq!(a.fields.len(), 3);
        assert_eq!(field(&msg, "쇼핑몰 ID").unwrap().value, "m1");
        assert_eq!(field(&msg, "클라이언트 ID").unwrap().value, "c1");
        assert_eq!(field(&msg, "앱 이름").unwrap().value, "App");
        assert!(a.fields.iter().all(|f| f.short));
        assert!(field(&msg, "삭제 일시").is_none());
    }

    #[test]
    fn app_uninstalled_event_with_missing_fields_and_deleted_date() {
        let payload = InboundPayload::parse(json!({
            "event_no": 90077,
            "resource": { "mall_id": "m2" },
            "deleted_date": "2024-01-01"
        }));
        let msg = format_message_at(&payload, TS);
        assert_eq!(msg.text, "앱 삭제");
        let a = &msg.attachments[0];
        assert_eq!(a.color, EventColor::Danger);
        assert_eq!(a.fields.len(), 4);
        assert_eq!(field(&msg, "쇼핑몰 ID").unwrap().value, "m2");
        assert_eq!(field(&msg, "클라이언트 ID").unwrap().value, "N/A");
        assert_eq!(field(&msg, "앱 이름").unwrap().value, "N/A");
        let deleted = field(&msg, "삭제 일시").unwrap();
        assert_eq!(deleted.value, "2024-01-01 00:00:00");
        assert!(!deleted.short);
    }

    #[test]
    fn unknown_event_code_uses_default_color() {
        let payload = InboundPayload::parse(json!({ "event_no": 12345, "resource": {} }));
        let msg = format_message_at(&payload, TS);
        assert_eq!(msg.text, "이벤트 (12345)");
        assert_eq!(msg.attachments[0].color, EventColor::Default);
        assert!(msg.attachments[0].fields.iter().all(|f| f.value == "N/A"));
    }

    #[test]
    fn unrecognized_payload_is_dumped_verbatim() {
        let raw = json!({ "foo": "bar", "nested": { "z": 1, "a": [true] } });
        let msg = format_message_at(&InboundPayload::parse(raw.clone()), TS);
        assert_eq!(msg.text, "📋 알 수 없는 데이터 수신");
        assert_eq!(msg.attachments.len(), 1);
        let a = &msg.attachments[0];
        assert_eq!(a.color, EventColor::Warning);
        let expected = format!("```{}```", serde_json::to_string_pretty(&raw).unwrap());
        assert_eq!(a.text.as_deref(), Some(expected.as_str()));
        assert!(expected.contains("\"foo\": \"bar\""));
        assert!(a.fields.is_empty());
        assert_eq!(a.ts, None);
    }

    #[test]
    fn same_payload_same_second_is_identical() {
        let payload = InboundPayload::parse(json!({
            "event_no": 90010,
            "resource": { "mall_id": "m1" }
        }));
        assert_eq!(format_message_at(&payload, TS), format_message_at(&payload, TS));
    }

    #[test]
    fn current_time_is_whole_seconds() {
        let before = Utc::now().timestamp();
        let payload = InboundPayload::parse(json!({ "event_no": 90001, "resource": {} }));
        let ts = format_message(&payload).attachments[0].ts.unwrap();
        assert!(ts >= before && ts <= Utc::now().timestamp());
    }

    #[test]
    fn serialized_shape_matches_slack_attachments() {
        let payload = InboundPayload::parse(json!({ "event_no": 90003, "resource": {} }));
        let v = serde_json::to_value(format_message_at(&payload, TS)).unwrap();
        assert_eq!(v["text"], "주문 취소");
        assert!(v.get("channel").is_none());
        let a = &v["attachments"][0];
        assert_eq!(a["color"], "danger");
        assert_eq!(a["ts"], TS);
        assert_eq!(a["fields"][0], json!({ "title": "쇼핑몰 ID", "value": "N/A", "short": true }));
        assert!(a.get("text").is_none());
    }

    #[test]
    fn deleted_date_formats() {
        assert_eq!(format_deleted_date("2024-03-05T10:20:30+09:00"), "2024-03-05 10:20:30");
        assert_eq!(format_deleted_date("2024-03-05T10:20:30"), "2024-03-05 10:20:30");
        assert_eq!(format_deleted_date("2024-03-05 10:20:30"), "2024-03-05 10:20:30");
        assert_eq!(format_deleted_date("2024-03-05"), "2024-03-05 00:00:00");
        assert_eq!(format_deleted_date("yesterday"), "yesterday");
    }
}
