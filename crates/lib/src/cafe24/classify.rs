//! Event classification: event code → (label, color).

use serde::{Deserialize, Serialize};

/// Attachment color for an event. Serializes to the Slack attachment color string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventColor {
    /// Deletion or cancellation.
    #[serde(rename = "danger")]
    Danger,
    /// Creation or registration.
    #[serde(rename = "good")]
    Good,
    /// Modification.
    #[serde(rename = "warning")]
    Warning,
    /// Any other event. A literal hex color, not one of Slack's named colors.
    #[serde(rename = "#36a64f")]
    Default,
}

impl EventColor {
    pub fn as_str(self) -> &'static str {
        match self {
            EventColor::Danger => "danger",
            EventColor::Good => "good",
            EventColor::Warning => "warning",
            EventColor::Default => "#36a64f",
        }
    }
}

impl std::fmt::Display for EventColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata for one event code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventClassification {
    pub label: String,
    pub color: EventColor,
}

struct KnownEvent {
    code: i64,
    label: &'static str,
    color: EventColor,
}

const KNOWN_EVENTS: &[KnownEvent] = &[
    KnownEvent { code: 90001, label: "주문 생성", color: EventColor::Good },
    KnownEvent { code: 90002, label: "주문 수정", color: EventColor::Warning },
    KnownEvent { code: 90003, label: "주문 취소", color: EventColor::Danger },
    KnownEvent { code: 90010, label: "상품 등록", color: EventColor::Good },
    KnownEvent { code: 90011, label: "상품 수정", color: EventColor::Warning },
    KnownEvent { code: 90020, label: "회원 가입", color: EventColor::Good },
    KnownEvent { code: 90021, label: "회원 정보 수정", color: EventColor::Warning },
    KnownEvent { code: 90077, label: "앱 삭제", color: EventColor::Danger },
];

/// Classify a cafe24 event code. Unknown codes get a generic `이벤트 (<code>)` label and the default color.
pub fn classify_event(code: i64) -> EventClassification {
    match KNOWN_EVENTS.iter().find(|e| e.code == code) {
        Some(e) => EventClassification {
            label: e.label.to_string(),
            color: e.color,
        },
        None => EventClassification {
            label: format!("이벤트 ({})", code),
            color: EventColor::Default,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_label_and_color() {
        let cases = [
            (90001, "주문 생성", EventColor::Good),
            (90002, "주문 수정", EventColor::Warning),
            (90003, "주문 취소", EventColor::Danger),
            (90010, "상품 등록", EventColor::Good),
            (90011, "상품 수정", EventColor::Warning),
            (90020, "회원 가입", EventColor::Good),
            (90021, "회원 정보 수정", EventColor::Warning),
            (90077, "앱 삭제", EventColor::Danger),
        ];
        for (code, label, color) in cases {
            let c = classify_event(code);
            assert_eq!(c.label, label, "label for {}", code);
            assert_eq!(c.color, color, "color for {}", code);
        }
    }

    #[test]
    fn unknown_codes_get_generic_label_and_default_color() {
        for code in [0, -1, 90000, 90004, 90078, i64::MAX] {
            let c = classify_event(code);
            assert_eq!(c.label, format!("이벤트 ({})", code));
            assert_eq!(c.color, EventColor::Default);
        }
    }

    #[test]
    fn default_color_is_distinct_literal() {
        assert_eq!(
            serde_json::to_string(&EventColor::Default).unwrap(),
            "\"#36a64f\""
        );
        assert_eq!(serde_json::to_string(&EventColor::Danger).unwrap(), "\"danger\"");
        assert_eq!(EventColor::Warning.to_string(), "warning");
    }
}
