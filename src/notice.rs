//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `truncation_notice`.
//! Role: Shared contract for CLI diagnostics such as sample truncation.
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is additive-only; `details` carries kind-specific fields.
use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::stats::Truncation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

pub fn truncation_notice(cmd: &str, truncation: &Truncation) -> Notice {
    let mut details = Map::new();
    details.insert("sample".to_string(), json!(truncation.key));
    details.insert("other".to_string(), json!(truncation.other));
    details.insert("original_len".to_string(), json!(truncation.original_len));
    details.insert("used_len".to_string(), json!(truncation.used_len));
    Notice {
        kind: "truncate".to_string(),
        time: now_rfc3339(),
        cmd: cmd.to_string(),
        message: format!(
            "{} has more elements than {}; only using the first {} elements of {}",
            truncation.key, truncation.other, truncation.used_len, truncation.key
        ),
        details,
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::{Notice, notice_json, truncation_notice};
    use crate::stats::Truncation;
    use serde_json::{Map, Value};

    #[test]
    fn notice_json_has_required_fields() {
        let mut details = Map::new();
        details.insert("used_len".to_string(), Value::from(5));

        let notice = Notice {
            kind: "truncate".to_string(),
            time: "2026-02-01T00:00:00Z".to_string(),
            cmd: "significance".to_string(),
            message: "A has more elements than B".to_string(),
            details,
        };

        let value = notice_json(&notice);
        let obj = value
            .get("notice")
            .and_then(|v| v.as_object())
            .expect("notice object");

        assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("truncate"));
        assert_eq!(
            obj.get("time").and_then(|v| v.as_str()),
            Some("2026-02-01T00:00:00Z")
        );
        assert_eq!(obj.get("cmd").and_then(|v| v.as_str()), Some("significance"));
        assert!(obj.get("details").and_then(|v| v.as_object()).is_some());
    }

    #[test]
    fn truncation_notice_carries_lengths() {
        let notice = truncation_notice(
            "significance",
            &Truncation {
                key: "A".to_string(),
                other: "B".to_string(),
                original_len: 6,
                used_len: 5,
            },
        );
        assert_eq!(notice.kind, "truncate");
        assert_eq!(notice.details["sample"], Value::from("A"));
        assert_eq!(notice.details["original_len"], Value::from(6));
        assert_eq!(notice.details["used_len"], Value::from(5));
        assert!(notice.message.contains("first 5 elements of A"));
    }
}
