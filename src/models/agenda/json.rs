//! Lenient decoding of the JSON sub-fields on an agenda row.
//!
//! Historical writers left these columns in three shapes: a genuine JSON
//! array/object, a JSON string containing one, or a doubly-encoded string (a
//! JSON string whose content is itself a JSON string). Decoding happens here,
//! once, at the persistence boundary; any shape that still fails after one
//! level of string unwrap counts as "no data" and never as an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::MonevStatus;

/// One decision or directive follow-up item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub pic: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub evidence_path: String,
}

/// Parse a raw column value, unwrapping at most one level of string
/// re-encoding. Returns None for anything undecodable.
fn lenient_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    let unwrapped = match value {
        Value::String(inner) => serde_json::from_str(&inner).ok()?,
        other => return Some(other),
    };
    // A doubly-encoded column unwraps string-to-string exactly once more;
    // anything nested deeper counts as no data.
    match unwrapped {
        Value::String(inner) => serde_json::from_str(&inner).ok(),
        other => Some(other),
    }
}

fn lenient_array(raw: &str) -> Vec<Value> {
    match lenient_value(raw) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Decode a decisions/directives column. Non-object entries are dropped;
/// a bare string entry is kept as a description-only item.
pub fn decode_follow_ups(raw: &str) -> Vec<FollowUpItem> {
    lenient_array(raw)
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(_) => serde_json::from_value(v).ok(),
            Value::String(s) => Some(FollowUpItem {
                description: s,
                ..FollowUpItem::default()
            }),
            _ => None,
        })
        .collect()
}

pub fn encode_follow_ups(items: &[FollowUpItem]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode an attendance column: director name → recorded status. Values may
/// be plain strings or `{"status": "..."}` objects.
pub fn decode_attendance(raw: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if let Some(Value::Object(obj)) = lenient_value(raw) {
        for (name, v) in obj {
            let status = match v {
                Value::String(s) => s,
                Value::Object(inner) => match inner.get("status") {
                    Some(Value::String(s)) => s.clone(),
                    _ => continue,
                },
                _ => continue,
            };
            map.insert(name, status);
        }
    }
    map
}

/// Decode a plain string-array column (guests, supporting document paths).
pub fn decode_string_array(raw: &str) -> Vec<String> {
    lenient_array(raw)
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// "Done" status strings accepted across historical code paths.
pub fn is_done_status(s: &str) -> bool {
    matches!(
        s.trim().to_uppercase().as_str(),
        "DONE" | "SELESAI" | "COMPLETED"
    )
}

pub fn is_in_progress_status(s: &str) -> bool {
    matches!(
        s.trim().to_uppercase().as_str(),
        "ON_PROGRESS" | "IN_PROGRESS" | "PROGRESS"
    )
}

/// Global monev status of a row: DONE only when there is at least one
/// decision item and every one of them is individually done.
pub fn overall_monev_status(items: &[FollowUpItem]) -> MonevStatus {
    if !items.is_empty() && items.iter().all(|i| is_done_status(&i.status)) {
        MonevStatus::Done
    } else {
        MonevStatus::OnProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_array() {
        let raw = r#"[{"description":"Tindak lanjut A","status":"DONE"}]"#;
        let items = decode_follow_ups(raw);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Tindak lanjut A");
    }

    #[test]
    fn decodes_single_and_double_encoded_equally() {
        let plain = r#"[{"description":"x","status":"ON_PROGRESS"}]"#;
        let single = serde_json::to_string(plain).unwrap();
        let double = serde_json::to_string(&single).unwrap();
        assert_eq!(decode_follow_ups(plain), decode_follow_ups(&single));
        assert_eq!(decode_follow_ups(&single), decode_follow_ups(&double));
        assert_eq!(decode_follow_ups(&double).len(), 1);
    }

    #[test]
    fn decoding_is_idempotent_on_correct_input() {
        let items = vec![FollowUpItem {
            description: "a".to_string(),
            status: "DONE".to_string(),
            ..FollowUpItem::default()
        }];
        let raw = encode_follow_ups(&items);
        assert_eq!(decode_follow_ups(&raw), items);
    }

    #[test]
    fn malformed_input_decodes_to_empty() {
        assert!(decode_follow_ups("not json").is_empty());
        assert!(decode_follow_ups("").is_empty());
        assert!(decode_follow_ups("{\"k\":1}").is_empty());
        assert!(decode_attendance("not json").is_empty());
        assert!(decode_string_array("42").is_empty());
    }

    #[test]
    fn bare_string_entries_become_description_only_items() {
        let items = decode_follow_ups(r#"["Keputusan pertama"]"#);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Keputusan pertama");
        assert_eq!(items[0].status, "");
    }

    #[test]
    fn attendance_accepts_string_and_object_values() {
        let raw = r#"{"Direktur Utama":"Hadir","Direktur Keuangan":{"status":"Kuasa"},"X":3}"#;
        let map = decode_attendance(raw);
        assert_eq!(map.get("Direktur Utama").unwrap(), "Hadir");
        assert_eq!(map.get("Direktur Keuangan").unwrap(), "Kuasa");
        assert!(!map.contains_key("X"));
    }

    #[test]
    fn done_status_aliases() {
        for s in ["DONE", "selesai", " Completed "] {
            assert!(is_done_status(s), "{s}");
        }
        for s in ["ON_PROGRESS", "in_progress", "progress"] {
            assert!(is_in_progress_status(s), "{s}");
        }
        assert!(!is_done_status("ON_PROGRESS"));
    }

    #[test]
    fn overall_status_requires_every_item_done() {
        let done = FollowUpItem {
            status: "DONE".to_string(),
            ..FollowUpItem::default()
        };
        let pending = FollowUpItem {
            status: "ON_PROGRESS".to_string(),
            ..FollowUpItem::default()
        };
        assert_eq!(
            overall_monev_status(&[done.clone(), pending]),
            MonevStatus::OnProgress
        );
        assert_eq!(
            overall_monev_status(&[done.clone(), done]),
            MonevStatus::Done
        );
        assert_eq!(overall_monev_status(&[]), MonevStatus::OnProgress);
    }
}
