use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ID_RANDOM_WIDTH: u32 = 8;

/// Opaque task identifier: base-36 creation millis followed by random bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let random = Uuid::new_v4().as_u128() as u64 % 36u64.pow(ID_RANDOM_WIDTH);
        Self(format!(
            "{}{:0>width$}",
            to_base36(millis),
            to_base36(random),
            width = ID_RANDOM_WIDTH as usize
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub text: String,

    pub completed: bool,

    /// ISO-8601 string exactly as stored; never rewritten after creation.
    pub created_at: String,
}

impl Task {
    /// Builds a fresh incomplete task. `text` must already be trimmed and non-empty.
    pub fn new(text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::generate(now),
            text,
            completed: false,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Trims user input, rejecting text that is empty once trimmed.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Task, TaskId, normalize_text, to_base36};

    #[test]
    fn new_task_starts_incomplete_with_millisecond_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap();
        let task = Task::new("Buy milk".to_string(), now);

        assert!(!task.completed);
        assert_eq!(task.text, "Buy milk");
        assert_eq!(task.created_at, "2026-02-16T05:00:00.000Z");
        assert_eq!(task.created_at_utc(), Some(now));
    }

    #[test]
    fn generated_ids_share_time_prefix_but_differ() {
        let now = Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap();
        let a = TaskId::generate(now);
        let b = TaskId::generate(now);
        let prefix = to_base36(now.timestamp_millis() as u64);

        assert!(a.as_str().starts_with(&prefix));
        assert_eq!(a.as_str().len(), prefix.len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_with_camel_case_created_at() {
        let task = Task {
            id: TaskId::from("abc"),
            text: "Walk dog".to_string(),
            completed: true,
            created_at: "2026-02-16T05:00:00.000Z".to_string(),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "abc",
                "text": "Walk dog",
                "completed": true,
                "createdAt": "2026-02-16T05:00:00.000Z"
            })
        );
    }

    #[test]
    fn normalize_text_trims_and_rejects_blank() {
        assert_eq!(normalize_text("  hi  ").as_deref(), Some("hi"));
        assert_eq!(normalize_text(""), None);
        assert_eq!(normalize_text(" \t\n"), None);
    }

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
