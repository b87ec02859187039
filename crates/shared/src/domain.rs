use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Full enrollment roster keyed by activity name.
///
/// Key order is the server-provided order and is also the display order, so
/// the map type must preserve insertion order across deserialization.
pub type Roster = IndexMap<String, ActivityRecord>;

/// One activity's metadata and participant list, as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>,
}

impl ActivityRecord {
    /// Remaining capacity, derived fresh from this snapshot. Negative when
    /// the server reports more participants than the activity allows.
    pub fn spots_left(&self) -> i64 {
        i64::from(self.max_participants) - self.participants.len() as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Success,
    Error,
}

/// Transient banner describing the outcome of the last mutation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(max: u32, participants: &[&str]) -> ActivityRecord {
        ActivityRecord {
            description: "desc".to_string(),
            schedule: "Fridays, 3:30 PM".to_string(),
            max_participants: max,
            participants: participants.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn spots_left_is_capacity_minus_enrollment() {
        assert_eq!(record(10, &["a@x.com"]).spots_left(), 9);
        assert_eq!(record(2, &[]).spots_left(), 2);
        assert_eq!(record(0, &[]).spots_left(), 0);
    }

    #[test]
    fn spots_left_goes_negative_when_server_overbooks() {
        assert_eq!(record(1, &["a@x.com", "b@x.com"]).spots_left(), -1);
    }

    #[test]
    fn roster_deserialization_preserves_server_order() {
        let roster: Roster = serde_json::from_str(
            r#"{
                "Drama Club": {"description": "", "schedule": "", "max_participants": 15, "participants": []},
                "Chess Club": {"description": "", "schedule": "", "max_participants": 10, "participants": ["a@x.com"]},
                "Art Studio": {"description": "", "schedule": "", "max_participants": 8, "participants": []}
            }"#,
        )
        .expect("roster");

        let names: Vec<&str> = roster.keys().map(String::as_str).collect();
        assert_eq!(names, ["Drama Club", "Chess Club", "Art Studio"]);
        assert_eq!(roster["Chess Club"].spots_left(), 9);
    }
}
