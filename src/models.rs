use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub reflection_date: NaiveDate,
    pub summary: Option<String>,
    pub accomplishments: Option<String>,
    pub improvements_to_make: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub content: String,
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub reflection_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub description: String,
    pub status: GoalStatus,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Stored with a task but never expanded into occurrences on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekdays,
    Weekly,
    #[serde(other)]
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub task_date: NaiveDate,
    #[serde(with = "wire_time")]
    pub start_time: NaiveTime,
    #[serde(with = "wire_time")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: Option<RecurrencePattern>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub total_reflections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Goal,
    Improvement,
    Motivation,
    #[serde(other)]
    Reflection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub color: Option<String>,
}

// Request payloads

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReflection {
    pub reflection_date: NaiveDate,
    pub summary: String,
    pub accomplishments: String,
    pub improvements_to_make: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJournalEntry {
    pub content: String,
    pub entry_date: NaiveDate,
    pub reflection_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalEntryUpdate {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGoal {
    pub description: String,
    pub deadline: Option<NaiveDate>,
}

/// Partial goal update. `deadline: Some(None)` clears the deadline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
}

/// Full task body used both for creation and for edits from the task form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    #[serde(skip)]
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub task_date: NaiveDate,
    #[serde(with = "wire_time")]
    pub start_time: NaiveTime,
    #[serde(with = "wire_time")]
    pub end_time: NaiveTime,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl Reflection {
    /// The three answers in question order, with blank answers reported as missing.
    pub fn answers(&self) -> [Option<&str>; 3] {
        [
            non_blank(self.summary.as_deref()),
            non_blank(self.accomplishments.as_deref()),
            non_blank(self.improvements_to_make.as_deref()),
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.answers().iter().all(|a| a.is_some())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Goal {
    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
        }
    }
}

impl RecurrencePattern {
    pub fn label(&self) -> &'static str {
        match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekdays => "weekdays",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Some(RecurrencePattern::Daily),
            "weekdays" => Some(RecurrencePattern::Weekdays),
            "weekly" => Some(RecurrencePattern::Weekly),
            _ => None,
        }
    }
}

impl ScheduledTask {
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            id: Some(self.id),
            title: self.title.clone(),
            description: self.description.clone(),
            task_date: self.task_date,
            start_time: self.start_time,
            end_time: self.end_time,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
        }
    }
}

/// Times travel as `HH:MM`; the server may answer with `HH:MM:SS`.
pub mod wire_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::utils::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflection(summary: &str, accomplishments: &str, improvements: &str) -> Reflection {
        Reflection {
            id: 1,
            user_id: 1,
            reflection_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            summary: Some(summary.to_string()),
            accomplishments: Some(accomplishments.to_string()),
            improvements_to_make: Some(improvements.to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn complete_only_when_all_answers_present() {
        assert!(reflection("a", "b", "c").is_complete());
        assert!(!reflection("a", "", "c").is_complete());
        assert!(!reflection("a", "b", "   ").is_complete());

        let mut partial = reflection("a", "b", "c");
        partial.accomplishments = None;
        assert!(!partial.is_complete());
    }

    #[test]
    fn task_times_accept_seconds_and_serialize_short() {
        let json = r#"{
            "id": 7, "user_id": 1, "title": "Run", "description": null,
            "task_date": "2026-03-04", "start_time": "06:30:00", "end_time": "07:15",
            "is_recurring": true, "recurrence_pattern": "weekdays",
            "is_completed": false, "completed_at": null
        }"#;
        let task: ScheduledTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.start_time, NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        assert_eq!(task.recurrence_pattern, Some(RecurrencePattern::Weekdays));

        let body = serde_json::to_value(task.to_draft()).unwrap();
        assert_eq!(body["start_time"], "06:30");
        assert_eq!(body["end_time"], "07:15");
        assert!(body.get("id").is_none());
    }

    #[test]
    fn unknown_recurrence_is_custom() {
        let pattern: RecurrencePattern = serde_json::from_str(r#""{\"every\":3}""#).unwrap();
        assert_eq!(pattern, RecurrencePattern::Custom);
    }

    #[test]
    fn goal_update_only_sends_set_fields() {
        let update = GoalUpdate {
            status: Some(GoalStatus::Completed),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"status":"completed"}"#);

        let clear = GoalUpdate {
            deadline: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&clear).unwrap(), r#"{"deadline":null}"#);
    }

    #[test]
    fn reflection_parses_server_timestamps() {
        let json = r#"{
            "id": 3, "user_id": 1, "reflection_date": "2026-03-04",
            "summary": "Good day", "accomplishments": null, "improvements_to_make": "Sleep",
            "created_at": "2026-03-04T21:10:05.123456+00:00",
            "updated_at": "2026-03-04T21:10:05+00:00"
        }"#;
        let parsed: Reflection = serde_json::from_str(json).unwrap();
        assert!(parsed.created_at.is_some());
        assert_eq!(parsed.answers()[1], None);
    }
}
