use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::outline::Forest;

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// The character shown inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            TaskStatus::Todo => ' ',
            TaskStatus::InProgress => '>',
            TaskStatus::Completed => 'x',
        }
    }
}

/// How far a recurring task's due date moves on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Some(RecurrenceKind::Daily),
            "weekly" | "week" => Some(RecurrenceKind::Weekly),
            "monthly" | "month" => Some(RecurrenceKind::Monthly),
            "yearly" | "year" => Some(RecurrenceKind::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    /// Every `interval` units; 2 with `Daily` means every other day
    pub interval: u32,
}

/// A task record as stored. Field names follow the persisted camelCase form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    /// 0 = none, 1 = important
    #[serde(default)]
    pub star_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// The task's checklist outline
    #[serde(default, skip_serializing_if = "Forest::is_empty")]
    pub subtasks: Forest,
    /// Manual ordering rank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Task {
    pub fn new(id: String, title: String, created_at: i64) -> Self {
        Task {
            id,
            title,
            description: None,
            status: TaskStatus::Todo,
            star_level: 0,
            due_date: None,
            estimated_minutes: None,
            tags: Vec::new(),
            created_at,
            recurrence: None,
            subtasks: Forest::new(),
            order: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// A partial update: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub star_level: Option<u8>,
    pub due_date: Option<Option<NaiveDate>>,
    pub estimated_minutes: Option<Option<u32>>,
    pub tags: Option<Vec<String>>,
    pub recurrence: Option<Option<Recurrence>>,
    pub subtasks: Option<Forest>,
    pub order: Option<Option<i64>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        TaskPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn subtasks(subtasks: Forest) -> Self {
        TaskPatch {
            subtasks: Some(subtasks),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        TaskPatch {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(star_level) = self.star_level {
            task.star_level = star_level;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(estimated_minutes) = self.estimated_minutes {
            task.estimated_minutes = estimated_minutes;
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        if let Some(recurrence) = self.recurrence {
            task.recurrence = recurrence;
        }
        if let Some(subtasks) = &self.subtasks {
            task.subtasks = subtasks.clone();
        }
        if let Some(order) = self.order {
            task.order = order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::OutlineNode;

    #[test]
    fn deserializes_stored_record() {
        let json = r#"{
            "id": "t1",
            "title": "Plan trip",
            "status": "IN_PROGRESS",
            "starLevel": 1,
            "dueDate": "2025-03-01",
            "createdAt": 1700000000000,
            "recurrence": {"type": "WEEKLY", "interval": 2},
            "subtasks": [{"id": "s1", "title": "Book", "completed": false,
                          "subtasks": [{"id": "s2", "title": "Flights", "completed": true}]}]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(
            task.recurrence,
            Some(Recurrence {
                kind: RecurrenceKind::Weekly,
                interval: 2
            })
        );
        assert_eq!(task.subtasks[0].children[0].id, "s2");
        assert!(task.tags.is_empty());
    }

    #[test]
    fn minimal_task_omits_optional_fields() {
        let task = Task::new("t".into(), "T".into(), 5);
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"id":"t","title":"T","status":"TODO","starLevel":0,"createdAt":5}"#
        );
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut task = Task::new("t".into(), "T".into(), 5);
        task.tags = vec!["home".into()];
        let patch = TaskPatch {
            title: Some("Renamed".into()),
            subtasks: Some(Forest::from(vec![OutlineNode::leaf("s", "S")])),
            ..Default::default()
        };
        patch.apply(&mut task);
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.tags, vec!["home".to_string()]);
        assert!(!patch.is_empty());
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn recurrence_kind_parse() {
        assert_eq!(RecurrenceKind::parse("Weekly"), Some(RecurrenceKind::Weekly));
        assert_eq!(RecurrenceKind::parse("fortnightly"), None);
    }
}
