use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_not_blank, validate_task_status};

/// Task status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!(
                "status must be pending, in_progress, or completed, got {}",
                s
            )),
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A to-do item owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Task {
    pub id: Uuid,
    #[schema(example = "Write the quarterly report")]
    pub title: String,
    #[schema(example = "Numbers from finance are in the shared drive")]
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    /// Owner of the task
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing a task
///
/// Status is kept as text so an unknown value surfaces as a validation error
/// rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TaskInput {
    #[serde(default)]
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Write the quarterly report")]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub description: String,
    #[validate(custom = "validate_task_status")]
    #[schema(example = "pending", pattern = "pending|in_progress|completed")]
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Validated task fields ready for persistence
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskInput {
    /// Validate and normalize into a draft; a missing or empty status becomes `pending`
    pub fn into_draft(self) -> Result<TaskDraft, validator::ValidationErrors> {
        self.validate()?;

        let status = match self.status.as_deref() {
            None | Some("") => TaskStatus::default(),
            // validate() already rejected unknown values
            Some(raw) => TaskStatus::from_str(raw).unwrap_or_default(),
        };

        Ok(TaskDraft {
            title: self.title.trim().to_string(),
            description: self.description,
            status,
            due_date: self.due_date,
        })
    }
}

/// HTML form variant of [`TaskInput`]; the due date arrives as `YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub due_date: String,
}

impl TaskForm {
    /// Convert to a [`TaskInput`]; an unparsable due date is dropped
    pub fn into_input(self) -> TaskInput {
        let due_date = NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());

        TaskInput {
            title: self.title,
            description: self.description,
            status: Some(self.status).filter(|status| !status.is_empty()),
            due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, status: Option<&str>) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: String::new(),
            status: status.map(str::to_string),
            due_date: None,
        }
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let draft = input("Buy milk", None).into_draft().unwrap();
        assert_eq!(draft.status, TaskStatus::Pending);

        let draft = input("Buy milk", Some("")).into_draft().unwrap();
        assert_eq!(draft.status, TaskStatus::Pending);
    }

    #[test]
    fn test_known_statuses_are_accepted() {
        for status in TaskStatus::ALL {
            let draft = input("Buy milk", Some(status.as_str())).into_draft().unwrap();
            assert_eq!(draft.status, status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let errors = input("Buy milk", Some("bogus")).into_draft().unwrap_err();
        assert!(errors.field_errors().contains_key("status"));
    }

    #[test]
    fn test_blank_title_is_rejected() {
        for title in ["", "   "] {
            let errors = input(title, None).into_draft().unwrap_err();
            assert!(errors.field_errors().contains_key("title"));
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_form_parses_date_only_due_date() {
        let form = TaskForm {
            title: "Dentist".to_string(),
            description: String::new(),
            status: "in_progress".to_string(),
            due_date: "2025-03-14".to_string(),
        };

        let input = form.into_input();
        assert_eq!(input.status.as_deref(), Some("in_progress"));
        assert_eq!(
            input.due_date.map(|d| d.to_rfc3339()),
            Some("2025-03-14T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_form_drops_unparsable_due_date() {
        let form = TaskForm {
            title: "Dentist".to_string(),
            due_date: "next tuesday".to_string(),
            ..TaskForm::default()
        };

        let input = form.into_input();
        assert!(input.due_date.is_none());
        assert!(input.status.is_none());
    }
}
