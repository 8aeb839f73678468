use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde_json::Value;

use super::types::Task;

/// Buttons offered on a task row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskActions {
    pub check_status: bool,
    pub get_result: bool,
    pub delete: bool,
}

impl TaskActions {
    pub fn for_task(task: &Task) -> Self {
        Self {
            check_status: true,
            get_result: true,
            delete: task.can_delete(),
        }
    }
}

/// Everything the detail overlay prints for one task.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskDetail {
    pub id: String,
    pub task_type: String,
    pub status: String,
    pub created: String,
    pub completed: Option<String>,
    pub deleted: Option<String>,
    pub parameters: String,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl From<&Task> for TaskDetail {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            task_type: task.task_type.clone(),
            status: task.status.to_string(),
            created: format_timestamp(&task.created_at),
            completed: task.completed_at.as_deref().map(format_timestamp),
            deleted: task.deleted_at.as_deref().map(format_timestamp),
            parameters: pretty_json(&Value::Object(task.parameters.clone())),
            result: task.result.as_ref().map(pretty_json),
            error: task.error.clone(),
        }
    }
}

pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Renders a service timestamp in local time. The service emits either
/// RFC 3339 or naive UTC ISO-8601; anything else is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
