use thiserror::Error;

use crate::task::TaskStatus;

/// The user action a request belongs to. Decides the message shown when it fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    Status,
    Result,
    Delete,
    List,
    Health,
}

impl Action {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::Create => "Failed to create task",
            Action::Status => "Failed to get task status",
            Action::Result => "Failed to get task result",
            Action::Delete => "Failed to delete task",
            Action::List => "Failed to fetch tasks",
            Action::Health => "Failed to reach task service",
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http {status}: {body}")]
    Status {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid base url: {0}")]
    BaseUrl(String),
}

impl ClientError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Deletion surfaces the service's `detail`; every other action uses its fixed message.
    pub fn user_message(&self, action: Action) -> String {
        match (action, self.detail()) {
            (Action::Delete, Some(detail)) => detail.to_string(),
            _ => action.failure_message().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Invalid JSON in custom parameters")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Custom parameters must be a JSON object")]
    NotAnObject,

    #[error("Processing time must be between {min} and {max} seconds")]
    ProcessingTimeOutOfRange { min: u32, max: u32 },

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Failed to create task")]
    Request(#[source] ClientError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("no task with id {0} in the current list")]
    UnknownTask(String),

    #[error("task {id} is {status} and cannot be deleted")]
    NotDeletable { id: String, status: TaskStatus },

    #[error("task {0} is already deleted")]
    AlreadyDeleted(String),

    #[error("no deletion is awaiting confirmation")]
    NoPendingDelete,
}
