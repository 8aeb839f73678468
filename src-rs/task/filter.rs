use std::fmt;
use std::str::FromStr;

use super::types::{Task, TaskStatus};

/// The six mutually exclusive filter buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Processing,
    Completed,
    Failed,
    Deleted,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 6] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Processing,
        StatusFilter::Completed,
        StatusFilter::Failed,
        StatusFilter::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Processing => "processing",
            StatusFilter::Completed => "completed",
            StatusFilter::Failed => "failed",
            StatusFilter::Deleted => "deleted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Pending => "Pending",
            StatusFilter::Processing => "Processing",
            StatusFilter::Completed => "Completed",
            StatusFilter::Failed => "Failed",
            StatusFilter::Deleted => "Deleted",
        }
    }
}

impl From<TaskStatus> for StatusFilter {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => StatusFilter::Pending,
            TaskStatus::Processing => StatusFilter::Processing,
            TaskStatus::Completed => StatusFilter::Completed,
            TaskStatus::Failed => StatusFilter::Failed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_lowercase();
        StatusFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str() == value)
            .ok_or_else(|| format!("unknown status filter: {}", value))
    }
}

/// Parameters of a `GET /tasks` request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub status: StatusFilter,
    pub include_deleted: bool,
}

impl ListQuery {
    pub fn new(status: StatusFilter, include_deleted: bool) -> Self {
        Self {
            status,
            include_deleted,
        }
    }

    /// Every task the service knows about, soft-deleted ones included.
    /// Used to derive the filter counts.
    pub fn everything() -> Self {
        Self::new(StatusFilter::All, true)
    }

    /// `all` never reaches the wire and `include_deleted` is only sent when set.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.status != StatusFilter::All {
            pairs.push(("status", self.status.as_str().to_string()));
        }
        if self.include_deleted {
            pairs.push(("include_deleted", "true".to_string()));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Per-filter counts shown next to each filter button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub all: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub deleted: usize,
}

impl TaskCounts {
    /// Soft-deleted tasks only land in the `deleted` bucket.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counts = TaskCounts::default();
        for task in tasks {
            if task.is_deleted() {
                counts.deleted += 1;
                continue;
            }
            counts.all += 1;
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Processing => counts.processing += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    pub fn get(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Pending => self.pending,
            StatusFilter::Processing => self.processing,
            StatusFilter::Completed => self.completed,
            StatusFilter::Failed => self.failed,
            StatusFilter::Deleted => self.deleted,
        }
    }
}

/// One button of the filter bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterOption {
    pub filter: StatusFilter,
    pub label: &'static str,
    pub count: usize,
    pub selected: bool,
}

pub fn filter_options(counts: &TaskCounts, current: StatusFilter) -> Vec<FilterOption> {
    StatusFilter::ALL
        .into_iter()
        .map(|filter| FilterOption {
            filter,
            label: filter.label(),
            count: counts.get(filter),
            selected: filter == current,
        })
        .collect()
}
