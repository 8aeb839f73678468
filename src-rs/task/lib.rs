pub mod filter;
pub mod types;
pub mod view;

pub use filter::{filter_options, FilterOption, ListQuery, StatusFilter, TaskCounts};
pub use types::{
    is_known_task_type, AppliedFilters, CreateTaskRequest, DeleteResponse, ServiceInfo, Task,
    TaskListResponse, TaskStatus, TASK_TYPES,
};
pub use view::{format_timestamp, pretty_json, TaskActions, TaskDetail};
