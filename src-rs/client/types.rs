use async_trait::async_trait;

use crate::error::ClientError;
use crate::task::{CreateTaskRequest, DeleteResponse, ListQuery, ServiceInfo, Task, TaskListResponse};

/// Operations the dashboard needs from the task service.
///
/// Every call is a single best-effort request: no retries and no caching.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, ClientError>;

    async fn task_status(&self, id: &str) -> Result<Task, ClientError>;

    async fn task_result(&self, id: &str) -> Result<Task, ClientError>;

    async fn delete_task(&self, id: &str) -> Result<DeleteResponse, ClientError>;

    async fn list_tasks(&self, query: &ListQuery) -> Result<TaskListResponse, ClientError>;

    async fn health(&self) -> Result<ServiceInfo, ClientError>;
}
