//! In-memory `TaskApi` used by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::client::TaskApi;
use crate::error::ClientError;
use crate::task::{
    AppliedFilters, CreateTaskRequest, DeleteResponse, ListQuery, ServiceInfo, StatusFilter, Task,
    TaskListResponse, TaskStatus,
};

#[derive(Default)]
pub struct FakeApi {
    tasks: Mutex<Vec<Task>>,
    queries: Mutex<Vec<ListQuery>>,
    creates: AtomicUsize,
    deletes: AtomicUsize,
    next_id: AtomicUsize,
    fail_creates: AtomicBool,
    fail_lists: AtomicBool,
    list_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::new();
        *api.tasks.lock().unwrap() = tasks;
        api
    }

    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// The next list call answers with the data it saw on entry, but only
    /// after the returned gate is notified.
    pub fn hold_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn set_status(&self, id: &str, status: TaskStatus) {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
            task.status = status;
        }
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn clear_queries(&self) {
        self.queries.lock().unwrap().clear();
    }

    fn find(&self, id: &str) -> Result<Task, ClientError> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(not_found)
    }
}

pub fn task(id: &str, status: TaskStatus) -> Task {
    Task {
        id: id.to_string(),
        task_type: "data_processing".to_string(),
        status,
        parameters: Default::default(),
        result: None,
        error: None,
        created_at: "2024-05-01T10:00:00".to_string(),
        completed_at: None,
        deleted_at: None,
    }
}

pub fn deleted_task(id: &str, status: TaskStatus) -> Task {
    Task {
        deleted_at: Some("2024-05-01T11:00:00".to_string()),
        ..task(id, status)
    }
}

fn not_found() -> ClientError {
    ClientError::Status {
        status: 404,
        detail: Some("Task not found".to_string()),
        body: r#"{"detail":"Task not found"}"#.to_string(),
    }
}

fn unavailable() -> ClientError {
    ClientError::Status {
        status: 503,
        detail: None,
        body: String::new(),
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, ClientError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let id = format!("new-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let created = Task {
            task_type: request.task_type.clone(),
            parameters: request.parameters.clone(),
            ..task(&id, TaskStatus::Pending)
        };
        self.tasks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn task_status(&self, id: &str) -> Result<Task, ClientError> {
        self.find(id)
    }

    async fn task_result(&self, id: &str) -> Result<Task, ClientError> {
        self.find(id)
    }

    async fn delete_task(&self, id: &str) -> Result<DeleteResponse, ClientError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
        if task.deleted_at.is_some() {
            return Err(ClientError::Status {
                status: 400,
                detail: Some("Task already deleted".to_string()),
                body: String::new(),
            });
        }
        task.deleted_at = Some("2024-05-01T12:00:00".to_string());
        Ok(DeleteResponse {
            message: "Task deleted successfully".to_string(),
            task_id: id.to_string(),
        })
    }

    async fn list_tasks(&self, query: &ListQuery) -> Result<TaskListResponse, ClientError> {
        self.queries.lock().unwrap().push(*query);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let tasks: Vec<Task> = self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| match query.status {
                StatusFilter::Deleted => t.is_deleted(),
                StatusFilter::All => query.include_deleted || !t.is_deleted(),
                other => {
                    StatusFilter::from(t.status) == other && (query.include_deleted || !t.is_deleted())
                }
            })
            .cloned()
            .collect();
        let gate = self.list_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(TaskListResponse {
            total_tasks: tasks.len(),
            filters: AppliedFilters {
                status: query.status.to_string(),
                include_deleted: query.include_deleted,
            },
            tasks,
        })
    }

    async fn health(&self) -> Result<ServiceInfo, ClientError> {
        Ok(ServiceInfo {
            message: "fake task service".to_string(),
            version: "test".to_string(),
            docs: None,
        })
    }
}
