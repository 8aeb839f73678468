//! In-process task service speaking the same HTTP API as the real backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use task_dashboard_rs::task::{
    AppliedFilters, CreateTaskRequest, DeleteResponse, Task, TaskListResponse, TaskStatus,
};

#[derive(Default)]
pub struct FakeService {
    tasks: RwLock<HashMap<String, Task>>,
    queries: RwLock<Vec<String>>,
    counter: AtomicUsize,
}

impl FakeService {
    pub fn insert(&self, id: &str, status: TaskStatus, deleted: bool) {
        let task = Task {
            id: id.to_string(),
            task_type: "default".to_string(),
            status,
            parameters: Default::default(),
            result: None,
            error: None,
            created_at: Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            completed_at: None,
            deleted_at: deleted.then(|| Utc::now().to_rfc3339()),
        };
        if let Ok(mut map) = self.tasks.write() {
            map.insert(id.to_string(), task);
        }
    }

    pub fn finish(&self, id: &str, result: serde_json::Value) {
        if let Ok(mut map) = self.tasks.write() {
            if let Some(task) = map.get_mut(id) {
                task.status = TaskStatus::Completed;
                task.result = Some(result);
                task.completed_at = Some(Utc::now().to_rfc3339());
            }
        }
    }

    /// Raw query strings of every `GET /tasks`, in arrival order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.read().map(|q| q.clone()).unwrap_or_default()
    }

    fn get(&self, id: &str) -> Option<Task> {
        self.tasks.read().ok()?.get(id).cloned()
    }
}

pub async fn spawn(service: Arc<FakeService>) -> String {
    let app = Router::new()
        .route("/", get(handle_root))
        .route("/tasks", get(handle_list).post(handle_create))
        .route("/tasks/:id", delete(handle_delete))
        .route("/tasks/:id/status", get(handle_get))
        .route("/tasks/:id/result", get(handle_get))
        .with_state(service);

    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(async move {
        let _ = server.await;
    });
    format!("http://{}", addr)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn handle_root() -> Json<serde_json::Value> {
    Json(json!({"message": "Task Service is running", "version": "1.0.0", "docs": "/docs"}))
}

async fn handle_create(
    State(service): State<Arc<FakeService>>,
    Json(req): Json<CreateTaskRequest>,
) -> Json<Task> {
    let id = format!("task_{}", service.counter.fetch_add(1, Ordering::SeqCst) + 1);
    service.insert(&id, TaskStatus::Pending, false);
    if let Ok(mut map) = service.tasks.write() {
        if let Some(task) = map.get_mut(&id) {
            task.task_type = req.task_type;
            task.parameters = req.parameters;
        }
    }
    Json(service.get(&id).expect("task just inserted"))
}

async fn handle_get(State(service): State<Arc<FakeService>>, Path(id): Path<String>) -> Response {
    match service.get(&id) {
        Some(task) => Json(task).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn handle_delete(State(service): State<Arc<FakeService>>, Path(id): Path<String>) -> Response {
    let Ok(mut map) = service.tasks.write() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let Some(task) = map.get_mut(&id) else {
        return detail(StatusCode::NOT_FOUND, "Task not found");
    };
    if task.deleted_at.is_some() {
        return detail(StatusCode::BAD_REQUEST, "Task already deleted");
    }
    if !task.status.is_terminal() {
        return detail(
            StatusCode::BAD_REQUEST,
            &format!("Cannot delete task with status {}", task.status),
        );
    }
    task.deleted_at = Some(Utc::now().to_rfc3339());
    Json(DeleteResponse {
        message: "Task deleted successfully".to_string(),
        task_id: id,
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<String>,
    include_deleted: Option<bool>,
}

async fn handle_list(
    State(service): State<Arc<FakeService>>,
    RawQuery(raw): RawQuery,
    Query(params): Query<ListParams>,
) -> Response {
    if let Ok(mut queries) = service.queries.write() {
        queries.push(raw.unwrap_or_default());
    }
    let include_deleted = params.include_deleted.unwrap_or(false);
    let status = params.status.clone().unwrap_or_else(|| "all".to_string());
    let wanted = match status.as_str() {
        "all" | "deleted" => None,
        other => match other.parse::<TaskStatus>() {
            Ok(status) => Some(status),
            Err(err) => return detail(StatusCode::BAD_REQUEST, &err),
        },
    };

    let mut tasks: Vec<Task> = service
        .tasks
        .read()
        .map(|map| map.values().cloned().collect())
        .unwrap_or_default();
    tasks.retain(|task| {
        if status == "deleted" {
            return task.deleted_at.is_some();
        }
        (include_deleted || task.deleted_at.is_none())
            && wanted.map(|s| s == task.status).unwrap_or(true)
    });
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(TaskListResponse {
        total_tasks: tasks.len(),
        filters: AppliedFilters {
            status,
            include_deleted,
        },
        tasks,
    })
    .into_response()
}
