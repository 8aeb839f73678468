use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::TaskApi;
use crate::error::ClientError;
use crate::task::{CreateTaskRequest, DeleteResponse, ListQuery, ServiceInfo, Task, TaskListResponse};

pub struct HTTPClient {
    pub base_url: String,
    base: Url,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|err| ClientError::BaseUrl(format!("{}: {}", base_url, err)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(base_url));
        }
        Ok(Self {
            base_url,
            base,
            client: builder.build()?,
        })
    }

    /// Appends path segments to the base url. Each segment is percent-encoded,
    /// so a task id can never reach into another route.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl TaskApi for HTTPClient {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, ClientError> {
        debug!("POST /tasks task_type={}", request.task_type);
        let resp = self.client.post(self.url(&["tasks"])).json(request).send().await?;
        decode(resp).await
    }

    async fn task_status(&self, id: &str) -> Result<Task, ClientError> {
        debug!("GET /tasks/{}/status", id);
        let resp = self
            .client
            .get(self.url(&["tasks", id, "status"]))
            .send()
            .await?;
        decode(resp).await
    }

    async fn task_result(&self, id: &str) -> Result<Task, ClientError> {
        debug!("GET /tasks/{}/result", id);
        let resp = self
            .client
            .get(self.url(&["tasks", id, "result"]))
            .send()
            .await?;
        decode(resp).await
    }

    async fn delete_task(&self, id: &str) -> Result<DeleteResponse, ClientError> {
        debug!("DELETE /tasks/{}", id);
        let resp = self
            .client
            .delete(self.url(&["tasks", id]))
            .send()
            .await?;
        decode(resp).await
    }

    async fn list_tasks(&self, query: &ListQuery) -> Result<TaskListResponse, ClientError> {
        debug!("GET /tasks?{}", query.to_query_string());
        let mut req = self.client.get(self.url(&["tasks"]));
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            req = req.query(&pairs);
        }
        let resp = req.send().await?;
        decode(resp).await
    }

    async fn health(&self) -> Result<ServiceInfo, ClientError> {
        let resp = self.client.get(self.url(&[])).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str::<T>(&body).map_err(|err| ClientError::Decode(err.to_string()))
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            detail: detail_from_body(&body),
            body,
        })
    }
}

/// Error bodies carry a human readable `detail` string. Validation errors use
/// a structured `detail` instead, which is not shown.
fn detail_from_body(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    value
        .get("detail")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
