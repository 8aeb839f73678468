use log::warn;
use serde_json::{Map, Value};

use crate::client::TaskApi;
use crate::config::DashboardConfig;
use crate::error::FormError;
use crate::task::{is_known_task_type, CreateTaskRequest, Task};

pub const MIN_PROCESSING_TIME: u32 = 1;
pub const MAX_PROCESSING_TIME: u32 = 60;
const EMPTY_PARAMS: &str = "{}";

/// Input state of the "create task" dialog.
#[derive(Clone, Debug)]
pub struct TaskForm {
    pub task_type: String,
    pub processing_time: u32,
    pub custom_params: String,
    pub error: Option<String>,
    default_processing_time: u32,
}

impl TaskForm {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            task_type: config.default_task_type.clone(),
            processing_time: config.default_processing_time,
            custom_params: EMPTY_PARAMS.to_string(),
            error: None,
            default_processing_time: config.default_processing_time,
        }
    }

    pub fn set_task_type(&mut self, task_type: &str) -> Result<(), FormError> {
        if !is_known_task_type(task_type) {
            return Err(FormError::UnknownTaskType(task_type.to_string()));
        }
        self.task_type = task_type.to_string();
        Ok(())
    }

    /// Merges `processing_time` with the custom JSON. Custom keys win.
    pub fn build_parameters(&self) -> Result<Map<String, Value>, FormError> {
        if !(MIN_PROCESSING_TIME..=MAX_PROCESSING_TIME).contains(&self.processing_time) {
            return Err(FormError::ProcessingTimeOutOfRange {
                min: MIN_PROCESSING_TIME,
                max: MAX_PROCESSING_TIME,
            });
        }

        let mut parameters = Map::new();
        parameters.insert("processing_time".to_string(), Value::from(self.processing_time));

        let custom = self.custom_params.trim();
        if custom.is_empty() || custom == EMPTY_PARAMS {
            return Ok(parameters);
        }
        let parsed = serde_json::from_str::<Value>(custom).map_err(FormError::InvalidJson)?;
        let Value::Object(custom) = parsed else {
            return Err(FormError::NotAnObject);
        };
        parameters.extend(custom);
        Ok(parameters)
    }

    /// Validates, sends the creation request and resets the inputs on success.
    /// Nothing reaches the service when validation fails.
    pub async fn submit(&mut self, api: &dyn TaskApi) -> Result<Task, FormError> {
        self.error = None;
        let parameters = match self.build_parameters() {
            Ok(parameters) => parameters,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        let request = CreateTaskRequest {
            task_type: self.task_type.clone(),
            parameters,
        };
        match api.create_task(&request).await {
            Ok(task) => {
                self.reset();
                Ok(task)
            }
            Err(err) => {
                warn!("create task failed: {}", err);
                let err = FormError::Request(err);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn reset(&mut self) {
        self.processing_time = self.default_processing_time;
        self.custom_params = EMPTY_PARAMS.to_string();
        self.error = None;
    }
}
