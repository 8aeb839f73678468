use std::time::Duration;

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub auto_refresh: bool,
    pub request_timeout: Option<Duration>,
    pub default_task_type: String,
    pub default_processing_time: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            poll_interval: Duration::from_secs(5),
            auto_refresh: false,
            request_timeout: None,
            default_task_type: "data_processing".to_string(),
            default_processing_time: 5,
        }
    }
}
