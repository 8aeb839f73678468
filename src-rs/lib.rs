pub mod config;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod poller;

#[path = "client/lib.rs"]
pub mod client;
#[path = "task/lib.rs"]
pub mod task;

#[cfg(test)]
mod testing;

pub use client::{HTTPClient, TaskApi};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardState};
pub use error::{Action, ClientError, DashboardError, FormError};
pub use form::TaskForm;
pub use poller::Poller;
