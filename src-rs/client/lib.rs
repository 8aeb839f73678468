pub mod http;
pub mod types;

pub use http::HTTPClient;
pub use types::TaskApi;
