mod cli;
mod render;
mod repl;

use std::sync::Arc;

use log::LevelFilter;
use task_dashboard_rs::{Dashboard, HTTPClient};

use repl::REPL;

#[tokio::main]
async fn main() {
    let config = cli::parse_config();
    let log_level = match config.log_level.as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let client = match HTTPClient::new(&config.dashboard.base_url, config.dashboard.request_timeout) {
        Ok(client) => client,
        Err(err) => {
            render::error(&format!("could not build http client: {}", err));
            std::process::exit(1);
        }
    };
    let dashboard = Dashboard::new(Arc::new(client), &config.dashboard);
    let mut repl = REPL::new(config, dashboard);
    repl.run().await;
}
