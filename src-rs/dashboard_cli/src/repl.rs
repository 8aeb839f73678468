use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use task_dashboard_rs::task::StatusFilter;
use task_dashboard_rs::{Dashboard, TaskForm};

use crate::cli::CLIConfig;
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub dashboard: Dashboard,
    pub form: TaskForm,
}

impl REPL {
    pub fn new(config: CLIConfig, dashboard: Dashboard) -> Self {
        let form = TaskForm::new(&config.dashboard);
        Self {
            config,
            dashboard,
            form,
        }
    }

    pub async fn run(&mut self) {
        let service = match self.dashboard.api().health().await {
            Ok(info) => Some(info.message),
            Err(err) => {
                debug!("health check failed: {}", err);
                None
            }
        };
        render::banner(&self.config, service.as_deref());

        self.dashboard.refresh().await;
        render::page(&self.dashboard.snapshot());

        let mut polls: watch::Receiver<u64> = self.dashboard.subscribe_polls();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            render::prompt(&self.dashboard.snapshot());
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        _ => break,
                    };
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if !line.starts_with('/') {
                        render::info("commands start with '/', type /help");
                        continue;
                    }
                    if self.handle_command(&line).await {
                        break;
                    }
                }
                changed = polls.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    render::poll_summary(&self.dashboard.snapshot());
                }
            }
        }
        self.dashboard.shutdown();
    }

    async fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        self.dashboard.clear_messages();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "list" => render::page(&self.dashboard.snapshot()),
            "refresh" => {
                self.dashboard.refresh().await;
                render::page(&self.dashboard.snapshot());
            }
            "filter" => match rest.parse::<StatusFilter>() {
                Ok(filter) => {
                    self.dashboard.set_status_filter(filter).await;
                    render::page(&self.dashboard.snapshot());
                }
                Err(err) => render::error(&err),
            },
            "deleted" => {
                let current = self.dashboard.snapshot().include_deleted;
                match toggle(rest, current) {
                    Some(flag) => {
                        self.dashboard.set_include_deleted(flag).await;
                        render::page(&self.dashboard.snapshot());
                    }
                    None => render::error("invalid flag, use on|off"),
                }
            }
            "auto" => {
                let current = self.dashboard.snapshot().auto_refresh;
                match toggle(rest, current) {
                    Some(flag) => {
                        self.dashboard.set_auto_refresh(flag);
                        render::info(&format!("auto-refresh: {}", if flag { "on" } else { "off" }));
                    }
                    None => render::error("invalid flag, use on|off"),
                }
            }
            "new" => {
                self.dashboard.open_form();
                render::form(&self.form);
            }
            "type" | "time" | "params" | "submit" => self.handle_form(cmd, rest).await,
            "cancel" => {
                let state = self.dashboard.snapshot();
                if state.pending_delete.is_some() {
                    self.dashboard.cancel_delete();
                    render::info("delete cancelled");
                } else if state.form_open {
                    self.form.error = None;
                    self.dashboard.close_form();
                    render::info("form closed");
                } else {
                    render::info("nothing to cancel");
                }
            }
            "status" | "result" => {
                if rest.is_empty() {
                    render::error("task id required");
                    return false;
                }
                let task = if cmd == "status" {
                    self.dashboard.check_status(rest).await
                } else {
                    self.dashboard.get_result(rest).await
                };
                match task {
                    Some(task) => render::detail(&task),
                    None => render::messages(&self.dashboard.snapshot()),
                }
            }
            "show" => match self.dashboard.select_task(rest) {
                Ok(task) => render::detail(&task),
                Err(err) => render::error(&err.to_string()),
            },
            "close" => {
                self.dashboard.close_detail();
                render::info("details closed");
            }
            "delete" => match self.dashboard.request_delete(rest) {
                Ok(()) => render::confirm_delete(rest),
                Err(err) => render::error(&err.to_string()),
            },
            "confirm" => match self.dashboard.confirm_delete().await {
                Ok(_) => render::page(&self.dashboard.snapshot()),
                Err(err) => render::error(&err.to_string()),
            },
            "config" => render::config(&self.config, &self.dashboard.snapshot()),
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    async fn handle_form(&mut self, cmd: &str, rest: &str) {
        if !self.dashboard.snapshot().form_open {
            render::error("no form open, use /new");
            return;
        }
        match cmd {
            "type" => match self.form.set_task_type(rest) {
                Ok(()) => render::form(&self.form),
                Err(err) => render::error(&err.to_string()),
            },
            "time" => match rest.parse::<u32>() {
                Ok(secs) => {
                    self.form.processing_time = secs;
                    render::form(&self.form);
                }
                Err(_) => render::error("processing time must be a whole number of seconds"),
            },
            "params" => {
                self.form.custom_params = if rest.is_empty() {
                    "{}".to_string()
                } else {
                    rest.to_string()
                };
                render::form(&self.form);
            }
            _ => match self.dashboard.submit_form(&mut self.form).await {
                Ok(task) => {
                    render::info(&format!("created task {}", task.id));
                    render::page(&self.dashboard.snapshot());
                }
                Err(_) => render::form(&self.form),
            },
        }
    }
}

fn toggle(value: &str, current: bool) -> Option<bool> {
    if value.is_empty() {
        return Some(!current);
    }
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
