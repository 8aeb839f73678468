use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use task_dashboard_rs::task::{
    filter_options, format_timestamp, StatusFilter, Task, TaskActions, TaskDetail, TASK_TYPES,
};
use task_dashboard_rs::{DashboardState, TaskForm};

use crate::cli::CLIConfig;

pub fn banner(cfg: &CLIConfig, service: Option<&str>) {
    println!("{}", "Task Dashboard".bold());
    println!("API: {}", cfg.dashboard.base_url);
    match service {
        Some(message) => println!("Service: {}", message),
        None => println!("Service: {}", "unreachable".with(Color::Red)),
    }
    println!("Type /help for commands.");
}

pub fn prompt(state: &DashboardState) {
    if state.form_open {
        print!("new task> ");
    } else if state.pending_delete.is_some() {
        print!("confirm? ");
    } else {
        print!("> ");
    }
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                  Show commands");
    println!("  /exit | /quit          Exit");
    println!("  /list                  Show the task list");
    println!("  /refresh               Re-fetch tasks and counts");
    println!("  /filter <status>       all|pending|processing|completed|failed|deleted");
    println!("  /deleted [on|off]      Include soft-deleted tasks");
    println!("  /auto [on|off]         Toggle auto-refresh");
    println!("  /new                   Open the create-task form");
    println!("  /type <task_type>      Form: set task type");
    println!("  /time <seconds>        Form: set processing time (1-60)");
    println!("  /params <json>         Form: set custom parameters");
    println!("  /submit                Form: create the task");
    println!("  /cancel                Close the form or cancel a pending delete");
    println!("  /status <id>           Check task status");
    println!("  /result <id>           Get task result");
    println!("  /show <id>             Show task details");
    println!("  /close                 Close the details view");
    println!("  /delete <id>           Delete a finished task (asks for confirmation)");
    println!("  /confirm               Confirm the pending delete");
    println!("  /config                Show current config");
}

pub fn status_color(filter: StatusFilter) -> Color {
    match filter {
        StatusFilter::Pending => Color::Yellow,
        StatusFilter::Processing => Color::Blue,
        StatusFilter::Completed => Color::Green,
        StatusFilter::Failed => Color::Red,
        StatusFilter::Deleted | StatusFilter::All => Color::DarkGrey,
    }
}

fn badge(task: &Task) -> String {
    let filter = if task.is_deleted() {
        StatusFilter::Deleted
    } else {
        StatusFilter::from(task.status)
    };
    let text = format!("[{}]", task.status.as_str().to_uppercase());
    format!("{}", text.with(status_color(filter)).bold())
}

pub fn page(state: &DashboardState) {
    filters(state);
    println!();
    let mut header = format!("Tasks ({})", state.tasks.len());
    if state.loading {
        header.push_str("  loading...");
    }
    if let Some(at) = state.last_refresh {
        header.push_str(&format!("  refreshed {}", at.format("%H:%M:%S")));
    }
    if state.auto_refresh {
        header.push_str("  [auto]");
    }
    println!("{}", header.bold());
    messages(state);
    if state.tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for task in &state.tasks {
        task_row(task);
    }
}

pub fn filters(state: &DashboardState) {
    let mut line = String::from("Status:");
    for option in filter_options(&state.counts, state.status_filter) {
        let text = format!("{} {}", option.label, option.count);
        if option.selected {
            line.push_str(&format!(
                "  {}",
                format!("<{}>", text).with(status_color(option.filter)).bold()
            ));
        } else {
            line.push_str(&format!("  {}", text));
        }
    }
    println!("{}", line);
    println!(
        "Include deleted: {}",
        if state.include_deleted { "yes" } else { "no" }
    );
}

fn task_row(task: &Task) {
    let actions = TaskActions::for_task(task);
    let mut offered = Vec::new();
    if actions.check_status {
        offered.push("/status");
    }
    if actions.get_result {
        offered.push("/result");
    }
    if actions.delete {
        offered.push("/delete");
    }
    println!(
        "{} {}  {}  created {}",
        badge(task),
        task.id,
        task.task_type,
        format_timestamp(&task.created_at)
    );
    println!("    {}", offered.join(" ").with(Color::DarkGrey));
}

pub fn messages(state: &DashboardState) {
    if let Some(err) = &state.error {
        error(err);
    }
    if let Some(notice) = &state.notice {
        println!("{}", notice.as_str().with(Color::Green));
    }
}

pub fn detail(task: &Task) {
    let detail = TaskDetail::from(task);
    println!("{}", "Task Details".bold());
    println!("  ID: {}", detail.id);
    println!("  Type: {}", detail.task_type);
    println!("  Status: {}", badge(task));
    println!("  Created: {}", detail.created);
    if let Some(completed) = &detail.completed {
        println!("  Completed: {}", completed);
    }
    if let Some(deleted) = &detail.deleted {
        println!("  Deleted: {}", deleted);
    }
    println!("  Parameters:");
    indented(&detail.parameters, None);
    if let Some(result) = &detail.result {
        println!("  Result:");
        indented(result, Some(Color::Green));
    }
    if let Some(err) = &detail.error {
        println!("  Error:");
        indented(err, Some(Color::Red));
    }
    println!("(/close to dismiss)");
}

fn indented(text: &str, color: Option<Color>) {
    for line in text.lines() {
        match color {
            Some(color) => println!("    {}", line.with(color)),
            None => println!("    {}", line),
        }
    }
}

pub fn form(form: &TaskForm) {
    println!("{}", "Create New Task".bold());
    let label = TASK_TYPES
        .iter()
        .find(|(name, _)| *name == form.task_type)
        .map(|(_, label)| *label)
        .unwrap_or("");
    println!("  Task type: {} ({})", form.task_type, label);
    println!("  Processing time: {}s", form.processing_time);
    println!("  Custom parameters: {}", form.custom_params);
    if let Some(err) = &form.error {
        error(err);
    }
    println!(
        "  types: {}",
        TASK_TYPES
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  /type /time /params to edit, /submit to create, /cancel to close");
}

pub fn confirm_delete(id: &str) {
    println!(
        "Delete task {}? This cannot be undone. /confirm or /cancel",
        id.bold()
    );
}

pub fn poll_summary(state: &DashboardState) {
    let at = state
        .last_refresh
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_default();
    let summary = format!(
        "[auto-refresh {}] {} tasks, {} pending, {} processing",
        at,
        state.tasks.len(),
        state.counts.pending,
        state.counts.processing
    );
    println!();
    println!("{}", summary.with(Color::DarkGrey));
    if let Some(err) = &state.error {
        error(err);
    }
}

pub fn config(cfg: &CLIConfig, state: &DashboardState) {
    println!("config:");
    println!("  base: {}", cfg.dashboard.base_url);
    println!("  poll: {}s", cfg.dashboard.poll_interval.as_secs());
    match cfg.dashboard.request_timeout {
        Some(timeout) => println!("  timeout: {}s", timeout.as_secs()),
        None => println!("  timeout: none"),
    }
    println!("  log: {}", cfg.log_level);
    println!("  filter: {}", state.status_filter);
    println!("  include deleted: {}", state.include_deleted);
    println!("  auto-refresh: {}", state.auto_refresh);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".with(Color::Red), msg);
}
