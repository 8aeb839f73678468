use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::client::TaskApi;
use crate::config::DashboardConfig;
use crate::error::{Action, ClientError, DashboardError, FormError};
use crate::form::TaskForm;
use crate::poller::Poller;
use crate::task::{DeleteResponse, ListQuery, StatusFilter, Task, TaskCounts};

/// Everything the page shows. Only `Dashboard` mutates it.
#[derive(Clone, Debug, Default)]
pub struct DashboardState {
    pub tasks: Vec<Task>,
    pub all_tasks: Vec<Task>,
    pub counts: TaskCounts,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub status_filter: StatusFilter,
    pub include_deleted: bool,
    pub form_open: bool,
    pub auto_refresh: bool,
    pub last_refresh: Option<DateTime<Utc>>,
    pub selected: Option<Task>,
    pub pending_delete: Option<String>,
    list_seq: u64,
}

impl DashboardState {
    pub fn query(&self) -> ListQuery {
        ListQuery::new(self.status_filter, self.include_deleted)
    }

    pub fn should_poll(&self) -> bool {
        self.auto_refresh && !self.form_open
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

struct Inner {
    api: Arc<dyn TaskApi>,
    state: Mutex<DashboardState>,
    poller: Mutex<Poller>,
    polls: watch::Sender<u64>,
}

/// Page controller: owns the dashboard state and the auto-refresh timer.
///
/// Cloning is cheap and every clone drives the same page.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

impl Dashboard {
    /// Builds the controller. With `auto_refresh` set, the timer starts here
    /// when a tokio runtime is available, otherwise on the first `refresh`.
    pub fn new(api: Arc<dyn TaskApi>, config: &DashboardConfig) -> Self {
        let state = DashboardState {
            auto_refresh: config.auto_refresh,
            ..Default::default()
        };
        let (polls, _) = watch::channel(0);
        let dashboard = Self {
            inner: Arc::new(Inner {
                api,
                state: Mutex::new(state),
                poller: Mutex::new(Poller::new(config.poll_interval)),
                polls,
            }),
        };
        if config.auto_refresh {
            if Handle::try_current().is_ok() {
                dashboard.sync_polling();
            } else {
                debug!("no runtime yet, auto-refresh starts on first refresh");
            }
        }
        dashboard
    }

    pub fn api(&self) -> &dyn TaskApi {
        self.inner.api.as_ref()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state().clone()
    }

    /// Bumps once per completed auto-refresh tick.
    pub fn subscribe_polls(&self) -> watch::Receiver<u64> {
        self.inner.polls.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.poller().is_running()
    }

    pub async fn set_status_filter(&self, filter: StatusFilter) {
        self.state().status_filter = filter;
        self.sync_polling();
        self.refresh().await;
    }

    pub async fn set_include_deleted(&self, include: bool) {
        self.state().include_deleted = include;
        self.sync_polling();
        self.refresh().await;
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        self.state().auto_refresh = enabled;
        info!("auto-refresh {}", if enabled { "enabled" } else { "disabled" });
        self.sync_polling();
    }

    pub fn open_form(&self) {
        self.state().form_open = true;
        self.sync_polling();
    }

    pub fn close_form(&self) {
        self.state().form_open = false;
        self.sync_polling();
    }

    /// Re-fetches the filtered list and the unfiltered list behind the counts.
    ///
    /// A refresh that finishes after a newer one was started is discarded.
    pub async fn refresh(&self) {
        if self.state().should_poll() && !self.is_polling() {
            self.sync_polling();
        }
        let (seq, query) = {
            let mut state = self.state();
            state.list_seq += 1;
            state.loading = true;
            state.error = None;
            (state.list_seq, state.query())
        };

        let filtered = self.inner.api.list_tasks(&query).await;
        let everything = self.inner.api.list_tasks(&ListQuery::everything()).await;

        let mut state = self.state();
        if state.list_seq != seq {
            debug!("discarding superseded task list (seq {}, current {})", seq, state.list_seq);
            return;
        }
        state.loading = false;
        match filtered {
            Ok(resp) => {
                debug!("fetched {} of {} tasks", resp.tasks.len(), resp.total_tasks);
                state.tasks = resp.tasks;
            }
            Err(err) => {
                warn!("list tasks failed: {}", err);
                state.error = Some(err.user_message(Action::List));
            }
        }
        match everything {
            Ok(resp) => {
                state.counts = TaskCounts::from_tasks(&resp.tasks);
                state.all_tasks = resp.tasks;
            }
            Err(err) => warn!("count refresh failed: {}", err),
        }
        state.last_refresh = Some(Utc::now());
    }

    /// Refreshes only the unfiltered list and the counts derived from it.
    pub async fn refresh_counts(&self) {
        match self.inner.api.list_tasks(&ListQuery::everything()).await {
            Ok(resp) => {
                let mut state = self.state();
                state.counts = TaskCounts::from_tasks(&resp.tasks);
                state.all_tasks = resp.tasks;
            }
            Err(err) => warn!("count refresh failed: {}", err),
        }
    }

    /// Submits the form. A created task is put at the top of the list and the
    /// dialog closes; on failure the form keeps its inputs and error.
    pub async fn submit_form(&self, form: &mut TaskForm) -> Result<Task, FormError> {
        let task = form.submit(self.api()).await?;
        info!("created task {} ({})", task.id, task.task_type);
        {
            let mut state = self.state();
            state.tasks.insert(0, task.clone());
            state.form_open = false;
        }
        self.sync_polling();
        self.refresh_counts().await;
        Ok(task)
    }

    pub async fn check_status(&self, id: &str) -> Option<Task> {
        let result = self.inner.api.task_status(id).await;
        self.apply_task(result, Action::Status)
    }

    pub async fn get_result(&self, id: &str) -> Option<Task> {
        let result = self.inner.api.task_result(id).await;
        self.apply_task(result, Action::Result)
    }

    fn apply_task(&self, result: Result<Task, ClientError>, action: Action) -> Option<Task> {
        let mut state = self.state();
        match result {
            Ok(task) => {
                state.error = None;
                if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task.clone();
                }
                state.selected = Some(task.clone());
                Some(task)
            }
            Err(err) => {
                warn!("{}: {}", action.failure_message(), err);
                state.error = Some(err.user_message(action));
                None
            }
        }
    }

    /// Opens the detail overlay for a task already in the list.
    pub fn select_task(&self, id: &str) -> Result<Task, DashboardError> {
        let mut state = self.state();
        let task = state
            .find(id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownTask(id.to_string()))?;
        state.selected = Some(task.clone());
        Ok(task)
    }

    pub fn close_detail(&self) {
        self.state().selected = None;
    }

    /// First step of a deletion: remembers the task awaiting confirmation.
    pub fn request_delete(&self, id: &str) -> Result<(), DashboardError> {
        let mut state = self.state();
        let task = state
            .find(id)
            .ok_or_else(|| DashboardError::UnknownTask(id.to_string()))?;
        if task.is_deleted() {
            return Err(DashboardError::AlreadyDeleted(id.to_string()));
        }
        if !task.can_delete() {
            return Err(DashboardError::NotDeletable {
                id: id.to_string(),
                status: task.status,
            });
        }
        state.pending_delete = Some(id.to_string());
        Ok(())
    }

    pub fn cancel_delete(&self) {
        self.state().pending_delete = None;
    }

    /// Second step: fires the delete for the confirmed task and reloads.
    pub async fn confirm_delete(&self) -> Result<Option<DeleteResponse>, DashboardError> {
        let id = self
            .state()
            .pending_delete
            .take()
            .ok_or(DashboardError::NoPendingDelete)?;

        match self.inner.api.delete_task(&id).await {
            Ok(resp) => {
                info!("deleted task {}", resp.task_id);
                {
                    let mut state = self.state();
                    state.notice = Some(resp.message.clone());
                    if state.selected.as_ref().is_some_and(|t| t.id == id) {
                        state.selected = None;
                    }
                }
                self.refresh().await;
                Ok(Some(resp))
            }
            Err(err) => {
                warn!("delete task {} failed: {}", id, err);
                self.state().error = Some(err.user_message(Action::Delete));
                Ok(None)
            }
        }
    }

    pub fn clear_messages(&self) {
        let mut state = self.state();
        state.error = None;
        state.notice = None;
    }

    /// Stops the auto-refresh timer for good.
    pub fn shutdown(&self) {
        self.state().auto_refresh = false;
        self.poller().stop();
    }

    /// Tears the timer down and, when polling is wanted, spawns a fresh one.
    /// Called after every change to a condition the timer depends on.
    fn sync_polling(&self) {
        let should_poll = self.state().should_poll();
        let mut poller = self.poller();
        if !should_poll {
            poller.stop();
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        poller.start(move || {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return false;
                };
                let dashboard = Dashboard { inner };
                dashboard.refresh().await;
                dashboard.inner.polls.send_modify(|n| *n += 1);
                true
            }
        });
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poller(&self) -> MutexGuard<'_, Poller> {
        self.inner.poller.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
