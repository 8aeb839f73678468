use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// A cancellable periodic job.
///
/// At most one timer exists per `Poller`: `start` tears down the previous one
/// before spawning, and dropping the poller stops it. The first tick fires one
/// full period after `start`.
///
/// Stopping only ends the loop between ticks. A tick that is already running
/// is left to finish.
pub struct Poller {
    period: Duration,
    handle: Option<JoinHandle<()>>,
    halt: Option<watch::Sender<bool>>,
    starts: u64,
}

impl Poller {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
            halt: None,
            starts: 0,
        }
    }

    /// (Re)starts the timer. `tick` runs once per period; returning `false`
    /// ends the loop. Must be called from within a tokio runtime.
    pub fn start<F, Fut>(&mut self, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.stop();
        self.starts += 1;
        let period = self.period;
        let (halt, mut halted) = watch::channel(false);
        debug!("poller started, period {:?}", period);
        self.halt = Some(halt);
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    // a send or a dropped sender both mean stop
                    _ = halted.changed() => break,
                    _ = ticker.tick() => {}
                }
                if !tick().await {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(halt) = self.halt.take() {
            let _ = halt.send(true);
        }
        if self.handle.take().is_some() {
            debug!("poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// How many timers this poller has spawned over its lifetime.
    pub fn starts(&self) -> u64 {
        self.starts
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
