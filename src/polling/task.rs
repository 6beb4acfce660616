//! Cancellable poll loops.
//!
//! A [`PollTask`] drives one [`PollJob`] on a fixed period. Every tick asks the job
//! whether to fetch (backoff, stop conditions) and for a sequence number. The fetch runs
//! as its own task, so a slow response never delays the next tick. Results are handed
//! back to the job together with their sequence number.
//!
//! Cancelling the loop does not abort fetches already in flight. They are detached and
//! finish on their own, and their results are dropped instead of being applied.

use crate::polling::SourceError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// One kind of periodic fetch and what to do with its result.
#[async_trait]
pub trait PollJob: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Called before each fetch. `None` skips this round; `Some(seq)` tags the fetch.
    /// `manual` is true for an explicit refresh.
    fn begin(&self, manual: bool) -> Option<u64>;

    async fn fetch(&self) -> Result<Self::Output, SourceError>;

    /// Receives the result of fetch `seq`.
    fn finish(&self, seq: u64, result: Result<Self::Output, SourceError>);
}

/// Handle to a running poll loop. Dropping it cancels the loop.
pub struct PollTask {
    name: &'static str,
    shutdown: Option<oneshot::Sender<()>>,
    refresh: mpsc::Sender<()>,
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollTask {
    /// Starts polling `job` every `period`. The first round runs immediately.
    pub fn spawn<J: PollJob>(name: &'static str, period: Duration, job: Arc<J>) -> Self {
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let (refresh, mut refresh_rx) = mpsc::channel::<()>(1);
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = stopped.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut in_flight: JoinSet<()> = JoinSet::new();
            info!(poll = name, ?period, "Polling started");

            loop {
                let manual = tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => false,
                    Some(()) = refresh_rx.recv() => true,
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => continue,
                };

                let Some(seq) = job.begin(manual) else {
                    debug!(poll = name, "Round skipped");
                    continue;
                };
                let job = job.clone();
                let flag = flag.clone();
                in_flight.spawn(async move {
                    let result = job.fetch().await;
                    if flag.load(Ordering::Acquire) {
                        debug!(poll = name, seq, "Poll stopped, result dropped");
                        return;
                    }
                    job.finish(seq, result);
                });
            }

            flag.store(true, Ordering::Release);
            if !in_flight.is_empty() {
                debug!(poll = name, pending = in_flight.len(), "Detaching in-flight fetches");
            }
            in_flight.detach_all();
            info!(poll = name, "Polling stopped");
        });

        Self {
            name,
            shutdown: Some(shutdown),
            refresh,
            stopped,
            handle: Some(handle),
        }
    }

    /// Requests an immediate round outside the schedule. Coalesces with a pending request.
    pub fn trigger(&self) {
        let _ = self.refresh.try_send(());
    }

    /// Signals the loop to stop without waiting for it.
    pub fn cancel(&mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }

    /// Stops the loop and waits until it has exited.
    pub async fn stop(mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(poll = self.name, error = %e, "Poll loop ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
