//! Admin order detail: one order, re-read every 10 seconds.

use super::{Backoff, PollConfig, PollJob, PollTask, SequenceGate, SourceError, TrackingSource};
use crate::model::{OrderId, OrderView};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What the detail screen shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Ready(OrderView),
    /// Nothing could be loaded yet. The screen shows the message and a retry action.
    Failed(String),
    /// Terminal for automatic polling. Only a manual refresh asks again.
    NotFound,
}

struct DetailJob<S> {
    source: Arc<S>,
    order_id: OrderId,
    inner: Mutex<DetailInner>,
    state: watch::Sender<DetailState>,
}

struct DetailInner {
    gate: SequenceGate,
    backoff: Backoff,
}

impl<S> DetailJob<S> {
    fn lock(&self) -> std::sync::MutexGuard<'_, DetailInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<S: TrackingSource> PollJob for DetailJob<S> {
    type Output = OrderView;

    fn begin(&self, manual: bool) -> Option<u64> {
        let mut inner = self.lock();
        if !manual {
            if *self.state.borrow() == DetailState::NotFound {
                return None;
            }
            let now = Instant::now();
            if !inner.backoff.should_poll(now) {
                debug!(
                    order_id = %self.order_id,
                    remaining = ?inner.backoff.remaining(now),
                    "Backing off"
                );
                return None;
            }
        }
        Some(inner.gate.issue())
    }

    async fn fetch(&self) -> Result<OrderView, SourceError> {
        self.source.fetch_order(self.order_id).await
    }

    fn finish(&self, seq: u64, result: Result<OrderView, SourceError>) {
        let mut inner = self.lock();
        if !inner.gate.accept(seq) {
            debug!(order_id = %self.order_id, seq, "Stale response discarded");
            return;
        }

        match result {
            Ok(view) => {
                inner.backoff.record_success();
                self.state.send_replace(DetailState::Ready(view));
            }
            Err(SourceError::NotFound) => {
                inner.backoff.record_success();
                info!(order_id = %self.order_id, "Order not found, polling paused");
                self.state.send_replace(DetailState::NotFound);
            }
            Err(e) => {
                let pause = inner.backoff.record_failure(Instant::now());
                warn!(
                    order_id = %self.order_id,
                    failures = inner.backoff.failures(),
                    ?pause,
                    error = %e,
                    "Order poll failed"
                );
                // once something is on screen, failures stay silent
                self.state.send_if_modified(|state| match state {
                    DetailState::Ready(_) => false,
                    other => {
                        *other = DetailState::Failed(e.to_string());
                        true
                    }
                });
            }
        }
    }
}

/// The admin order detail screen.
///
/// Polls every `order_every`. After `n` consecutive failures further rounds are skipped
/// for `min(cap, step * n)`; a success resets the count. Dropping the view stops polling.
pub struct OrderDetailView<S: TrackingSource> {
    job: Arc<DetailJob<S>>,
    task: PollTask,
    state: watch::Receiver<DetailState>,
}

impl<S: TrackingSource> OrderDetailView<S> {
    pub fn spawn(source: Arc<S>, order_id: OrderId, config: &PollConfig) -> Self {
        let (state_tx, state) = watch::channel(DetailState::Loading);
        let job = Arc::new(DetailJob {
            source,
            order_id,
            inner: Mutex::new(DetailInner {
                gate: SequenceGate::new(),
                backoff: Backoff::new(config.backoff),
            }),
            state: state_tx,
        });
        let task = PollTask::spawn("order_detail", config.order_every, job.clone());
        Self { job, task, state }
    }

    pub fn order_id(&self) -> OrderId {
        self.job.order_id
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.clone()
    }

    /// Consecutive failed polls.
    pub fn failures(&self) -> u32 {
        self.job.lock().backoff.failures()
    }

    /// Manual retry. Runs immediately, even while backing off or after `NotFound`.
    pub fn refresh(&self) {
        self.task.trigger();
    }

    /// Shows the order returned by a status write without waiting for the next poll.
    /// Polls started before the write can no longer overwrite it.
    pub fn show(&self, view: OrderView) {
        let mut inner = self.job.lock();
        let seq = inner.gate.issue();
        inner.gate.accept(seq);
        self.job.state.send_replace(DetailState::Ready(view));
    }

    pub async fn stop(self) {
        self.task.stop().await;
    }
}
