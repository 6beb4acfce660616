//! Customer tracking page.
//!
//! Two loops. The order loop re-reads the order and its active assignment every 10s,
//! regardless of failures. The location loop exists only while that assignment is
//! `accepted`: the order loop starts it when it sees an accepted assignment and drops it
//! as soon as the assignment is anything else, clearing the last known location.

use super::{PollConfig, PollJob, PollTask, SequenceGate, SourceError, TrackingSource};
use crate::model::{AssignmentStatus, DeliveryAssignment, DriverLocation, OrderId, OrderView};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingState {
    pub order: Option<OrderView>,
    pub assignment: Option<DeliveryAssignment>,
    /// Present only while the assignment is accepted.
    pub location: Option<DriverLocation>,
    /// Set when nothing could be loaded yet.
    pub error: Option<String>,
    pub not_found: bool,
}

impl TrackingState {
    pub fn driver_on_the_way(&self) -> bool {
        self.assignment
            .as_ref()
            .is_some_and(|a| a.status == AssignmentStatus::Accepted)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Shared<S> {
    source: Arc<S>,
    order_id: OrderId,
    location_every: Duration,
    state: watch::Sender<TrackingState>,
    location_task: Mutex<Option<PollTask>>,
    closed: AtomicBool,
}

impl<S: TrackingSource> Shared<S> {
    /// Starts or stops the location loop to match the assignment status.
    fn sync_location_loop(self: &Arc<Self>, accepted: bool) {
        let mut slot = lock(&self.location_task);
        if accepted && slot.is_none() && !self.closed.load(Ordering::Acquire) {
            let job = Arc::new(LocationJob {
                shared: self.clone(),
                gate: Mutex::new(SequenceGate::new()),
            });
            *slot = Some(PollTask::spawn("driver_location", self.location_every, job));
            info!(order_id = %self.order_id, "Driver accepted, tracking location");
        } else if !accepted {
            if let Some(task) = slot.take() {
                drop(task);
                info!(order_id = %self.order_id, "Location tracking stopped");
            }
        }
    }

    fn take_location_task(&self) -> Option<PollTask> {
        lock(&self.location_task).take()
    }
}

struct OrderJob<S> {
    shared: Arc<Shared<S>>,
    gate: Mutex<SequenceGate>,
}

#[async_trait]
impl<S: TrackingSource> PollJob for OrderJob<S> {
    /// The assignment result is kept apart so a failed assignment read does not hide a
    /// fresh order.
    type Output = (OrderView, Result<Option<DeliveryAssignment>, SourceError>);

    fn begin(&self, manual: bool) -> Option<u64> {
        if !manual && self.shared.state.borrow().not_found {
            return None;
        }
        Some(lock(&self.gate).issue())
    }

    async fn fetch(&self) -> Result<Self::Output, SourceError> {
        let id = self.shared.order_id;
        let (order, assignment) = tokio::join!(
            self.shared.source.fetch_order(id),
            self.shared.source.fetch_assignment(id)
        );
        Ok((order?, assignment))
    }

    fn finish(&self, seq: u64, result: Result<Self::Output, SourceError>) {
        if !lock(&self.gate).accept(seq) {
            debug!(order_id = %self.shared.order_id, seq, "Stale response discarded");
            return;
        }

        match result {
            Ok((order, Err(e))) => {
                warn!(order_id = %self.shared.order_id, error = %e, "Assignment poll failed, keeping the last one");
                self.shared.state.send_modify(|state| {
                    state.order = Some(order);
                    state.error = None;
                    state.not_found = false;
                });
            }
            Ok((order, Ok(assignment))) => {
                let accepted = assignment
                    .as_ref()
                    .is_some_and(|a| a.status == AssignmentStatus::Accepted);
                self.shared.state.send_modify(|state| {
                    state.order = Some(order);
                    state.assignment = assignment;
                    state.error = None;
                    state.not_found = false;
                    if !accepted {
                        state.location = None;
                    }
                });
                self.shared.sync_location_loop(accepted);
            }
            Err(SourceError::NotFound) => {
                info!(order_id = %self.shared.order_id, "Order not found");
                self.shared.state.send_modify(|state| {
                    *state = TrackingState {
                        not_found: true,
                        ..TrackingState::default()
                    };
                });
                self.shared.sync_location_loop(false);
            }
            Err(e) => {
                warn!(order_id = %self.shared.order_id, error = %e, "Tracking poll failed");
                self.shared.state.send_if_modified(|state| {
                    if state.order.is_some() {
                        return false;
                    }
                    state.error = Some(e.to_string());
                    true
                });
            }
        }
    }
}

struct LocationJob<S> {
    shared: Arc<Shared<S>>,
    gate: Mutex<SequenceGate>,
}

#[async_trait]
impl<S: TrackingSource> PollJob for LocationJob<S> {
    type Output = Option<DriverLocation>;

    fn begin(&self, _manual: bool) -> Option<u64> {
        Some(lock(&self.gate).issue())
    }

    async fn fetch(&self) -> Result<Self::Output, SourceError> {
        self.shared
            .source
            .fetch_driver_location(self.shared.order_id)
            .await
    }

    fn finish(&self, seq: u64, result: Result<Self::Output, SourceError>) {
        if !lock(&self.gate).accept(seq) {
            return;
        }
        match result {
            Ok(location) => {
                self.shared.state.send_if_modified(|state| {
                    if state.location == location {
                        return false;
                    }
                    state.location = location;
                    true
                });
            }
            Err(e) => debug!(order_id = %self.shared.order_id, error = %e, "Location poll failed"),
        }
    }
}

/// The customer tracking page for one order. Dropping it stops both loops.
pub struct TrackingView<S: TrackingSource> {
    shared: Arc<Shared<S>>,
    order_task: Option<PollTask>,
    state: watch::Receiver<TrackingState>,
}

impl<S: TrackingSource> TrackingView<S> {
    pub fn spawn(source: Arc<S>, order_id: OrderId, config: &PollConfig) -> Self {
        let (state_tx, state) = watch::channel(TrackingState::default());
        let shared = Arc::new(Shared {
            source,
            order_id,
            location_every: config.location_every,
            state: state_tx,
            location_task: Mutex::new(None),
            closed: AtomicBool::new(false),
        });
        let job = Arc::new(OrderJob {
            shared: shared.clone(),
            gate: Mutex::new(SequenceGate::new()),
        });
        let order_task = PollTask::spawn("tracking", config.order_every, job);
        Self {
            shared,
            order_task: Some(order_task),
            state,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackingState> {
        self.state.clone()
    }

    /// True while the location loop is running.
    pub fn is_tracking_location(&self) -> bool {
        lock(&self.shared.location_task).is_some()
    }

    pub fn refresh(&self) {
        if let Some(task) = &self.order_task {
            task.trigger();
        }
    }

    pub async fn stop(mut self) {
        self.shared.closed.store(true, Ordering::Release);
        if let Some(task) = self.order_task.take() {
            task.stop().await;
        }
        if let Some(task) = self.shared.take_location_task() {
            task.stop().await;
        }
    }
}

impl<S: TrackingSource> Drop for TrackingView<S> {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        drop(self.order_task.take());
        drop(self.shared.take_location_task());
    }
}
