//! Scripted [`TrackingSource`] for view tests.

use super::{SourceError, TrackingSource};
use crate::model::{
    AssignmentId, AssignmentStatus, DeliveryAssignment, DriverLocation, GeoPoint,
    NormalizedStatus, OrderId, OrderStatus, OrderView,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type Step<T> = (Duration, Result<T, SourceError>);

/// Answers from per-call queues, falling back to a fixed answer once a queue is empty.
pub(crate) struct FakeSource {
    order_steps: Mutex<VecDeque<Step<OrderView>>>,
    order: Mutex<Result<OrderView, SourceError>>,
    assignment: Mutex<Result<Option<DeliveryAssignment>, SourceError>>,
    location: Mutex<Result<Option<DriverLocation>, SourceError>>,
    update: Mutex<Step<OrderView>>,
    pub order_calls: AtomicUsize,
    pub location_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(order: Result<OrderView, SourceError>) -> Self {
        let update = order.clone();
        Self {
            order_steps: Mutex::new(VecDeque::new()),
            order: Mutex::new(order),
            assignment: Mutex::new(Ok(None)),
            location: Mutex::new(Ok(None)),
            update: Mutex::new((Duration::ZERO, update)),
            order_calls: AtomicUsize::new(0),
            location_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    pub fn push_order(&self, delay: Duration, result: Result<OrderView, SourceError>) {
        self.order_steps.lock().unwrap().push_back((delay, result));
    }

    pub fn set_order(&self, result: Result<OrderView, SourceError>) {
        *self.order.lock().unwrap() = result;
    }

    pub fn set_assignment(&self, result: Result<Option<DeliveryAssignment>, SourceError>) {
        *self.assignment.lock().unwrap() = result;
    }

    pub fn set_location(&self, result: Result<Option<DriverLocation>, SourceError>) {
        *self.location.lock().unwrap() = result;
    }

    pub fn set_update(&self, delay: Duration, result: Result<OrderView, SourceError>) {
        *self.update.lock().unwrap() = (delay, result);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackingSource for FakeSource {
    async fn fetch_order(&self, _id: OrderId) -> Result<OrderView, SourceError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.order_steps.lock().unwrap().pop_front();
        match step {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => self.order.lock().unwrap().clone(),
        }
    }

    async fn fetch_assignment(
        &self,
        _order_id: OrderId,
    ) -> Result<Option<DeliveryAssignment>, SourceError> {
        self.assignment.lock().unwrap().clone()
    }

    async fn fetch_driver_location(
        &self,
        _order_id: OrderId,
    ) -> Result<Option<DriverLocation>, SourceError> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        self.location.lock().unwrap().clone()
    }

    async fn update_status(
        &self,
        _id: OrderId,
        _status: &str,
        _expected_version: Option<u64>,
    ) -> Result<OrderView, SourceError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = self.update.lock().unwrap().clone();
        tokio::time::sleep(delay).await;
        result
    }
}

pub(crate) fn order_view(id: u32, status: OrderStatus, version: u64) -> OrderView {
    let now = Utc::now();
    OrderView {
        id: OrderId(id),
        items: Vec::new(),
        total: 12.0,
        status: NormalizedStatus::Canonical(status),
        customer_info: None,
        created_at: now,
        updated_at: now,
        created_from: None,
        version,
    }
}

pub(crate) fn assignment(order: u32, status: AssignmentStatus) -> DeliveryAssignment {
    DeliveryAssignment {
        id: AssignmentId(1),
        order_id: OrderId(order),
        status,
        assigned_at: Utc::now(),
        accepted_at: None,
        completed_at: None,
        driver_name: "Marta".to_string(),
        driver_phone: "555-0101".to_string(),
        delivery_location: Some(GeoPoint { lat: 19.4, lng: -99.1 }),
        location_updated_at: None,
    }
}

pub(crate) fn location(lat: f64) -> DriverLocation {
    DriverLocation {
        lat,
        lng: -99.1,
        driver_name: "Marta".to_string(),
        driver_phone: "555-0101".to_string(),
        last_update: None,
    }
}
