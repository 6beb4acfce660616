//! # Delivery Client
//!
//! Delivery Assignment Tracker. The read side (`active_assignment`, `driver_location`,
//! `assignments_for`) serves the tracking page; `assign`, `accept`, `complete` and
//! `report_location` are the dispatch and driver-app contract it relies on.
use crate::delivery_actor::{AssignmentAction, AssignmentActionResult, DeliveryError};
use crate::model::{
    most_recent, AssignmentCreate, AssignmentId, DeliveryAssignment, DriverLocation, GeoPoint,
    OrderId,
};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use std::cmp::Reverse;
use tracing::{debug, info, instrument};

/// Client for interacting with the Delivery actor.
#[derive(Clone)]
pub struct DeliveryClient {
    inner: ResourceClient<DeliveryAssignment>,
}

#[async_trait]
impl ActorClient<DeliveryAssignment> for DeliveryClient {
    type Error = DeliveryError;

    fn inner(&self) -> &ResourceClient<DeliveryAssignment> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => DeliveryError::NotFound(id),
            other => other
                .downcast_entity::<DeliveryError>()
                .unwrap_or_else(|e| DeliveryError::ActorCommunicationError(e.to_string())),
        }
    }
}

impl DeliveryClient {
    pub fn new(inner: ResourceClient<DeliveryAssignment>) -> Self {
        Self { inner }
    }

    /// Attach a driver to an order. The new assignment is `pending`.
    #[instrument(skip(self))]
    pub async fn assign(&self, params: AssignmentCreate) -> Result<AssignmentId, DeliveryError> {
        debug!("Sending request");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(assignment_id = %id, "Driver assigned");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn accept(&self, id: AssignmentId) -> Result<DeliveryAssignment, DeliveryError> {
        match self.act(id, AssignmentAction::Accept).await? {
            AssignmentActionResult::Accept(assignment) => Ok(assignment),
            _ => unreachable!("Accept action must return Accept result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: AssignmentId) -> Result<DeliveryAssignment, DeliveryError> {
        match self.act(id, AssignmentAction::Complete).await? {
            AssignmentActionResult::Complete(assignment) => Ok(assignment),
            _ => unreachable!("Complete action must return Complete result"),
        }
    }

    #[instrument(skip(self))]
    pub async fn report_location(
        &self,
        id: AssignmentId,
        point: GeoPoint,
    ) -> Result<DeliveryAssignment, DeliveryError> {
        match self.act(id, AssignmentAction::ReportLocation(point)).await? {
            AssignmentActionResult::ReportLocation(assignment) => Ok(assignment),
            _ => unreachable!("ReportLocation action must return ReportLocation result"),
        }
    }

    /// Every assignment of an order, most recent first.
    #[instrument(skip(self))]
    pub async fn assignments_for(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<DeliveryAssignment>, DeliveryError> {
        let mut assignments: Vec<_> = self
            .list()
            .await?
            .into_iter()
            .filter(|a| a.order_id == order_id)
            .collect();
        assignments.sort_by_key(|a| Reverse(a.recency_key()));
        debug!(count = assignments.len(), "Assignments");
        Ok(assignments)
    }

    /// The most recent assignment of an order, if it has one.
    #[instrument(skip(self))]
    pub async fn active_assignment(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DeliveryAssignment>, DeliveryError> {
        let assignments = self.list().await?;
        Ok(most_recent(assignments.iter().filter(|a| a.order_id == order_id)).cloned())
    }

    /// Where the driver is, but only while the active assignment is `accepted`.
    #[instrument(skip(self))]
    pub async fn driver_location(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DriverLocation>, DeliveryError> {
        Ok(self
            .active_assignment(order_id)
            .await?
            .and_then(|a| a.driver_location()))
    }

    async fn act(
        &self,
        id: AssignmentId,
        action: AssignmentAction,
    ) -> Result<AssignmentActionResult, DeliveryError> {
        debug!(?action, "Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssignmentStatus;
    use actor_framework::mock::{create_mock_client, expect_action, MockClient};
    use chrono::{Duration, Utc};

    fn row(id: u32, order: u32, status: AssignmentStatus, minutes_ago: i64) -> DeliveryAssignment {
        DeliveryAssignment {
            id: AssignmentId(id),
            order_id: OrderId(order),
            status,
            assigned_at: Utc::now() - Duration::minutes(minutes_ago),
            accepted_at: None,
            completed_at: None,
            driver_name: format!("driver {id}"),
            driver_phone: "555".to_string(),
            delivery_location: Some(GeoPoint { lat: 4.0, lng: 5.0 }),
            location_updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_active_assignment_is_most_recent_for_the_order() {
        let mut mock = MockClient::<DeliveryAssignment>::new();
        mock.expect_list().return_ok(vec![
            row(1, 7, AssignmentStatus::Completed, 30),
            row(2, 8, AssignmentStatus::Pending, 1),
            row(3, 7, AssignmentStatus::Accepted, 5),
        ]);
        let client = DeliveryClient::new(mock.client());

        let active = client.active_assignment(OrderId(7)).await.unwrap().unwrap();
        assert_eq!(active.id, AssignmentId(3));
        mock.verify();
    }

    #[tokio::test]
    async fn test_driver_location_is_gated_on_acceptance() {
        let mut mock = MockClient::<DeliveryAssignment>::new();
        mock.expect_list()
            .return_ok(vec![row(1, 7, AssignmentStatus::Pending, 1)]);
        mock.expect_list()
            .return_ok(vec![row(1, 7, AssignmentStatus::Accepted, 1)]);
        mock.expect_list()
            .return_ok(vec![row(1, 7, AssignmentStatus::Completed, 1)]);
        mock.expect_list().return_ok(vec![]);
        let client = DeliveryClient::new(mock.client());

        assert!(client.driver_location(OrderId(7)).await.unwrap().is_none());
        let location = client.driver_location(OrderId(7)).await.unwrap().unwrap();
        assert_eq!((location.lat, location.lng), (4.0, 5.0));
        assert!(client.driver_location(OrderId(7)).await.unwrap().is_none());
        assert!(client.driver_location(OrderId(7)).await.unwrap().is_none());
        mock.verify();
    }

    #[tokio::test]
    async fn test_accept_sends_action_and_returns_row() {
        let (generic, mut receiver) = create_mock_client::<DeliveryAssignment>(10);
        let client = DeliveryClient::new(generic);

        let task = tokio::spawn(async move { client.accept(AssignmentId(3)).await });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, AssignmentId(3));
        assert!(matches!(action, AssignmentAction::Accept));
        responder
            .send(Ok(AssignmentActionResult::Accept(row(
                3,
                7,
                AssignmentStatus::Accepted,
                0,
            ))))
            .unwrap();

        let accepted = task.await.unwrap().unwrap();
        assert_eq!(accepted.status, AssignmentStatus::Accepted);
    }

    #[tokio::test]
    async fn test_rejected_action_keeps_its_type() {
        let mut mock = MockClient::<DeliveryAssignment>::new();
        mock.expect_action(AssignmentId(1))
            .return_err(FrameworkError::EntityError(Box::new(
                DeliveryError::AlreadyCompleted("assignment_1".to_string()),
            )));
        let client = DeliveryClient::new(mock.client());

        let err = client
            .report_location(AssignmentId(1), GeoPoint { lat: 0.0, lng: 0.0 })
            .await
            .unwrap_err();
        assert_eq!(err, DeliveryError::AlreadyCompleted("assignment_1".to_string()));
    }
}
