//! [`ActorEntity`] implementation for [`DeliveryAssignment`].
//!
//! The assignment actor depends on the order actor: `on_create` looks the order up
//! through the injected [`OrderClient`] before a driver can be attached to it.

use super::actions::{AssignmentAction, AssignmentActionResult};
use super::error::DeliveryError;
use crate::clients::OrderClient;
use crate::model::{AssignmentCreate, AssignmentId, AssignmentStatus, DeliveryAssignment};
use crate::order_actor::OrderError;
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

#[async_trait]
impl ActorEntity for DeliveryAssignment {
    type Id = AssignmentId;
    type Create = AssignmentCreate;
    type Update = ();
    type Action = AssignmentAction;
    type ActionResult = AssignmentActionResult;
    type Context = OrderClient;
    type Error = DeliveryError;

    /// New assignments always start `pending`.
    fn from_create_params(
        id: AssignmentId,
        params: AssignmentCreate,
    ) -> Result<Self, DeliveryError> {
        Ok(DeliveryAssignment::new(id, params, Utc::now()))
    }

    /// The order must exist and must not be a pickup order.
    async fn on_create(&mut self, orders: &OrderClient) -> Result<(), DeliveryError> {
        let order = orders.get_order(self.order_id).await.map_err(|e| match e {
            OrderError::NotFound(_) => DeliveryError::UnknownOrder(self.order_id),
            other => DeliveryError::ActorCommunicationError(other.to_string()),
        })?;

        if order.is_pickup() {
            return Err(DeliveryError::PickupOrder(self.order_id));
        }
        debug!(order_id = %self.order_id, driver = %self.driver_name, "Order accepts a driver");
        Ok(())
    }

    async fn on_update(&mut self, _update: (), _ctx: &OrderClient) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: AssignmentAction,
        _ctx: &OrderClient,
    ) -> Result<AssignmentActionResult, DeliveryError> {
        let now = Utc::now();
        match action {
            AssignmentAction::Accept => {
                self.transition(AssignmentStatus::Pending, AssignmentStatus::Accepted)?;
                self.accepted_at = Some(now);
                info!(assignment_id = %self.id, order_id = %self.order_id, "Driver accepted");
                Ok(AssignmentActionResult::Accept(self.clone()))
            }
            AssignmentAction::Complete => {
                self.transition(AssignmentStatus::Accepted, AssignmentStatus::Completed)?;
                self.completed_at = Some(now);
                info!(assignment_id = %self.id, order_id = %self.order_id, "Delivery completed");
                Ok(AssignmentActionResult::Complete(self.clone()))
            }
            AssignmentAction::ReportLocation(point) => {
                if self.status == AssignmentStatus::Completed {
                    return Err(DeliveryError::AlreadyCompleted(self.id.to_string()));
                }
                self.delivery_location = Some(point);
                self.location_updated_at = Some(now);
                debug!(assignment_id = %self.id, lat = point.lat, lng = point.lng, "Location");
                Ok(AssignmentActionResult::ReportLocation(self.clone()))
            }
        }
    }
}

impl DeliveryAssignment {
    fn transition(
        &mut self,
        expected: AssignmentStatus,
        to: AssignmentStatus,
    ) -> Result<(), DeliveryError> {
        if self.status != expected {
            return Err(DeliveryError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoPoint, Order, OrderCreate, OrderId};
    use actor_framework::mock::MockClient;

    fn pending() -> DeliveryAssignment {
        DeliveryAssignment::from_create_params(
            AssignmentId(1),
            AssignmentCreate::new(OrderId(1), "Marta", "555-0101"),
        )
        .unwrap()
    }

    fn order(customer_info: Option<&str>) -> Order {
        let mut create = OrderCreate::raw("[]", 10.0);
        create.customer_info = customer_info.map(str::to_string);
        Order::from_create_params(OrderId(1), create).unwrap()
    }

    #[tokio::test]
    async fn test_accept_then_complete() {
        let mock = MockClient::<Order>::new();
        let orders = OrderClient::new(mock.client());
        let mut assignment = pending();

        assignment
            .handle_action(AssignmentAction::Accept, &orders)
            .await
            .unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Accepted);
        assert!(assignment.accepted_at.is_some());

        assignment
            .handle_action(AssignmentAction::Complete, &orders)
            .await
            .unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Completed);
        assert!(assignment.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_complete_requires_acceptance() {
        let mock = MockClient::<Order>::new();
        let orders = OrderClient::new(mock.client());
        let mut assignment = pending();

        let err = assignment
            .handle_action(AssignmentAction::Complete, &orders)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DeliveryError::InvalidTransition {
                from: AssignmentStatus::Pending,
                to: AssignmentStatus::Completed,
            }
        );
    }

    #[tokio::test]
    async fn test_location_reports_stop_after_completion() {
        let mock = MockClient::<Order>::new();
        let orders = OrderClient::new(mock.client());
        let mut assignment = pending();
        let point = GeoPoint { lat: 1.0, lng: 2.0 };

        // reports before acceptance are stored but not shown to customers
        assignment
            .handle_action(AssignmentAction::ReportLocation(point), &orders)
            .await
            .unwrap();
        assert_eq!(assignment.delivery_location, Some(point));
        assert!(assignment.driver_location().is_none());

        assignment.status = AssignmentStatus::Completed;
        let err = assignment
            .handle_action(AssignmentAction::ReportLocation(point), &orders)
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::AlreadyCompleted(_)));
    }

    #[tokio::test]
    async fn test_on_create_checks_the_order() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_get(OrderId(1)).return_ok(Some(order(None)));
        mock.expect_get(OrderId(1)).return_ok(None);
        mock.expect_get(OrderId(1))
            .return_ok(Some(order(Some(r#"{"name":"Ana","phone":"1","deliveryType":"pickup"}"#))));
        let orders = OrderClient::new(mock.client());

        assert!(pending().on_create(&orders).await.is_ok());
        assert_eq!(
            pending().on_create(&orders).await.unwrap_err(),
            DeliveryError::UnknownOrder(OrderId(1))
        );
        assert_eq!(
            pending().on_create(&orders).await.unwrap_err(),
            DeliveryError::PickupOrder(OrderId(1))
        );
        mock.verify();
    }
}
