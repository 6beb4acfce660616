//! Where pollers get their data from.
//!
//! Views only see [`TrackingSource`]. [`LocalSource`] reads the actors in-process;
//! [`HttpSource`](crate::api::HttpSource) goes through the HTTP contract.

use crate::clients::{DeliveryClient, OrderClient};
use crate::delivery_actor::DeliveryError;
use crate::model::{DeliveryAssignment, DriverLocation, OrderId, OrderView};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of one fetch or write, as a view sees it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("not found")]
    NotFound,
    /// The store answered and refused the request. Carries a human-readable message.
    #[error("{0}")]
    Rejected(String),
    /// The store could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<OrderError> for SourceError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => SourceError::NotFound,
            OrderError::ActorCommunicationError(msg) => SourceError::Transport(msg),
            other => SourceError::Rejected(other.to_string()),
        }
    }
}

impl From<DeliveryError> for SourceError {
    fn from(e: DeliveryError) -> Self {
        match e {
            DeliveryError::NotFound(_) => SourceError::NotFound,
            DeliveryError::ActorCommunicationError(msg) => SourceError::Transport(msg),
            other => SourceError::Rejected(other.to_string()),
        }
    }
}

/// Read and write operations the views depend on.
#[async_trait]
pub trait TrackingSource: Send + Sync + 'static {
    async fn fetch_order(&self, id: OrderId) -> Result<OrderView, SourceError>;

    async fn fetch_assignment(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DeliveryAssignment>, SourceError>;

    async fn fetch_driver_location(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DriverLocation>, SourceError>;

    async fn update_status(
        &self,
        id: OrderId,
        status: &str,
        expected_version: Option<u64>,
    ) -> Result<OrderView, SourceError>;
}

/// In-process source over the actor clients.
#[derive(Clone)]
pub struct LocalSource {
    orders: OrderClient,
    deliveries: DeliveryClient,
}

impl LocalSource {
    pub fn new(orders: OrderClient, deliveries: DeliveryClient) -> Self {
        Self { orders, deliveries }
    }
}

#[async_trait]
impl TrackingSource for LocalSource {
    async fn fetch_order(&self, id: OrderId) -> Result<OrderView, SourceError> {
        Ok(self.orders.get_order(id).await?)
    }

    async fn fetch_assignment(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DeliveryAssignment>, SourceError> {
        Ok(self.deliveries.active_assignment(order_id).await?)
    }

    async fn fetch_driver_location(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DriverLocation>, SourceError> {
        Ok(self.deliveries.driver_location(order_id).await?)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: &str,
        expected_version: Option<u64>,
    ) -> Result<OrderView, SourceError> {
        Ok(self.orders.set_status(id, status, expected_version).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderStatus;

    #[test]
    fn test_order_errors_map_to_source_errors() {
        assert_eq!(
            SourceError::from(OrderError::NotFound("order_1".into())),
            SourceError::NotFound
        );
        assert_eq!(
            SourceError::from(OrderError::ActorCommunicationError("closed".into())),
            SourceError::Transport("closed".into())
        );
        let illegal = SourceError::from(OrderError::IllegalTransition {
            from: OrderStatus::Entregado,
            to: OrderStatus::Pendiente,
        });
        assert_eq!(
            illegal,
            SourceError::Rejected("Illegal status transition: entregado -> pendiente".into())
        );
    }
}
