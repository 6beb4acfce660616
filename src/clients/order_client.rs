//! # Order Client
//!
//! The Order Status Controller: the one place an order is read for display and the one
//! place its status is changed. Wraps a `ResourceClient<Order>`.
use crate::model::{Order, OrderCreate, OrderId, OrderStatus, OrderUpdate, OrderView};
use crate::order_actor::OrderError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Checkout write path. The payload is stored as given.
    #[instrument(skip(self, params))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "Sending request");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(order_id = %id, "Order created");
        Ok(id)
    }

    /// Fetch an order with its blobs parsed and its status normalized.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<OrderView, OrderError> {
        debug!("Sending request");
        self.get(id)
            .await?
            .map(|order| order.to_view())
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Change an order's status and return the updated order.
    ///
    /// `status` must be non-empty and resolve to a canonical status; the transition is
    /// then checked by the actor. Pass the `version` from the last read as
    /// `expected_version` to reject the write if someone else changed the order since.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: OrderId,
        status: &str,
        expected_version: Option<u64>,
    ) -> Result<OrderView, OrderError> {
        if status.trim().is_empty() {
            return Err(OrderError::EmptyStatus);
        }
        let status = OrderStatus::parse(status)?;

        debug!(%status, "Sending request");
        let order = self
            .inner
            .update(
                id,
                OrderUpdate {
                    status,
                    expected_version,
                },
            )
            .await
            .map_err(Self::map_error)?;
        Ok(order.to_view())
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => other
                .downcast_entity::<OrderError>()
                .unwrap_or_else(|e| OrderError::ActorCommunicationError(e.to_string())),
        }
    }
}
