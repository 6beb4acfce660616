use crate::clients::{DeliveryClient, OrderClient};
use crate::config::CoordinatorConfig;
use crate::model::OrderId;
use crate::polling::{LocalSource, OrderDetailView, PollConfig, StatusSubmitter, TrackingView};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Starts and stops the two actors behind the coordinator.
///
/// The delivery actor validates new assignments against the order actor, so it runs with
/// a clone of the [`OrderClient`] as its context.
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new();
///
/// let order_id = system.order_client.create_order(params).await?;
/// system.order_client.set_status(order_id, "preparando", None).await?;
///
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub delivery_client: DeliveryClient,

    /// Periods and backoff for the views this system hands out.
    poll: PollConfig,
    status_cooldown: Duration,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for OrderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderSystem {
    /// Spawns both actors with the default channel size.
    pub fn new() -> Self {
        Self::with_buffer(32)
    }

    /// Spawns both actors, each with a request channel of `buffer_size`. Views use the
    /// default periods and a 2s status cooldown.
    pub fn with_buffer(buffer_size: usize) -> Self {
        Self::start(buffer_size, PollConfig::default(), Duration::from_secs(2))
    }

    /// Spawns both actors with the buffer, poll periods and cooldown of `config`.
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self::start(
            config.actor_buffer,
            config.poll_config(),
            config.status_cooldown,
        )
    }

    fn start(buffer_size: usize, poll: PollConfig, status_cooldown: Duration) -> Self {
        // 1. Create actors (no dependencies)
        let (order_actor, orders) = crate::order_actor::new(buffer_size);
        let (delivery_actor, assignments) = crate::delivery_actor::new(buffer_size);
        let order_client = OrderClient::new(orders);
        let delivery_client = DeliveryClient::new(assignments);

        // 2. Start actors with injected context
        let order_handle = tokio::spawn(order_actor.run(()));
        let delivery_handle = tokio::spawn(delivery_actor.run(order_client.clone()));

        info!(buffer_size, ?poll, ?status_cooldown, "Order system started");
        Self {
            order_client,
            delivery_client,
            poll,
            status_cooldown,
            handles: vec![delivery_handle, order_handle],
        }
    }

    /// A [`TrackingSource`](crate::polling::TrackingSource) that reads these actors directly.
    pub fn source(&self) -> LocalSource {
        LocalSource::new(self.order_client.clone(), self.delivery_client.clone())
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll
    }

    /// Admin detail screen for one order, polling at the configured period.
    pub fn order_detail(&self, order_id: OrderId) -> OrderDetailView<LocalSource> {
        OrderDetailView::spawn(Arc::new(self.source()), order_id, &self.poll)
    }

    /// Customer tracking page for one order.
    pub fn tracking(&self, order_id: OrderId) -> TrackingView<LocalSource> {
        TrackingView::spawn(Arc::new(self.source()), order_id, &self.poll)
    }

    /// Admin status submitter with the configured cooldown.
    pub fn status_submitter(&self) -> StatusSubmitter<LocalSource> {
        StatusSubmitter::new(Arc::new(self.source()), self.status_cooldown)
    }

    /// Drops the system's clients and waits for both actors to exit.
    ///
    /// Actors only stop once every clone of their client is gone, so views, sources and
    /// servers built from this system must be dropped first. The delivery actor holds an
    /// order client, so it is awaited before the order actor.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down order system");

        drop(self.order_client);
        drop(self.delivery_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Order system shutdown complete");
        Ok(())
    }
}
