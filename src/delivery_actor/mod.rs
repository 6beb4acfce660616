//! # Delivery Actor
//!
//! Owns every [`DeliveryAssignment`]. Dispatch creates rows, the driver app moves them
//! forward with [`AssignmentAction`]s, and the tracking page only reads them.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`DeliveryAssignment`]
//! - [`actions`] - [`AssignmentAction`] and [`AssignmentActionResult`]
//! - [`error`] - [`DeliveryError`]
//! - [`new()`] - factory for the actor and its generic client
//!
//! ## Dependencies
//!
//! The actor runs with an [`OrderClient`](crate::clients::OrderClient) as its context, so
//! it must be started after the order actor:
//!
//! ```rust,ignore
//! let (order_actor, orders) = order_actor::new(32);
//! let (delivery_actor, assignments) = delivery_actor::new(32);
//! let orders = OrderClient::new(orders);
//!
//! tokio::spawn(order_actor.run(()));
//! tokio::spawn(delivery_actor.run(orders.clone()));
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::DeliveryAssignment;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Delivery actor and its client.
pub fn new(
    buffer_size: usize,
) -> (
    ResourceActor<DeliveryAssignment>,
    ResourceClient<DeliveryAssignment>,
) {
    ResourceActor::new(buffer_size)
}
