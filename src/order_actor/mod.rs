//! # Order Actor
//!
//! The Order Store. One actor task owns every [`Order`] row; status writes are validated
//! in [`entity`] against the row's current state before they are applied.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Order`]
//! - [`error`] - [`OrderError`]
//! - [`new()`] - factory for the actor and its generic client
//!
//! ## Usage
//!
//! ```rust
//! use supernova_orders::clients::OrderClient;
//! use supernova_orders::model::OrderCreate;
//! use supernova_orders::order_actor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, generic_client) = order_actor::new(32);
//!     let client = OrderClient::new(generic_client);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create_order(OrderCreate::raw("[]", 12.5)).await?;
//!     let order = client.set_status(id, "preparando", None).await?;
//!     assert_eq!(order.status.as_str(), "preparando");
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::Order;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, ResourceClient<Order>) {
    ResourceActor::new(buffer_size)
}
