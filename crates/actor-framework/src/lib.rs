//! # Actor Framework
//!
//! Resource actors on Tokio: every stored entity type gets one task that owns its rows
//! and applies requests sequentially, plus a cloneable client that talks to it over a
//! channel. The order store of the coordinator (orders, delivery assignments) is built
//! from these pieces.
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]) - the row type and its validation hooks
//! 2. **Runtime** ([`ResourceActor`]) - the message loop that owns the rows
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]) - typed requests and replies
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task.
//! - Requests to one actor are applied one at a time, in arrival order, so concurrent
//!   writers to the same row never interleave inside a hook.
//! - Different actors run in parallel.
//!
//! ## Context Injection
//!
//! Dependencies reach an actor through `run(context)`, not `new()`. Actors can be created
//! first and wired afterwards, which keeps construction free of ordering constraints.
//!
//! ```rust
//! use actor_framework::{ActorEntity, ResourceActor, ResourceClient};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Driver { id: u32 }
//! #[derive(Debug)] struct DriverCreate;
//! #[derive(Debug)] struct DriverUpdate;
//! #[derive(Debug)] enum DriverAction {}
//! #[derive(Debug, thiserror::Error)] #[error("driver")] struct DriverError;
//!
//! #[async_trait]
//! impl ActorEntity for Driver {
//!     type Id = u32; type Create = DriverCreate; type Update = DriverUpdate;
//!     type Action = DriverAction; type ActionResult = (); type Context = (); type Error = DriverError;
//!     fn from_create_params(id: u32, _: DriverCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
//!     async fn on_update(&mut self, _: DriverUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: DriverAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[derive(Clone, Debug)] struct Trip { id: u32, driver: u32 }
//! #[derive(Debug)] struct TripCreate { driver: u32 }
//! #[derive(Debug)] struct TripUpdate;
//! #[derive(Debug)] enum TripAction {}
//! #[derive(Debug, thiserror::Error)] #[error("unknown driver")] struct TripError;
//!
//! #[async_trait]
//! impl ActorEntity for Trip {
//!     type Id = u32; type Create = TripCreate; type Update = TripUpdate;
//!     type Action = TripAction; type ActionResult = ();
//!     type Context = ResourceClient<Driver>;
//!     type Error = TripError;
//!     fn from_create_params(id: u32, p: TripCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, driver: p.driver })
//!     }
//!     async fn on_create(&mut self, drivers: &ResourceClient<Driver>) -> Result<(), Self::Error> {
//!         match drivers.get(self.driver).await {
//!             Ok(Some(_)) => Ok(()),
//!             _ => Err(TripError),
//!         }
//!     }
//!     async fn on_update(&mut self, _: TripUpdate, _: &ResourceClient<Driver>) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: TripAction, _: &ResourceClient<Driver>) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (driver_actor, drivers) = ResourceActor::<Driver>::new(10);
//!     let (trip_actor, trips) = ResourceActor::<Trip>::new(10);
//!
//!     tokio::spawn(driver_actor.run(()));
//!     tokio::spawn(trip_actor.run(drivers.clone()));
//!
//!     let driver = drivers.create(DriverCreate).await.unwrap();
//!     assert!(trips.create(TripCreate { driver }).await.is_ok());
//!     assert!(trips.create(TripCreate { driver: 99 }).await.is_err());
//! }
//! ```
//!
//! ## Testing
//!
//! See [`mock`] for clients that answer from queued expectations instead of a real actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
