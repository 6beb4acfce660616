//! # Supernova Orders
//!
//! Order status and delivery tracking coordinator for Supernova Burgers & Wings.
//!
//! Orders and delivery assignments each live in one resource actor (see the
//! `actor-framework` crate). Status writes are validated inside the order actor against
//! a closed status vocabulary and a forward-only transition table, and carry an optional
//! expected version for optimistic concurrency. Reads normalize legacy status text
//! leniently and never fail on malformed persisted data.
//!
//! ## Module Tour
//!
//! - [`model`] - order rows and views, the [`OrderStatus`](model::OrderStatus) vocabulary
//!   and normalizer, delivery assignments and driver locations.
//! - [`order_actor`], [`delivery_actor`] - the `ActorEntity` implementations.
//! - [`clients`] - [`OrderClient`](clients::OrderClient) (`get_order`, `set_status`) and
//!   [`DeliveryClient`](clients::DeliveryClient) (active assignment, driver location and
//!   the driver-app actions).
//! - [`lifecycle`] - [`OrderSystem`](lifecycle::OrderSystem) starts and stops the actors.
//! - [`polling`] - the admin detail screen, the customer tracking page and the admin
//!   status submitter, as cancellable poll loops.
//! - [`api`] - the HTTP contract (axum) and an HTTP-backed
//!   [`TrackingSource`](polling::TrackingSource) (reqwest).
//! - [`config`] - environment configuration.
//!
//! ## Running
//!
//! ```bash
//! SUPERNOVA_SEED_DEMO=true RUST_LOG=debug cargo run
//! curl localhost:8080/orders/1
//! ```

pub mod api;
pub mod clients;
pub mod config;
pub mod delivery_actor;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod polling;
