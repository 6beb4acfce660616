//! # System Lifecycle
//!
//! Creating, wiring and stopping the actors. [`OrderSystem`] is the only entry point:
//!
//! 1. **Create** the order and delivery actors with their generic clients.
//! 2. **Wire** dependencies at `run(context)` time. The delivery actor gets an
//!    [`OrderClient`](crate::clients::OrderClient) so dispatch can only assign drivers to
//!    existing delivery orders.
//! 3. **Shut down** by dropping every client. Each actor leaves its loop when its channel
//!    closes; the dependency graph is acyclic, so no explicit stop message is needed.
//!
//! Tracing is set up by the binary through
//! [`actor_framework::tracing::setup_tracing`], before the system is created.

pub mod order_system;

pub use order_system::*;
