//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient).

pub mod delivery_client;
pub mod order_client;

pub use delivery_client::*;
pub use order_client::*;
