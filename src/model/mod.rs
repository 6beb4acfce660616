//! Data types of the coordinator. [`Order`] and [`DeliveryAssignment`] implement
//! [`ActorEntity`](actor_framework::ActorEntity); everything else is plain data.

pub mod assignment;
pub mod order;
pub mod status;

pub use assignment::*;
pub use order::*;
pub use status::*;
