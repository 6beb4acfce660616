//! Error types for the Delivery actor.

use crate::model::{AssignmentStatus, OrderId};
use thiserror::Error;

/// Errors that can occur during assignment operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    /// The requested assignment was not found.
    #[error("Assignment not found: {0}")]
    NotFound(String),

    /// Dispatch referenced an order the store does not have.
    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    /// Dispatch tried to assign a driver to a pickup order.
    #[error("Order {0} is a pickup order")]
    PickupOrder(OrderId),

    /// The driver app requested a move the assignment cannot make.
    #[error("Invalid assignment transition: {from} -> {to}")]
    InvalidTransition {
        from: AssignmentStatus,
        to: AssignmentStatus,
    },

    /// Location reports stop once the delivery is completed.
    #[error("Assignment {0} is already completed")]
    AlreadyCompleted(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for DeliveryError {
    fn from(msg: String) -> Self {
        DeliveryError::ActorCommunicationError(msg)
    }
}
