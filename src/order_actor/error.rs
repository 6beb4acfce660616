//! Error types for the Order actor.

use crate::model::{OrderStatus, UnknownStatusError};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// A status write carried an empty or blank value.
    #[error("Status must not be empty")]
    EmptyStatus,

    /// A status write carried text outside the canonical vocabulary.
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatusError),

    /// The transition table does not allow this move.
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// The row changed since the caller read it.
    #[error("Version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}
