//! Driver-app operations on a [`DeliveryAssignment`](crate::model::DeliveryAssignment).
//!
//! Handled by [`ActorEntity::handle_action`](actor_framework::ActorEntity::handle_action)
//! in [`super::entity`].

use crate::model::{DeliveryAssignment, GeoPoint};

#[derive(Debug, Clone)]
pub enum AssignmentAction {
    /// `pending -> accepted`, stamps `accepted_at`.
    Accept,
    /// `accepted -> completed`, stamps `completed_at`.
    Complete,
    /// Stores the driver's last known position.
    ///
    /// # Errors
    /// Fails once the assignment is completed.
    ReportLocation(GeoPoint),
}

/// Results from AssignmentActions - variants match 1:1 with AssignmentAction.
/// Each carries the row as it is after the action.
#[derive(Debug, Clone)]
pub enum AssignmentActionResult {
    Accept(DeliveryAssignment),
    Complete(DeliveryAssignment),
    ReportLocation(DeliveryAssignment),
}
