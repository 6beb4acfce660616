/// Delivery assignments: the link between an order and the driver delivering it.
///
/// # Actor Framework
/// [`DeliveryAssignment`] implements [`ActorEntity`](actor_framework::ActorEntity) (see
/// [`crate::delivery_actor::entity`]). Dispatch creates rows, the driver app moves them
/// through `pending -> accepted -> completed` with
/// [`AssignmentAction`](crate::delivery_actor::AssignmentAction)s.
use crate::model::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for delivery assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub u32);

impl From<u32> for AssignmentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for AssignmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assignment_{}", self.0)
    }
}

/// Driver-facing status, unrelated to the order status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Completed,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Completed => "completed",
        }
    }
}

impl Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAssignment {
    pub id: AssignmentId,
    pub order_id: OrderId,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Driver identity as it was when dispatch created the row.
    pub driver_name: String,
    pub driver_phone: String,
    pub delivery_location: Option<GeoPoint>,
    pub location_updated_at: Option<DateTime<Utc>>,
}

/// Payload dispatch uses to assign a driver to an order.
#[derive(Debug, Clone)]
pub struct AssignmentCreate {
    pub order_id: OrderId,
    pub driver_name: String,
    pub driver_phone: String,
}

impl AssignmentCreate {
    pub fn new(order_id: OrderId, driver_name: impl Into<String>, driver_phone: impl Into<String>) -> Self {
        Self {
            order_id,
            driver_name: driver_name.into(),
            driver_phone: driver_phone.into(),
        }
    }
}

/// Latest known driver position, as shown on the tracking page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLocation {
    pub lat: f64,
    pub lng: f64,
    pub driver_name: String,
    pub driver_phone: String,
    pub last_update: Option<DateTime<Utc>>,
}

impl DeliveryAssignment {
    pub(crate) fn new(id: AssignmentId, params: AssignmentCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            order_id: params.order_id,
            status: AssignmentStatus::Pending,
            assigned_at: now,
            accepted_at: None,
            completed_at: None,
            driver_name: params.driver_name,
            driver_phone: params.driver_phone,
            delivery_location: None,
            location_updated_at: None,
        }
    }

    /// Ordering key for "most recent": latest `assigned_at`, then highest id.
    pub fn recency_key(&self) -> (DateTime<Utc>, u32) {
        (self.assigned_at, self.id.0)
    }

    /// The driver's position, only while the assignment is `accepted`.
    ///
    /// Before acceptance and after completion a stored location is stale for the
    /// customer, so nothing is returned even if one exists.
    pub fn driver_location(&self) -> Option<DriverLocation> {
        if self.status != AssignmentStatus::Accepted {
            return None;
        }
        let point = self.delivery_location?;
        Some(DriverLocation {
            lat: point.lat,
            lng: point.lng,
            driver_name: self.driver_name.clone(),
            driver_phone: self.driver_phone.clone(),
            last_update: self.location_updated_at,
        })
    }
}

/// The most recent assignment among `assignments`, if any.
pub fn most_recent<'a>(
    assignments: impl IntoIterator<Item = &'a DeliveryAssignment>,
) -> Option<&'a DeliveryAssignment> {
    assignments.into_iter().max_by_key(|a| a.recency_key())
}
