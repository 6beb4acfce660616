//! JSON bodies of the HTTP contract.
//!
//! Every response carries `success`. Anything but `success: true` is a failure, and
//! failures carry a human-readable `error`.

use crate::model::{DeliveryAssignment, DriverLocation, GeoPoint, OrderView};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /orders/{id}` and `PUT /orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderEnvelope {
    pub fn ok(order: OrderView) -> Self {
        Self {
            success: true,
            order: Some(order),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            order: None,
            error: Some(error.into()),
        }
    }
}

/// Body of `PUT /orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    /// Missing and `null` read as the empty status, which the store rejects.
    #[serde(default)]
    pub status: Option<String>,
    /// Version from the caller's last read; omit for last-write-wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// `GET /delivery/assignments?order_id={id}`. Most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub assignments: Vec<DeliveryAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /driver/location?orderId={id}`. Without an accepted assignment this is a
/// success with no `location`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Option<DriverLocation>> for LocationEnvelope {
    fn from(location: Option<DriverLocation>) -> Self {
        match location {
            Some(l) => Self {
                success: true,
                location: Some(GeoPoint {
                    lat: l.lat,
                    lng: l.lng,
                }),
                driver_name: Some(l.driver_name),
                driver_phone: Some(l.driver_phone),
                last_update: l.last_update,
                error: None,
            },
            None => Self {
                success: true,
                ..Self::default()
            },
        }
    }
}

impl LocationEnvelope {
    /// Back to the model type; `None` when no location was sent.
    pub fn into_location(self) -> Option<DriverLocation> {
        let point = self.location?;
        Some(DriverLocation {
            lat: point.lat,
            lng: point.lng,
            driver_name: self.driver_name.unwrap_or_default(),
            driver_phone: self.driver_phone.unwrap_or_default(),
            last_update: self.last_update,
        })
    }
}
