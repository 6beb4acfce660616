/// An order as persisted, plus the structured view handed to callers.
///
/// # Actor Framework
/// [`Order`] implements [`ActorEntity`](actor_framework::ActorEntity) (see
/// [`crate::order_actor::entity`]) and is owned by the order actor. It keeps `items` and
/// `customer_info` as the serialized text they were written with; [`Order::to_view`]
/// parses them, so raw text never leaves the store.
use crate::model::status::{normalize, NormalizedStatus, OrderStatus};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::warn;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Menu item ids arrive both as numbers and as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl OrderItem {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    #[default]
    Delivery,
    Pickup,
}

/// Customer blob captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// The persisted order row.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// JSON text of `Vec<OrderItem>`, possibly malformed in legacy rows.
    pub items: String,
    pub total: f64,
    /// Free text as stored. Only canonical spellings are written by status changes.
    pub status: String,
    /// JSON text of `CustomerInfo`.
    pub customer_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_from: Option<String>,
    /// Starts at 1, bumped by every effective status change.
    pub version: u64,
}

/// Payload for creating a new order (the checkout write path).
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub items: String,
    pub total: f64,
    pub status: Option<String>,
    pub customer_info: Option<String>,
    pub created_from: Option<String>,
}

impl OrderCreate {
    /// Serialize structured checkout data. `total` is the item subtotals plus `delivery_fee`.
    pub fn new(
        items: &[OrderItem],
        delivery_fee: f64,
        customer: Option<&CustomerInfo>,
    ) -> Result<Self, serde_json::Error> {
        let total = items.iter().map(OrderItem::subtotal).sum::<f64>() + delivery_fee;
        Ok(Self {
            items: serde_json::to_string(items)?,
            total,
            status: None,
            customer_info: customer.map(serde_json::to_string).transpose()?,
            created_from: None,
        })
    }

    /// A row exactly as some other writer stored it. Nothing is validated.
    pub fn raw(items: impl Into<String>, total: f64) -> Self {
        Self {
            items: items.into(),
            total,
            status: None,
            customer_info: None,
            created_from: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_customer_info(mut self, customer_info: impl Into<String>) -> Self {
        self.customer_info = Some(customer_info.into());
        self
    }

    pub fn created_from(mut self, origin: impl Into<String>) -> Self {
        self.created_from = Some(origin.into());
        self
    }
}

/// Status write applied by the order actor.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    /// When set, the write is rejected unless the row is still at this version.
    pub expected_version: Option<u64>,
}

/// What `get_order` returns: blobs parsed, status normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: NormalizedStatus,
    pub customer_info: Option<CustomerInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_from: Option<String>,
    pub version: u64,
}

impl OrderView {
    /// Pickup orders never get a delivery assignment. Orders without customer info
    /// are treated as deliveries.
    pub fn is_pickup(&self) -> bool {
        self.customer_info
            .as_ref()
            .is_some_and(|info| info.delivery_type == DeliveryType::Pickup)
    }
}

impl Order {
    pub(crate) fn new(id: OrderId, params: OrderCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            items: params.items,
            total: params.total,
            status: params
                .status
                .unwrap_or_else(|| OrderStatus::Pendiente.as_str().to_string()),
            customer_info: params.customer_info,
            created_at: now,
            updated_at: now,
            created_from: params.created_from,
            version: 1,
        }
    }

    pub fn normalized_status(&self) -> NormalizedStatus {
        normalize(Some(&self.status))
    }

    /// Structured view of the row.
    ///
    /// Unparseable `items` become an empty list and unparseable `customer_info` becomes
    /// `None`. Both are logged and never reported to the caller.
    pub fn to_view(&self) -> OrderView {
        let items = match decode_blob::<Vec<OrderItem>>(&self.items) {
            Ok(items) => items,
            Err(e) => {
                warn!(order_id = %self.id, error = %e, "Malformed items, using empty list");
                Vec::new()
            }
        };

        let customer_info = match self.customer_info.as_deref() {
            None => None,
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => match decode_blob::<Option<CustomerInfo>>(raw) {
                Ok(info) => info,
                Err(e) => {
                    warn!(order_id = %self.id, error = %e, "Malformed customer_info, dropping it");
                    None
                }
            },
        };

        OrderView {
            id: self.id,
            items,
            total: self.total,
            status: self.normalized_status(),
            customer_info,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_from: self.created_from.clone(),
            version: self.version,
        }
    }
}

/// Parse persisted JSON text, unwrapping one level of double encoding
/// (a JSON string whose content is itself JSON).
fn decode_blob<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let value = match value {
        serde_json::Value::String(inner) => serde_json::from_str(&inner)?,
        other => other,
    };
    serde_json::from_value(value)
}
