//! Canonical order status vocabulary.
//!
//! Stored rows carry free text (`"Pending"`, `"ready"`, `"en_camino"`, ...). Two entry
//! points turn that text into something typed:
//!
//! - [`OrderStatus::parse`] is strict and is what the write path uses. Unknown text is an
//!   [`UnknownStatusError`], so it can no longer reach storage.
//! - [`normalize`] is lenient and is what the read path uses for legacy rows. Unknown
//!   text comes back as [`NormalizedStatus::Unrecognized`] so callers have to decide
//!   what to show for it.
//!
//! Both share one synonym table.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of an order, in intended progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pendiente,
    Preparando,
    ListoParaRecoger,
    AsignadoRepartidor,
    EnCamino,
    Entregado,
    Cancelado,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pendiente,
        OrderStatus::Preparando,
        OrderStatus::ListoParaRecoger,
        OrderStatus::AsignadoRepartidor,
        OrderStatus::EnCamino,
        OrderStatus::Entregado,
        OrderStatus::Cancelado,
    ];

    /// The stored spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "pendiente",
            OrderStatus::Preparando => "preparando",
            OrderStatus::ListoParaRecoger => "listo_para_recoger",
            OrderStatus::AsignadoRepartidor => "asignado_repartidor",
            OrderStatus::EnCamino => "en_camino",
            OrderStatus::Entregado => "entregado",
            OrderStatus::Cancelado => "cancelado",
        }
    }

    /// `entregado` and `cancelado` admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Entregado | OrderStatus::Cancelado)
    }

    /// Statuses an order may move to from `self`.
    ///
    /// Forward only. Stages may be skipped (a pickup order goes straight from
    /// `listo_para_recoger` to `entregado`), and every non-terminal stage can be cancelled.
    ///
    /// Backward corrections are refused. A status set too far ahead by mistake stays
    /// there; the order is cancelled and placed again if it cannot continue.
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pendiente => &[
                Preparando,
                ListoParaRecoger,
                AsignadoRepartidor,
                EnCamino,
                Entregado,
                Cancelado,
            ],
            Preparando => &[
                ListoParaRecoger,
                AsignadoRepartidor,
                EnCamino,
                Entregado,
                Cancelado,
            ],
            ListoParaRecoger => &[AsignadoRepartidor, EnCamino, Entregado, Cancelado],
            AsignadoRepartidor => &[EnCamino, Entregado, Cancelado],
            EnCamino => &[Entregado, Cancelado],
            Entregado | Cancelado => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Strict parse: trims, lower-cases and resolves synonyms.
    pub fn parse(raw: &str) -> Result<Self, UnknownStatusError> {
        let lowered = raw.trim().to_lowercase();
        lookup(&lowered).ok_or(UnknownStatusError { raw: lowered })
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::parse(s)
    }
}

/// Raised by the strict parse for text outside the synonym table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status '{raw}'")]
pub struct UnknownStatusError {
    /// The offending value, trimmed and lower-cased.
    pub raw: String,
}

fn lookup(lowered: &str) -> Option<OrderStatus> {
    let status = match lowered {
        "pending" | "pendiente" => OrderStatus::Pendiente,
        "processing" | "preparing" | "preparando" => OrderStatus::Preparando,
        "ready" | "listo" | "listo_para_recoger" => OrderStatus::ListoParaRecoger,
        "assigned" | "asignado" | "asignado_repartidor" => OrderStatus::AsignadoRepartidor,
        "in_delivery" | "on_the_way" | "en_camino" => OrderStatus::EnCamino,
        "delivered" | "entregado" => OrderStatus::Entregado,
        "cancelled" | "canceled" | "cancelado" => OrderStatus::Cancelado,
        _ => return None,
    };
    Some(status)
}

/// Result of the lenient read-side normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedStatus {
    Canonical(OrderStatus),
    /// Legacy text outside the table, lower-cased. Displayed as-is.
    Unrecognized(String),
}

impl NormalizedStatus {
    pub fn as_str(&self) -> &str {
        match self {
            NormalizedStatus::Canonical(status) => status.as_str(),
            NormalizedStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn canonical(&self) -> Option<OrderStatus> {
        match self {
            NormalizedStatus::Canonical(status) => Some(*status),
            NormalizedStatus::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for NormalizedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OrderStatus> for NormalizedStatus {
    fn from(status: OrderStatus) -> Self {
        NormalizedStatus::Canonical(status)
    }
}

impl Serialize for NormalizedStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NormalizedStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(normalize(raw.as_deref()))
    }
}

/// Lenient normalization for display.
///
/// Missing or blank input is `pendiente`. Known spellings map to their canonical status.
/// Anything else passes through lower-cased. Never fails, and
/// `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: Option<&str>) -> NormalizedStatus {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return NormalizedStatus::Canonical(OrderStatus::Pendiente);
    }
    let lowered = trimmed.to_lowercase();
    match lookup(&lowered) {
        Some(status) => NormalizedStatus::Canonical(status),
        None => NormalizedStatus::Unrecognized(lowered),
    }
}
