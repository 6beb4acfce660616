//! [`ActorEntity`] implementation for [`Order`].
//!
//! All status writes pass through [`Order::on_update`](ActorEntity::on_update), which runs
//! inside the order actor. Because the actor applies requests one at a time, the version
//! check and the transition check see the row exactly as the write will find it.

use super::error::OrderError;
use crate::model::{NormalizedStatus, Order, OrderCreate, OrderId, OrderUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = OrderError;

    /// Stores the row as written. A missing status becomes `pendiente`; anything else is
    /// kept verbatim and normalized on read.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        Ok(Order::new(id, params, Utc::now()))
    }

    /// Applies a status change.
    ///
    /// # Rules
    /// - `expected_version`, when present, must equal the stored version.
    /// - Writing the current status again succeeds without touching the row.
    /// - Otherwise the move must be in [`OrderStatus::allowed_next`](crate::model::OrderStatus::allowed_next).
    ///   A legacy status outside the vocabulary has no table entry, so any target is accepted.
    async fn on_update(&mut self, update: OrderUpdate, _ctx: &()) -> Result<(), OrderError> {
        if let Some(expected) = update.expected_version {
            if expected != self.version {
                return Err(OrderError::VersionConflict {
                    expected,
                    actual: self.version,
                });
            }
        }

        match self.normalized_status() {
            NormalizedStatus::Canonical(current) if current == update.status => {
                debug!(order_id = %self.id, status = %current, "Status unchanged");
                return Ok(());
            }
            NormalizedStatus::Canonical(current) => {
                if !current.can_transition_to(update.status) {
                    return Err(OrderError::IllegalTransition {
                        from: current,
                        to: update.status,
                    });
                }
            }
            NormalizedStatus::Unrecognized(legacy) => {
                warn!(
                    order_id = %self.id,
                    legacy = %legacy,
                    to = %update.status,
                    "Overwriting unrecognized status"
                );
            }
        }

        let from = std::mem::replace(&mut self.status, update.status.as_str().to_string());
        self.version += 1;
        self.updated_at = Utc::now();
        info!(
            order_id = %self.id,
            from = %from,
            to = %update.status,
            version = self.version,
            "Status changed"
        );
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), OrderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderStatus;

    fn order_with_status(status: &str) -> Order {
        Order::from_create_params(OrderId(1), OrderCreate::raw("[]", 10.0).with_status(status))
            .unwrap()
    }

    fn set(status: OrderStatus) -> OrderUpdate {
        OrderUpdate {
            status,
            expected_version: None,
        }
    }

    #[tokio::test]
    async fn test_forward_move_bumps_version() {
        let mut order = order_with_status("pendiente");
        order.on_update(set(OrderStatus::Preparando), &()).await.unwrap();

        assert_eq!(order.status, "preparando");
        assert_eq!(order.version, 2);
    }

    #[tokio::test]
    async fn test_backward_move_is_rejected() {
        let mut order = order_with_status("en_camino");
        let err = order
            .on_update(set(OrderStatus::Preparando), &())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrderError::IllegalTransition {
                from: OrderStatus::EnCamino,
                to: OrderStatus::Preparando,
            }
        );
    }

    #[tokio::test]
    async fn test_terminal_status_is_final() {
        let mut order = order_with_status("cancelled");
        let err = order
            .on_update(set(OrderStatus::Pendiente), &())
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn test_same_status_is_a_no_op() {
        let mut order = order_with_status("Ready");
        order
            .on_update(set(OrderStatus::ListoParaRecoger), &())
            .await
            .unwrap();

        assert_eq!(order.status, "Ready");
        assert_eq!(order.version, 1);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let mut order = order_with_status("pendiente");
        order.on_update(set(OrderStatus::Preparando), &()).await.unwrap();

        let stale = OrderUpdate {
            status: OrderStatus::ListoParaRecoger,
            expected_version: Some(1),
        };
        let err = order.on_update(stale, &()).await.unwrap_err();
        assert_eq!(
            err,
            OrderError::VersionConflict {
                expected: 1,
                actual: 2
            }
        );
        assert_eq!(order.status, "preparando");
    }

    #[tokio::test]
    async fn test_legacy_status_accepts_any_target() {
        let mut order = order_with_status("on_hold");
        order.on_update(set(OrderStatus::Pendiente), &()).await.unwrap();
        assert_eq!(order.status, "pendiente");
        assert_eq!(order.version, 2);
    }
}
