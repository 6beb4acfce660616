//! Router and handlers for the order, assignment and location endpoints.

use super::envelope::{AssignmentsEnvelope, LocationEnvelope, OrderEnvelope, StatusChange};
use crate::clients::{DeliveryClient, OrderClient};
use crate::delivery_actor::DeliveryError;
use crate::model::OrderId;
use crate::order_actor::OrderError;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, warn};

/// Clients the handlers talk to.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderClient,
    pub deliveries: DeliveryClient,
}

/// Build the axum router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/orders/{id}", get(get_order_handler).put(put_order_handler))
        .route("/delivery/assignments", get(assignments_handler))
        .route("/driver/location", get(location_handler))
        .with_state(state)
}

fn order_error_status(e: &OrderError) -> StatusCode {
    match e {
        OrderError::NotFound(_) => StatusCode::NOT_FOUND,
        OrderError::EmptyStatus
        | OrderError::UnknownStatus(_)
        | OrderError::IllegalTransition { .. } => StatusCode::BAD_REQUEST,
        OrderError::VersionConflict { .. } => StatusCode::CONFLICT,
        OrderError::ActorCommunicationError(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn delivery_error_status(e: &DeliveryError) -> StatusCode {
    match e {
        DeliveryError::NotFound(_) | DeliveryError::UnknownOrder(_) => StatusCode::NOT_FOUND,
        DeliveryError::ActorCommunicationError(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn parse_order_id(raw: &str) -> Option<OrderId> {
    raw.trim().parse::<u32>().ok().map(OrderId)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn get_order_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> (StatusCode, Json<OrderEnvelope>) {
    let Some(id) = parse_order_id(&raw_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(OrderEnvelope::err(format!("invalid order id '{raw_id}'"))),
        );
    };
    match state.orders.get_order(id).await {
        Ok(order) => (StatusCode::OK, Json(OrderEnvelope::ok(order))),
        Err(e) => {
            debug!(order_id = %id, error = %e, "GET order failed");
            (order_error_status(&e), Json(OrderEnvelope::err(e.to_string())))
        }
    }
}

async fn put_order_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<StatusChange>, JsonRejection>,
) -> (StatusCode, Json<OrderEnvelope>) {
    let Some(id) = parse_order_id(&raw_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(OrderEnvelope::err(format!("invalid order id '{raw_id}'"))),
        );
    };
    let change = match body {
        Ok(Json(change)) => change,
        Err(rejection) => {
            debug!(order_id = %id, error = %rejection.body_text(), "Unreadable status body");
            return (
                StatusCode::BAD_REQUEST,
                Json(OrderEnvelope::err(format!(
                    "invalid request body: {}",
                    rejection.body_text()
                ))),
            );
        }
    };
    // a missing or null status is the empty status
    let status = change.status.as_deref().unwrap_or_default();
    match state.orders.set_status(id, status, change.version).await {
        Ok(order) => (StatusCode::OK, Json(OrderEnvelope::ok(order))),
        Err(e) => {
            warn!(order_id = %id, status, error = %e, "Status update rejected");
            (order_error_status(&e), Json(OrderEnvelope::err(e.to_string())))
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssignmentsQuery {
    order_id: Option<u32>,
}

async fn assignments_handler(
    State(state): State<AppState>,
    query: Result<Query<AssignmentsQuery>, QueryRejection>,
) -> (StatusCode, Json<AssignmentsEnvelope>) {
    let order_id = match query {
        Ok(Query(AssignmentsQuery {
            order_id: Some(id),
        })) => OrderId(id),
        Ok(_) => return assignments_error("order_id is required".to_string()),
        Err(rejection) => return assignments_error(rejection.body_text()),
    };
    match state.deliveries.assignments_for(order_id).await {
        Ok(assignments) => (
            StatusCode::OK,
            Json(AssignmentsEnvelope {
                success: true,
                assignments,
                error: None,
            }),
        ),
        Err(e) => (
            delivery_error_status(&e),
            Json(AssignmentsEnvelope {
                success: false,
                assignments: Vec::new(),
                error: Some(e.to_string()),
            }),
        ),
    }
}

fn assignments_error(error: String) -> (StatusCode, Json<AssignmentsEnvelope>) {
    (
        StatusCode::BAD_REQUEST,
        Json(AssignmentsEnvelope {
            success: false,
            assignments: Vec::new(),
            error: Some(error),
        }),
    )
}

#[derive(Debug, Deserialize)]
struct LocationQuery {
    #[serde(rename = "orderId")]
    order_id: Option<u32>,
}

async fn location_handler(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> (StatusCode, Json<LocationEnvelope>) {
    let order_id = match query {
        Ok(Query(LocationQuery {
            order_id: Some(id),
        })) => OrderId(id),
        Ok(_) => return location_error("orderId is required".to_string()),
        Err(rejection) => return location_error(rejection.body_text()),
    };
    match state.deliveries.driver_location(order_id).await {
        Ok(location) => (StatusCode::OK, Json(LocationEnvelope::from(location))),
        Err(e) => (
            delivery_error_status(&e),
            Json(LocationEnvelope {
                error: Some(e.to_string()),
                ..LocationEnvelope::default()
            }),
        ),
    }
}

fn location_error(error: String) -> (StatusCode, Json<LocationEnvelope>) {
    (
        StatusCode::BAD_REQUEST,
        Json(LocationEnvelope {
            error: Some(error),
            ..LocationEnvelope::default()
        }),
    )
}
