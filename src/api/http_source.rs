//! [`TrackingSource`] over the HTTP contract, for views that run away from the actors.

use super::envelope::{AssignmentsEnvelope, LocationEnvelope, OrderEnvelope, StatusChange};
use crate::model::{DeliveryAssignment, DriverLocation, OrderId, OrderView};
use crate::polling::{SourceError, TrackingSource};
use async_trait::async_trait;
use tracing::debug;

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    /// `base_url` without a trailing slash, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(e: reqwest::Error) -> SourceError {
    SourceError::Transport(e.to_string())
}

/// A 404 is `NotFound`. Any other response is read as an envelope, and the envelope's
/// `success` decides, not the status code.
async fn read_envelope<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, SourceError> {
    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound);
    }
    let status = resp.status();
    resp.json::<T>().await.map_err(|e| {
        debug!(%status, error = %e, "Unreadable response body");
        SourceError::Transport(format!("unreadable response ({status}): {e}"))
    })
}

fn rejected(error: Option<String>) -> SourceError {
    SourceError::Rejected(error.unwrap_or_else(|| "request failed".to_string()))
}

fn order_from(envelope: OrderEnvelope) -> Result<OrderView, SourceError> {
    match envelope {
        OrderEnvelope {
            success: true,
            order: Some(order),
            ..
        } => Ok(order),
        OrderEnvelope { error, .. } => Err(rejected(error)),
    }
}

#[async_trait]
impl TrackingSource for HttpSource {
    async fn fetch_order(&self, id: OrderId) -> Result<OrderView, SourceError> {
        let resp = self
            .client
            .get(self.url(&format!("/orders/{}", id.0)))
            .send()
            .await
            .map_err(transport)?;
        order_from(read_envelope(resp).await?)
    }

    async fn fetch_assignment(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DeliveryAssignment>, SourceError> {
        let resp = self
            .client
            .get(self.url("/delivery/assignments"))
            .query(&[("order_id", order_id.0)])
            .send()
            .await
            .map_err(transport)?;
        let envelope: AssignmentsEnvelope = read_envelope(resp).await?;
        if !envelope.success {
            return Err(rejected(envelope.error));
        }
        Ok(envelope.assignments.into_iter().next())
    }

    async fn fetch_driver_location(
        &self,
        order_id: OrderId,
    ) -> Result<Option<DriverLocation>, SourceError> {
        let resp = self
            .client
            .get(self.url("/driver/location"))
            .query(&[("orderId", order_id.0)])
            .send()
            .await
            .map_err(transport)?;
        let envelope: LocationEnvelope = read_envelope(resp).await?;
        if !envelope.success {
            return Err(rejected(envelope.error));
        }
        Ok(envelope.into_location())
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: &str,
        expected_version: Option<u64>,
    ) -> Result<OrderView, SourceError> {
        let body = StatusChange {
            status: Some(status.to_string()),
            version: expected_version,
        };
        let resp = self
            .client
            .put(self.url(&format!("/orders/{}", id.0)))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        order_from(read_envelope(resp).await?)
    }
}
