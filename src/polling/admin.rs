//! Admin status changes.
//!
//! Guards one admin session against double submits: while a write is in flight further
//! submits fail with [`SubmitError::Busy`], and for a short cooldown after a successful
//! write they fail with [`SubmitError::CoolingDown`]. Other sessions are not affected;
//! conflicting writers are caught by the order version instead.

use super::{SourceError, TrackingSource};
use crate::model::{OrderId, OrderView};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a status update is already in progress")]
    Busy,
    #[error("wait {remaining:?} before the next status update")]
    CoolingDown { remaining: Duration },
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Clears the busy flag however the submit ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct StatusSubmitter<S: TrackingSource> {
    source: Arc<S>,
    cooldown: Duration,
    busy: AtomicBool,
    last_success: Mutex<Option<Instant>>,
}

impl<S: TrackingSource> StatusSubmitter<S> {
    pub fn new(source: Arc<S>, cooldown: Duration) -> Self {
        Self {
            source,
            cooldown,
            busy: AtomicBool::new(false),
            last_success: Mutex::new(None),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Time left before another submit is accepted, if any.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let last = (*self.last_success.lock().unwrap_or_else(PoisonError::into_inner))?;
        let remaining = self.cooldown.saturating_sub(last.elapsed());
        (!remaining.is_zero()).then_some(remaining)
    }

    /// Sends one status write. Failures are returned as they are; nothing is retried.
    pub async fn submit(
        &self,
        order_id: OrderId,
        status: &str,
        expected_version: Option<u64>,
    ) -> Result<OrderView, SubmitError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::Busy);
        }
        let _busy = BusyGuard(&self.busy);

        if let Some(remaining) = self.cooldown_remaining() {
            return Err(SubmitError::CoolingDown { remaining });
        }

        match self
            .source
            .update_status(order_id, status, expected_version)
            .await
        {
            Ok(view) => {
                *self.last_success.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(Instant::now());
                info!(order_id = %order_id, status = %view.status, version = view.version, "Status submitted");
                Ok(view)
            }
            Err(e) => {
                warn!(order_id = %order_id, status, error = %e, "Status submit failed");
                Err(e.into())
            }
        }
    }
}
