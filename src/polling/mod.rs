//! # Client Pollers
//!
//! The screens that watch an order, rebuilt as owned objects:
//!
//! - [`OrderDetailView`] - admin order detail. Polls the order every 10s, pauses
//!   `min(60s, 5s x failures)` after failures.
//! - [`TrackingView`] - customer tracking page. Polls order and assignment every 10s and
//!   runs a second 5s loop for the driver location only while the assignment is `accepted`.
//! - [`StatusSubmitter`] - admin status changes, with a busy flag and a 2s cooldown.
//!
//! Each loop is a [`PollTask`]: stopped explicitly or by dropping the view, never
//! aborting fetches already in flight. Each fetch carries a number from a
//! [`SequenceGate`], so responses that arrive out of order cannot roll the state back.

pub mod admin;
pub mod backoff;
pub mod order_detail;
pub mod sequence;
pub mod source;
pub mod task;
pub mod tracking;

#[cfg(test)]
pub(crate) mod testing;

pub use admin::*;
pub use backoff::*;
pub use order_detail::*;
pub use sequence::*;
pub use source::*;
pub use task::*;
pub use tracking::*;

use std::time::Duration;

/// Periods and backoff shared by the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub order_every: Duration,
    pub location_every: Duration,
    pub backoff: BackoffPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            order_every: Duration::from_secs(10),
            location_every: Duration::from_secs(5),
            backoff: BackoffPolicy::default(),
        }
    }
}
