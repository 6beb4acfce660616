//! # Observability & Tracing
//!
//! One subscriber for the whole process: `tracing-subscriber`'s compact formatter with
//! module targets hidden (actors log an `entity_type` field instead) and an
//! [`EnvFilter`] read from `RUST_LOG`.
//!
//! ```bash
//! RUST_LOG=info cargo run                               # lifecycle + state changes
//! RUST_LOG=debug cargo run                              # request payloads too
//! RUST_LOG=supernova_orders::polling=trace cargo run    # every poll tick
//! ```
//!
//! With `info` an order status change reads:
//!
//! ```text
//! INFO set_status{id=OrderId(1) status="preparando"}: Status change requested
//! INFO Updated entity_type="Order" id=order_1
//! ```

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `default_filter` applies when `RUST_LOG` is unset or unparsable. Calling this twice
/// (e.g. from several tests) is harmless; later calls are ignored.
pub fn setup_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
