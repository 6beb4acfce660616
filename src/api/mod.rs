//! # HTTP contract
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | `GET` | `/orders/{id}` | [`OrderEnvelope`] |
//! | `PUT` | `/orders/{id}` | [`StatusChange`] in, [`OrderEnvelope`] out |
//! | `GET` | `/delivery/assignments?order_id={id}` | [`AssignmentsEnvelope`] |
//! | `GET` | `/driver/location?orderId={id}` | [`LocationEnvelope`] |
//! | `GET` | `/health` | `ok` |
//!
//! Missing orders are `404`, rejected writes `400`, version conflicts `409` and an
//! unreachable actor `503`. Every JSON body carries `success`.

mod envelope;
mod http_source;
mod routes;

pub use envelope::*;
pub use http_source::HttpSource;
pub use routes::{build_router, AppState};

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Serves `state` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// The HTTP server running in the background.
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl ApiServer {
    /// Binds `addr` (port `0` picks a free port) and starts serving.
    pub async fn start(addr: &str, state: AppState) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = serve(listener, state, shutdown).await {
                error!(error = %e, "HTTP server error");
            }
        });

        info!(%addr, "HTTP server listening");
        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for an [`HttpSource`].
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            error!(error = ?e, "HTTP server task failed");
        }
        info!(addr = %self.addr, "HTTP server stopped");
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
