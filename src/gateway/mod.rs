//! HTTP gateway in front of the cache service
//!
//! Maps `/v1/keyvalues` routes onto cache RPCs and RPC status codes onto
//! HTTP status codes. One RPC is issued per request, with no retries; the
//! inbound request's deadline is not forwarded to the RPC.

pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::Result;
use crate::rpc::CacheClient;

use handlers::AppState;

/// Build the gateway routes around a cache client
pub fn router(client: CacheClient) -> Router {
    Router::new()
        .route("/v1/keyvalues", post(handlers::handle_set))
        .route(
            "/v1/keyvalues/:key",
            get(handlers::handle_get).delete(handlers::handle_delete),
        )
        .with_state(AppState { client })
}

/// HTTP server hosting the gateway
pub struct Gateway {
    listener: TcpListener,
    local_addr: SocketAddr,
    client: CacheClient,
}

impl Gateway {
    /// Bind the gateway to the given address
    pub async fn bind(addr: &str, client: CacheClient) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Gateway bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            client,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve HTTP until `shutdown` resolves, letting in-flight requests finish
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Gateway started, listening on {}", self.local_addr);
        axum::serve(self.listener, router(self.client))
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("Gateway stopped");
        Ok(())
    }
}
