use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tracing::info;

use crate::error::Result;
use crate::rpc::CacheServer;
use crate::service::CacheService;
use crate::store::KvStore;

/// gRPC server hosting the cache service
pub struct Server<S> {
    listener: TcpListener,
    local_addr: SocketAddr,
    service: Arc<CacheService<S>>,
}

impl<S: KvStore> Server<S> {
    /// Bind the cache service to the given address, serving `store`
    pub async fn bind(addr: &str, store: Arc<S>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Cache service bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            service: Arc::new(CacheService::new(store)),
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve RPCs until `shutdown` resolves
    ///
    /// Each connection and each call runs on its own task.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        info!("Cache service started, listening on {}", self.local_addr);

        tonic::transport::Server::builder()
            .add_service(CacheServer::from_arc(self.service))
            .serve_with_incoming_shutdown(TcpListenerStream::new(self.listener), shutdown)
            .await?;

        info!("Cache service stopped");
        Ok(())
    }
}
