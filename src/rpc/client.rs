//! Client side of the `cache.Cache` gRPC service.

use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{IntoRequest, Status};

use super::proto::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, SetRequest, SetResponse,
};
use crate::error::{Error, Result};

/// Typed client for the cache service
///
/// Clones share the underlying channel, so one client can serve many
/// concurrent callers over a single connection.
#[derive(Debug, Clone)]
pub struct CacheClient {
    inner: tonic::client::Grpc<Channel>,
}

impl CacheClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    /// Create a client whose connection is established on first use
    ///
    /// Startup does not fail when the cache service is down; calls made
    /// while it is unreachable fail with `Unavailable`.
    pub fn connect_lazy(target: &str) -> Result<Self> {
        let endpoint =
            Endpoint::from_shared(target.to_string()).map_err(|source| Error::InvalidTarget {
                target: target.to_string(),
                source,
            })?;
        Ok(Self::new(endpoint.connect_lazy()))
    }

    /// Connect eagerly, failing if the cache service is unreachable
    #[cfg(test)]
    pub async fn connect(target: &str) -> Result<Self> {
        let endpoint =
            Endpoint::from_shared(target.to_string()).map_err(|source| Error::InvalidTarget {
                target: target.to_string(),
                source,
            })?;
        Ok(Self::new(endpoint.connect().await?))
    }

    /// Fetch the value for `key`; fails with `NotFound` if absent
    pub async fn get(&mut self, key: impl Into<String>) -> std::result::Result<Vec<u8>, Status> {
        let request = GetRequest { key: key.into() };
        let response: GetResponse = self.unary(request, "/cache.Cache/Get").await?;
        Ok(response.value)
    }

    pub async fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> std::result::Result<(), Status> {
        let request = SetRequest {
            key: key.into(),
            value: value.into(),
        };
        let _: SetResponse = self.unary(request, "/cache.Cache/Set").await?;
        Ok(())
    }

    pub async fn delete(&mut self, key: impl Into<String>) -> std::result::Result<(), Status> {
        let request = DeleteRequest { key: key.into() };
        let _: DeleteResponse = self.unary(request, "/cache.Cache/Delete").await?;
        Ok(())
    }

    async fn unary<Req, Resp>(
        &mut self,
        request: Req,
        path: &'static str,
    ) -> std::result::Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unavailable(format!("cache service not ready: {}", e)))?;

        let codec = tonic::codec::ProstCodec::<Req, Resp>::default();
        let response = self
            .inner
            .unary(request.into_request(), PathAndQuery::from_static(path), codec)
            .await?;
        Ok(response.into_inner())
    }
}
