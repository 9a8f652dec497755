//! Server side of the `cache.Cache` gRPC service.
//!
//! `CacheServer` routes unary calls by path to an implementation of the
//! [`Cache`] trait, in the shape tonic's code generator produces.

use std::sync::Arc;
use std::task::{Context, Poll};

use tonic::codegen::{http, Body, BoxFuture, Service, StdError};
use tonic::{Request, Response, Status};

use super::proto::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, SetRequest, SetResponse,
};

pub const SERVICE_NAME: &str = "cache.Cache";

/// Handlers for the `cache.Cache` service
#[async_trait::async_trait]
pub trait Cache: Send + Sync + 'static {
    async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status>;

    async fn set(&self, request: Request<SetRequest>) -> Result<Response<SetResponse>, Status>;

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status>;
}

/// Tower service exposing a [`Cache`] implementation over gRPC
#[derive(Debug)]
pub struct CacheServer<T> {
    inner: Arc<T>,
}

impl<T: Cache> CacheServer<T> {
    pub fn from_arc(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for CacheServer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> tonic::server::NamedService for CacheServer<T> {
    const NAME: &'static str = SERVICE_NAME;
}

struct GetSvc<T>(Arc<T>);

impl<T: Cache> tonic::server::UnaryService<GetRequest> for GetSvc<T> {
    type Response = GetResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<GetRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.get(request).await })
    }
}

struct SetSvc<T>(Arc<T>);

impl<T: Cache> tonic::server::UnaryService<SetRequest> for SetSvc<T> {
    type Response = SetResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<SetRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.set(request).await })
    }
}

struct DeleteSvc<T>(Arc<T>);

impl<T: Cache> tonic::server::UnaryService<DeleteRequest> for DeleteSvc<T> {
    type Response = DeleteResponse;
    type Future = BoxFuture<Response<Self::Response>, Status>;

    fn call(&mut self, request: Request<DeleteRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.delete(request).await })
    }
}

impl<T, B> Service<http::Request<B>> for CacheServer<T>
where
    T: Cache,
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        let path = req.uri().path().to_string();

        match path.as_str() {
            "/cache.Cache/Get" => Box::pin(async move {
                let mut grpc = tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                Ok(grpc.unary(GetSvc(inner), req).await)
            }),
            "/cache.Cache/Set" => Box::pin(async move {
                let mut grpc = tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                Ok(grpc.unary(SetSvc(inner), req).await)
            }),
            "/cache.Cache/Delete" => Box::pin(async move {
                let mut grpc = tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                Ok(grpc.unary(DeleteSvc(inner), req).await)
            }),
            _ => {
                tracing::warn!(path = %path, "unknown cache method");
                Box::pin(async move { Ok(unimplemented_response()) })
            }
        }
    }
}

fn unimplemented_response() -> http::Response<tonic::body::BoxBody> {
    let mut response = http::Response::new(tonic::codegen::empty_body());
    let headers = response.headers_mut();
    headers.insert(
        "grpc-status",
        http::HeaderValue::from(tonic::Code::Unimplemented as i32),
    );
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/grpc"),
    );
    response
}
