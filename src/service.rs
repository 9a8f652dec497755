use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::rpc::proto::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, SetRequest, SetResponse,
};
use crate::rpc::Cache;
use crate::store::KvStore;

/// RPC-facing wrapper around a store
///
/// Holds no state of its own; all mutual exclusion happens inside the store.
pub struct CacheService<S> {
    store: Arc<S>,
}

impl<S: KvStore> CacheService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[async_trait::async_trait]
impl<S: KvStore> Cache for CacheService<S> {
    /// Absence is reported as `NotFound`, the only error raised here
    async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status> {
        let key = request.into_inner().key;
        match self.store.get(&key) {
            Some(value) => {
                debug!(key = %key, len = value.len(), "get hit");
                Ok(Response::new(GetResponse { value }))
            }
            None => {
                debug!(key = %key, "get miss");
                Err(Status::not_found(format!("cache: no key {} found", key)))
            }
        }
    }

    async fn set(&self, request: Request<SetRequest>) -> Result<Response<SetResponse>, Status> {
        let SetRequest { key, value } = request.into_inner();
        debug!(key = %key, len = value.len(), "set");
        self.store.set(key, value);
        Ok(Response::new(SetResponse {}))
    }

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let key = request.into_inner().key;
        debug!(key = %key, "delete");
        self.store.delete(&key);
        Ok(Response::new(DeleteResponse {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tonic::Code;

    fn service() -> CacheService<Store> {
        CacheService::new(Arc::new(Store::new()))
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let svc = service();
        svc.set(Request::new(SetRequest {
            key: "a".to_string(),
            value: b"1".to_vec(),
        }))
        .await
        .unwrap();

        let resp = svc
            .get(Request::new(GetRequest {
                key: "a".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(resp.into_inner().value, b"1");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let svc = service();
        let status = svc
            .get(Request::new(GetRequest {
                key: "missing".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "cache: no key missing found");
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let svc = service();
        let resp = svc
            .delete(Request::new(DeleteRequest {
                key: "never-set".to_string(),
            }))
            .await;
        assert!(resp.is_ok());
        assert!(svc.store().is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let svc = service();
        svc.store().set("a".to_string(), b"1".to_vec());

        svc.delete(Request::new(DeleteRequest {
            key: "a".to_string(),
        }))
        .await
        .unwrap();

        let status = svc
            .get(Request::new(GetRequest {
                key: "a".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn test_empty_value_is_found() {
        let svc = service();
        svc.store().set("empty".to_string(), Vec::new());

        let resp = svc
            .get(Request::new(GetRequest {
                key: "empty".to_string(),
            }))
            .await
            .unwrap();
        assert!(resp.into_inner().value.is_empty());
    }
}
