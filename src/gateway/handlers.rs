use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::{error, info, warn};

use super::error::ApiError;
use crate::rpc::CacheClient;

/// Body accepted by `POST /v1/keyvalues`
///
/// Field names match case-insensitively and unknown fields are skipped.
/// Missing or `null` fields decode as empty strings.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct KvRequestBody {
    pub key: String,
    pub value: String,
}

impl<'de> Deserialize<'de> for KvRequestBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KvRequestBodyVisitor)
    }
}

struct KvRequestBodyVisitor;

impl<'de> Visitor<'de> for KvRequestBodyVisitor {
    type Value = KvRequestBody;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with string fields `key` and `value`")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut body = KvRequestBody::default();
        while let Some(name) = map.next_key::<String>()? {
            let slot = if name.eq_ignore_ascii_case("key") {
                &mut body.key
            } else if name.eq_ignore_ascii_case("value") {
                &mut body.value
            } else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            // repeated fields: last one wins
            if let Some(text) = map.next_value::<Option<String>>()? {
                *slot = text;
            }
        }
        Ok(body)
    }
}

/// Decode the first JSON value of a request body
///
/// Anything after the first value is ignored; a top-level `null` yields an
/// empty body. An empty body is malformed.
pub fn decode_body(body: &[u8]) -> Result<KvRequestBody, serde_json::Error> {
    let mut values =
        serde_json::Deserializer::from_slice(body).into_iter::<Option<KvRequestBody>>();
    match values.next() {
        Some(decoded) => Ok(decoded?.unwrap_or_default()),
        None => Err(de::Error::custom("empty request body")),
    }
}

/// Body returned by `GET /v1/keyvalues/{key}`
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct ValueResponse {
    pub value: String,
}

/// Handler state; the client is cloned per request and shares one channel
#[derive(Clone)]
pub struct AppState {
    pub client: CacheClient,
}

/// POST /v1/keyvalues
pub async fn handle_set(State(state): State<AppState>, uri: Uri, body: Bytes) -> Response {
    info!(method = %Method::POST, path = %uri.path(), "received");
    let result = set(state.client, &body).await;
    respond(Method::POST, &uri, result)
}

async fn set(mut client: CacheClient, body: &[u8]) -> Result<Response, ApiError> {
    // Decoded from raw bytes so the Content-Type header is not required
    let body = decode_body(body)?;
    // TODO: cap key length and restrict its character set once clients agree on limits
    client.set(body.key, body.value.into_bytes()).await?;
    Ok(StatusCode::CREATED.into_response())
}

/// GET /v1/keyvalues/{key}
pub async fn handle_get(
    State(state): State<AppState>,
    Path(key): Path<String>,
    uri: Uri,
) -> Response {
    info!(method = %Method::GET, path = %uri.path(), "received");
    let result = get(state.client, key).await;
    respond(Method::GET, &uri, result)
}

async fn get(mut client: CacheClient, key: String) -> Result<Response, ApiError> {
    let value = client.get(key).await.map_err(ApiError::from_get_status)?;
    let value = String::from_utf8_lossy(&value).into_owned();
    Ok((StatusCode::OK, Json(ValueResponse { value })).into_response())
}

/// DELETE /v1/keyvalues/{key}
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
    uri: Uri,
) -> Response {
    info!(method = %Method::DELETE, path = %uri.path(), "received");
    let result = delete(state.client, key).await;
    respond(Method::DELETE, &uri, result)
}

async fn delete(mut client: CacheClient, key: String) -> Result<Response, ApiError> {
    client.delete(key).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Log the outcome of a request and render it
fn respond(method: Method, uri: &Uri, result: Result<Response, ApiError>) -> Response {
    let path = uri.path();
    match result {
        Ok(response) => {
            info!(%method, %path, status = response.status().as_u16(), "responded");
            response
        }
        Err(err) => {
            let status = err.status_code().as_u16();
            match &err {
                ApiError::Rpc(rpc_status) => {
                    error!(%method, %path, status, error = %rpc_status, "responded")
                }
                _ => warn!(%method, %path, status, error = %err, "responded"),
            }
            err.into_response()
        }
    }
}
