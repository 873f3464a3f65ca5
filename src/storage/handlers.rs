use axum::{
    Json, Router,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use std::sync::Arc;

use super::error::StoreError;
use super::memory::MemoryBackend;
use super::protocol::{
    ENDPOINT_EXEC, ENDPOINT_PING, ENDPOINT_READ, ExecRequest, ExecResponse, ReadRequest,
    ReadResponse,
};
use crate::storage::backend::RankingBackend;

/// Shared secret a store node expects in `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Default)]
pub struct StoreToken(pub Option<String>);

impl StoreToken {
    fn admits(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.0 else {
            return true;
        };
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| presented == expected)
    }
}

/// Routes served by a store node.
pub fn router(store: Arc<MemoryBackend>, token: StoreToken) -> Router {
    Router::new()
        .route(ENDPOINT_EXEC, post(handle_exec))
        .route(ENDPOINT_READ, post(handle_read))
        .route(ENDPOINT_PING, get(handle_ping))
        .layer(Extension(store))
        .layer(Extension(token))
}

pub async fn handle_exec(
    Extension(store): Extension<Arc<MemoryBackend>>,
    Extension(token): Extension<StoreToken>,
    headers: HeaderMap,
    Json(req): Json<ExecRequest>,
) -> (StatusCode, Json<ExecResponse>) {
    if !token.admits(&headers) {
        tracing::warn!("Rejected batch {}: bad credentials", req.op_id);
        return (
            StatusCode::UNAUTHORIZED,
            Json(ExecResponse {
                applied: false,
                error: Some(StoreError::Unauthorized),
            }),
        );
    }

    let op_count = req.batch.len();
    match store.execute_once(&req.op_id, req.batch).await {
        Ok(applied) => {
            tracing::debug!("Batch {} ({} ops) applied={}", req.op_id, op_count, applied);
            (
                StatusCode::OK,
                Json(ExecResponse {
                    applied,
                    error: None,
                }),
            )
        }
        Err(e) => {
            tracing::error!("Failed to apply batch {}: {}", req.op_id, e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ExecResponse {
                    applied: false,
                    error: Some(e),
                }),
            )
        }
    }
}

pub async fn handle_read(
    Extension(store): Extension<Arc<MemoryBackend>>,
    Extension(token): Extension<StoreToken>,
    headers: HeaderMap,
    Json(req): Json<ReadRequest>,
) -> (StatusCode, Json<ReadResponse>) {
    if !token.admits(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ReadResponse {
                replies: Vec::new(),
                error: Some(StoreError::Unauthorized),
            }),
        );
    }

    match store.read(req.reads).await {
        Ok(replies) => (
            StatusCode::OK,
            Json(ReadResponse {
                replies,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!("Failed to answer read pipeline: {}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ReadResponse {
                    replies: Vec::new(),
                    error: Some(e),
                }),
            )
        }
    }
}

pub async fn handle_ping(
    Extension(token): Extension<StoreToken>,
    headers: HeaderMap,
) -> StatusCode {
    if token.admits(&headers) {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}
