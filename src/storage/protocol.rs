//! Store Node Network Protocol
//!
//! Defines the API endpoints and Data Transfer Objects (DTOs) a `RemoteBackend`
//! uses to drive a store node over HTTP.
//!
//! Everything is JSON. A failed request still carries a body, so the client can
//! rebuild the exact `StoreError` the node raised.

use super::batch::{Batch, Read, Reply};
use super::error::StoreError;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Applies one atomic batch.
pub const ENDPOINT_EXEC: &str = "/internal/store/exec";
/// Answers a read pipeline.
pub const ENDPOINT_READ: &str = "/internal/store/read";
/// Liveness check used when a leaderboard connects.
pub const ENDPOINT_PING: &str = "/internal/store/ping";

// --- Data Transfer Objects ---

/// Payload for applying a batch on the store node.
///
/// The `op_id` lets the node acknowledge a retried batch without applying it twice,
/// which matters for non-idempotent operations such as score increments.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExecRequest {
    /// Unique Operation ID (UUID) for deduplication.
    pub op_id: String,
    pub batch: Batch,
}

/// Acknowledgment for a batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExecResponse {
    /// `false` when the node recognised the `op_id` and skipped the batch.
    pub applied: bool,
    pub error: Option<StoreError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadRequest {
    pub reads: Vec<Read>,
}

/// One reply per requested read, in request order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadResponse {
    pub replies: Vec<Reply>,
    pub error: Option<StoreError>,
}
