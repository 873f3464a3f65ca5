//! Ranking Storage Module
//!
//! Everything the leaderboard needs from the place its rankings live.
//!
//! ## Core Concepts
//! - **Ranked sets**: `RankedSet` keeps members ordered by score with O(log n) writes and rank lookups.
//! - **Atomic batches**: writes are grouped into a `Batch` that a backend applies all-or-nothing.
//! - **Backends**: `RankingBackend` is the seam. `MemoryBackend` keeps state in-process;
//!   `RemoteBackend` talks to a store node serving a `MemoryBackend` over HTTP.
//! - **Store node**: `handlers` exposes a `MemoryBackend` to remote clients, deduplicating
//!   retried batches by operation id.

pub mod backend;
pub mod batch;
pub mod error;
pub mod handlers;
pub mod memory;
mod order_tree;
pub mod protocol;
pub mod remote;
pub mod sorted;
