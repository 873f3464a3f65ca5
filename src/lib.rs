//! Leaderboard Service Library
//!
//! Ranked leaderboards for a large population of members, each with a score and an
//! optional group tag (e.g. a country). The library crate backs the `rankboard` binary.
//!
//! ## Architecture Modules
//! - **`storage`**: ranked sets, atomic write batches and the `RankingBackend` seam, with
//!   an in-process backend and an HTTP client for a remote store node.
//! - **`leaderboard`**: the coordinator that keeps global rankings, group rankings and the
//!   member → group directory consistent, plus profile assembly and the HTTP API.

pub mod leaderboard;
pub mod storage;
