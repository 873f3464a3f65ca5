//! Leaderboard Module
//!
//! Global and per-group rankings on top of a `RankingBackend`.
//!
//! ## Responsibilities
//! - **Coordination**: every mutation updates the global ranking, the member → group
//!   directory and the affected group rankings in one atomic batch.
//! - **Queries**: ranks, scores, groups and top-K listings for both scopes.
//! - **Profiles**: the combined "profile page" read, which degrades instead of failing
//!   for unknown members.
//! - **API**: the public HTTP endpoints and their error → status mapping.
//!
//! ## Submodules
//! - **`coordinator`**: `Leaderboard`, the mutation and query API.
//! - **`profile`**: profile assembly over two read pipelines.
//! - **`config`**: `LeaderboardConfig`, TOML loading and defaults.
//! - **`keys`**: namespaced key layout.
//! - **`seed`**: mock data generation.
//! - **`handlers`** / **`protocol`**: the Axum service and its DTOs.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod handlers;
pub mod keys;
pub mod profile;
pub mod protocol;
pub mod seed;
pub mod types;

#[cfg(test)]
mod tests;
