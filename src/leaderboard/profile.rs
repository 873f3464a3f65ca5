//! Profile Assembly
//!
//! Builds the "profile page" view of one member in two read pipelines:
//!
//! 1. global rank, group, score and the global top K;
//! 2. the groups of the global top K, plus rank and top K inside the member's group.
//!
//! The group is resolved once, in the first pipeline, and reused for both
//! group-scoped reads. State may move between the two pipelines, so the result
//! is best-effort consistent rather than a snapshot.

use super::coordinator::{Leaderboard, next_reply, to_rank};
use super::error::{LeaderboardError, Result};
use super::types::{Member, Profile, UNRANKED};
use crate::storage::backend::{expect_field, expect_members, expect_rank, expect_score};
use crate::storage::batch::Read;

impl Leaderboard {
    /// Assembles a member's profile.
    ///
    /// Never fails because the member is unknown: missing data degrades to
    /// score 0, ranks `UNRANKED`, empty group and empty top lists.
    ///
    /// # Errors
    /// `InvalidInput` for an empty id, `BackendFailure` if a pipeline fails.
    pub async fn profile(&self, id: &str) -> Result<Profile> {
        if id.is_empty() {
            return Err(LeaderboardError::invalid("member id must not be empty"));
        }
        let k = self.config.k;

        let mut replies = self
            .backend
            .read(vec![
                Read::rev_rank(self.keys.global(), id),
                Read::field(self.keys.directory(), id),
                Read::score(self.keys.global(), id),
                Read::rev_range(self.keys.global(), k),
            ])
            .await?
            .into_iter();
        let global_rank = to_rank(expect_rank(next_reply(&mut replies)?)?);
        let group = expect_field(next_reply(&mut replies)?)?.unwrap_or_default();
        let score = expect_score(next_reply(&mut replies)?)?.unwrap_or(0.0);
        let top_global = expect_members(next_reply(&mut replies)?)?;

        let mut reads: Vec<Read> = top_global
            .iter()
            .map(|entry| Read::field(self.keys.directory(), &entry.member))
            .collect();
        if !group.is_empty() {
            let group_key = self.keys.group(&group);
            reads.push(Read::rev_rank(&group_key, id));
            reads.push(Read::rev_range(&group_key, k));
        }

        let mut top_k_global = Vec::with_capacity(top_global.len());
        let mut group_rank = UNRANKED;
        let mut top_k_group = Vec::new();

        if !reads.is_empty() {
            let mut replies = self.backend.read(reads).await?.into_iter();
            for entry in top_global {
                let member_group = expect_field(next_reply(&mut replies)?)?;
                top_k_global.push(Member {
                    id: entry.member,
                    group: member_group.unwrap_or_default(),
                    score: entry.score,
                });
            }
            if !group.is_empty() {
                group_rank = to_rank(expect_rank(next_reply(&mut replies)?)?);
                top_k_group = expect_members(next_reply(&mut replies)?)?
                    .into_iter()
                    .map(|entry| Member {
                        id: entry.member,
                        group: group.clone(),
                        score: entry.score,
                    })
                    .collect();
            }
        }

        if global_rank == UNRANKED {
            tracing::debug!("Profile requested for unranked member {}", id);
        }

        Ok(Profile {
            id: id.to_string(),
            score,
            group,
            global_rank,
            group_rank,
            top_k_global,
            top_k_group,
        })
    }
}
