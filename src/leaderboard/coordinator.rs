//! Ranking Coordinator
//!
//! Keeps the global ranking, the per-group rankings and the member → group
//! directory consistent with each other.
//!
//! ## Write discipline
//! Every mutation is expressed as one `Batch` and handed to the backend in a
//! single `execute` call. Whatever has to be known beforehand (current group,
//! current score) is read first; the write itself is all-or-nothing.
//!
//! Group rankings never receive their own arithmetic. After the global score
//! changes, the batch copies it into the group set (`CopyScore`), so a group
//! entry always equals the global entry it mirrors.

use super::config::LeaderboardConfig;
use super::error::{LeaderboardError, Result};
use super::keys::Keyspace;
use super::types::{GroupUpdate, LeaderboardStats, Member, UNRANKED};
use crate::storage::backend::{BackendExt, RankingBackend, expect_field, expect_score};
use crate::storage::batch::{Batch, Read, Reply};
use crate::storage::error::StoreError;

use std::sync::Arc;

pub struct Leaderboard {
    pub(super) config: LeaderboardConfig,
    pub(super) keys: Keyspace,
    pub(super) backend: Arc<dyn RankingBackend>,
}

impl Leaderboard {
    /// Builds a leaderboard without contacting the backend or validating `config`.
    pub fn new(config: LeaderboardConfig, backend: Arc<dyn RankingBackend>) -> Self {
        let config = config.normalized();
        let keys = Keyspace::new(&config.namespace);
        Self {
            config,
            keys,
            backend,
        }
    }

    /// Builds a leaderboard and checks that the backend answers.
    ///
    /// # Errors
    /// `InvalidInput` if the config fails `LeaderboardConfig::validate`,
    /// `BackendFailure` if the backend does not answer.
    pub async fn connect(config: LeaderboardConfig, backend: Arc<dyn RankingBackend>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| LeaderboardError::invalid(e.to_string()))?;
        backend.ping().await?;
        let leaderboard = Self::new(config, backend);
        tracing::info!(
            "Leaderboard '{}' connected (k={}, float_scores={})",
            leaderboard.config.namespace,
            leaderboard.config.k,
            leaderboard.config.float_scores
        );
        Ok(leaderboard)
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// Creates or overwrites a member's score and group.
    ///
    /// # Errors
    /// `InvalidInput` for an empty id or a negative or non-finite score.
    pub async fn add_member(&self, member: Member) -> Result<()> {
        require_id(&member.id)?;
        if !member.score.is_finite() || member.score < 0.0 {
            return Err(LeaderboardError::invalid(format!(
                "score must be a non-negative number, got {}",
                member.score
            )));
        }
        let score = self.config.apply_precision(member.score);
        let previous = self.backend.field(self.keys.directory(), &member.id).await?;

        let mut batch = Batch::new();
        batch
            .set_score(self.keys.global(), &member.id, score)
            .set_field(self.keys.directory(), &member.id, &member.group);
        self.drop_stale_group(&mut batch, &member.id, previous.as_deref(), &member.group);
        if !member.group.is_empty() {
            batch.set_score(&self.keys.group(&member.group), &member.id, score);
        }

        self.backend.execute(batch).await?;
        tracing::debug!("Added member {} (group '{}', score {})", member.id, member.group, score);
        Ok(())
    }

    /// Adds `delta` to a member's score, creating the member at `delta` if absent.
    ///
    /// `GroupUpdate::Set` also (re)assigns the group, moving the member out of
    /// its previous group in the same batch.
    ///
    /// # Errors
    /// `InvalidInput` for an empty id, or a delta that is zero (after the precision
    /// policy) or non-finite.
    pub async fn adjust_score(&self, id: &str, group: GroupUpdate, delta: f64) -> Result<()> {
        require_id(id)?;
        if !delta.is_finite() {
            return Err(LeaderboardError::invalid("score delta must be a finite number"));
        }
        let delta = self.config.apply_precision(delta);
        if delta == 0.0 {
            return Err(LeaderboardError::invalid("score delta must be non-zero"));
        }

        let current = self
            .backend
            .field(self.keys.directory(), id)
            .await?
            .unwrap_or_default();

        let mut batch = Batch::new();
        batch.incr_score(self.keys.global(), id, delta);
        let target = match group {
            GroupUpdate::Keep => current,
            GroupUpdate::Set(tag) => {
                batch.set_field(self.keys.directory(), id, &tag);
                self.drop_stale_group(&mut batch, id, Some(current.as_str()), &tag);
                tag
            }
        };
        if !target.is_empty() {
            batch.copy_score(self.keys.global(), &self.keys.group(&target), id);
        }

        self.backend.execute(batch).await?;
        tracing::debug!("Adjusted {} by {} (group '{}')", id, delta, target);
        Ok(())
    }

    /// Removes a member from every ranking. Removing an absent member succeeds.
    pub async fn remove_member(&self, id: &str) -> Result<()> {
        require_id(id)?;
        let group = self
            .backend
            .field(self.keys.directory(), id)
            .await?
            .unwrap_or_default();

        let mut batch = Batch::new();
        batch
            .remove_member(self.keys.global(), id)
            .remove_field(self.keys.directory(), id);
        if !group.is_empty() {
            batch.remove_member(&self.keys.group(&group), id);
        }

        self.backend.execute(batch).await?;
        tracing::debug!("Removed member {}", id);
        Ok(())
    }

    /// Moves an existing member to `new_group`, keeping its score.
    ///
    /// Moving a member to the group it is already in rewrites the same state.
    ///
    /// # Errors
    /// `InvalidInput` for an empty id or group, `NotFound` if the member has no score.
    pub async fn change_group(&self, id: &str, new_group: &str) -> Result<()> {
        require_id(id)?;
        if new_group.is_empty() {
            return Err(LeaderboardError::invalid("group must not be empty"));
        }

        let mut replies = self
            .backend
            .read(vec![
                Read::score(self.keys.global(), id),
                Read::field(self.keys.directory(), id),
            ])
            .await?
            .into_iter();
        let score = expect_score(next_reply(&mut replies)?)?;
        let old_group = expect_field(next_reply(&mut replies)?)?;

        if score.is_none() {
            return Err(LeaderboardError::NotFound(format!("member {}", id)));
        }

        let mut batch = Batch::new();
        batch
            .set_field(self.keys.directory(), id, new_group)
            .copy_score(self.keys.global(), &self.keys.group(new_group), id);
        self.drop_stale_group(&mut batch, id, old_group.as_deref(), new_group);

        self.backend.execute(batch).await?;
        tracing::debug!("Moved {} from '{}' to '{}'", id, old_group.unwrap_or_default(), new_group);
        Ok(())
    }

    /// 0-based global rank, `UNRANKED` if the member is absent.
    pub async fn rank_global(&self, id: &str) -> Result<i64> {
        let rank = self.backend.rev_rank(self.keys.global(), id).await?;
        Ok(to_rank(rank))
    }

    /// 0-based rank inside the member's current group, `UNRANKED` if the member
    /// is absent or ungrouped.
    pub async fn rank_in_group(&self, id: &str) -> Result<i64> {
        let group = self.group_of(id).await?;
        if group.is_empty() {
            return Ok(UNRANKED);
        }
        let rank = self.backend.rev_rank(&self.keys.group(&group), id).await?;
        Ok(to_rank(rank))
    }

    /// The top K members overall, each tagged with its current group.
    ///
    /// # Errors
    /// `EmptyScope` when nobody is ranked.
    pub async fn top_global(&self) -> Result<Vec<Member>> {
        let top = self.backend.rev_range(self.keys.global(), self.config.k).await?;
        if top.is_empty() {
            return Err(LeaderboardError::EmptyScope("global leaderboard".to_string()));
        }

        let ids: Vec<String> = top.iter().map(|entry| entry.member.clone()).collect();
        let groups = self.backend.fields(self.keys.directory(), &ids).await?;

        Ok(top
            .into_iter()
            .zip(groups)
            .map(|(entry, group)| Member {
                id: entry.member,
                group: group.unwrap_or_default(),
                score: entry.score,
            })
            .collect())
    }

    /// The top K members of `group`.
    ///
    /// # Errors
    /// `InvalidInput` for an empty group, `EmptyScope` when the group has no members.
    pub async fn top_in_group(&self, group: &str) -> Result<Vec<Member>> {
        if group.is_empty() {
            return Err(LeaderboardError::invalid("group must not be empty"));
        }
        let top = self
            .backend
            .rev_range(&self.keys.group(group), self.config.k)
            .await?;
        if top.is_empty() {
            return Err(LeaderboardError::EmptyScope(format!("group {}", group)));
        }

        Ok(top
            .into_iter()
            .map(|entry| Member {
                id: entry.member,
                group: group.to_string(),
                score: entry.score,
            })
            .collect())
    }

    /// # Errors
    /// `NotFound` if the member has no score.
    pub async fn score_of(&self, id: &str) -> Result<f64> {
        self.backend
            .score(self.keys.global(), id)
            .await?
            .ok_or_else(|| LeaderboardError::NotFound(format!("member {}", id)))
    }

    /// The member's group, or an empty string if it is ungrouped or unknown.
    pub async fn group_of(&self, id: &str) -> Result<String> {
        Ok(self
            .backend
            .field(self.keys.directory(), id)
            .await?
            .unwrap_or_default())
    }

    pub async fn stats(&self) -> Result<LeaderboardStats> {
        let members = self.backend.cardinality(self.keys.global()).await?;
        let groups = self.backend.count_sets(self.keys.group_prefix()).await?;
        Ok(LeaderboardStats {
            namespace: self.config.namespace.clone(),
            members,
            groups,
            max_members: self.config.max_members,
            max_groups: self.config.max_groups,
        })
    }

    fn drop_stale_group(&self, batch: &mut Batch, id: &str, previous: Option<&str>, next: &str) {
        if let Some(previous) = previous
            && !previous.is_empty()
            && previous != next
        {
            batch.remove_member(&self.keys.group(previous), id);
        }
    }
}

fn require_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(LeaderboardError::invalid("member id must not be empty"));
    }
    Ok(())
}

pub(super) fn to_rank(rank: Option<u64>) -> i64 {
    rank.map(|r| r as i64).unwrap_or(UNRANKED)
}

pub(super) fn next_reply(replies: &mut impl Iterator<Item = Reply>) -> Result<Reply> {
    replies
        .next()
        .ok_or_else(|| StoreError::protocol("read pipeline returned too few replies").into())
}
