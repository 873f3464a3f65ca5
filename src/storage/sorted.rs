//! Ordered Ranking Set
//!
//! A score-ordered set of unique members, the building block behind every
//! ranking scope (global and per-group).
//!
//! ## Layout
//! - `order`: `(score, member)` keys in an order-statistic tree.
//! - `scores`: member → score index for O(1) point lookups.
//!
//! Member strings are shared between both indexes via `Arc<str>`.
//!
//! Ranks are reported in **descending** order (rank 0 = highest score), which
//! is the mirror of the tree's ascending position. Equal scores therefore rank
//! by member name descending.
//!
//! ## Complexity
//! - `upsert` / `incr` / `remove` / `rev_rank`: O(log n)
//! - `score`: O(1)
//! - `top`: O(log n + k)

use super::order_tree::OrderTree;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A member together with its score, as returned by range scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RankedSet {
    order: OrderTree,
    scores: HashMap<Arc<str>, OrderedFloat<f64>>,
}

impl RankedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Inserts `member` or overwrites its score. Returns `true` if the member is new.
    pub fn upsert(&mut self, member: &str, score: f64) -> bool {
        let new_score = OrderedFloat(score);

        match self.scores.get_key_value(member) {
            Some((name, &old_score)) => {
                if old_score == new_score {
                    return false;
                }
                let name = name.clone();
                self.order.remove(old_score, &name);
                self.order.insert(new_score, name.clone());
                self.scores.insert(name, new_score);
                false
            }
            None => {
                let name: Arc<str> = Arc::from(member);
                self.order.insert(new_score, name.clone());
                self.scores.insert(name, new_score);
                true
            }
        }
    }

    /// Adds `delta` to the member's score, treating a missing member as zero.
    /// Returns the resulting score.
    pub fn incr(&mut self, member: &str, delta: f64) -> f64 {
        let updated = self.score(member).unwrap_or(0.0) + delta;
        self.upsert(member, updated);
        updated
    }

    /// Removes `member`. Returns `true` if it was present.
    pub fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove_entry(member) {
            Some((name, score)) => {
                self.order.remove(score, &name);
                true
            }
            None => false,
        }
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).map(|score| score.0)
    }

    /// 0-based rank in descending score order, `None` if absent.
    pub fn rev_rank(&self, member: &str) -> Option<usize> {
        let &score = self.scores.get(member)?;
        let position = self.order.rank(score, member)?;
        Some(self.order.len() - 1 - position)
    }

    /// Up to `limit` members, highest score first.
    pub fn top(&self, limit: usize) -> Vec<ScoredMember> {
        self.order
            .descending(limit)
            .into_iter()
            .map(|(score, member)| ScoredMember {
                member: member.to_string(),
                score: score.0,
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let keys = self.order.assert_invariants();
        assert_eq!(keys.len(), self.scores.len());
        for (score, member) in &keys {
            assert_eq!(self.scores.get(member), Some(score));
        }
    }
}
