//! Atomic Batches
//!
//! A `Batch` is an ordered list of `StoreOp`s that a backend applies as one
//! indivisible unit: either every operation takes effect, or none does.
//! Reads run as `Read` pipelines, answered with one `Reply` per request.

use super::sorted::ScoredMember;
use serde::{Deserialize, Serialize};

/// A single write against a ranked set or a field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOp {
    /// Insert or overwrite a member's score.
    SetScore {
        key: String,
        member: String,
        score: f64,
    },
    /// Add `delta` to a member's score (missing counts as zero).
    IncrScore {
        key: String,
        member: String,
        delta: f64,
    },
    /// Set the member's score in `to` to its score in `from` at apply time.
    /// Removes the member from `to` when `from` does not hold it.
    CopyScore {
        from: String,
        to: String,
        member: String,
    },
    RemoveMember { key: String, member: String },
    SetField {
        key: String,
        field: String,
        value: String,
    },
    RemoveField { key: String, field: String },
}

impl StoreOp {
    /// Key written by this operation.
    pub fn target(&self) -> &str {
        match self {
            StoreOp::SetScore { key, .. }
            | StoreOp::IncrScore { key, .. }
            | StoreOp::RemoveMember { key, .. }
            | StoreOp::SetField { key, .. }
            | StoreOp::RemoveField { key, .. } => key,
            StoreOp::CopyScore { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    ops: Vec<StoreOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_score(&mut self, key: &str, member: &str, score: f64) -> &mut Self {
        self.push(StoreOp::SetScore {
            key: key.to_string(),
            member: member.to_string(),
            score,
        })
    }

    pub fn incr_score(&mut self, key: &str, member: &str, delta: f64) -> &mut Self {
        self.push(StoreOp::IncrScore {
            key: key.to_string(),
            member: member.to_string(),
            delta,
        })
    }

    pub fn copy_score(&mut self, from: &str, to: &str, member: &str) -> &mut Self {
        self.push(StoreOp::CopyScore {
            from: from.to_string(),
            to: to.to_string(),
            member: member.to_string(),
        })
    }

    pub fn remove_member(&mut self, key: &str, member: &str) -> &mut Self {
        self.push(StoreOp::RemoveMember {
            key: key.to_string(),
            member: member.to_string(),
        })
    }

    pub fn set_field(&mut self, key: &str, field: &str, value: &str) -> &mut Self {
        self.push(StoreOp::SetField {
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    pub fn remove_field(&mut self, key: &str, field: &str) -> &mut Self {
        self.push(StoreOp::RemoveField {
            key: key.to_string(),
            field: field.to_string(),
        })
    }

    pub fn push(&mut self, op: StoreOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// A single read in a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "read", rename_all = "snake_case")]
pub enum Read {
    Score { key: String, member: String },
    RevRank { key: String, member: String },
    /// Highest-scored members first, at most `limit` of them.
    RevRange { key: String, limit: usize },
    Field { key: String, field: String },
    Cardinality { key: String },
    /// Number of non-empty ranked sets whose key starts with `prefix`.
    CountSets { prefix: String },
}

impl Read {
    pub fn score(key: &str, member: &str) -> Self {
        Read::Score {
            key: key.to_string(),
            member: member.to_string(),
        }
    }

    pub fn rev_rank(key: &str, member: &str) -> Self {
        Read::RevRank {
            key: key.to_string(),
            member: member.to_string(),
        }
    }

    pub fn rev_range(key: &str, limit: usize) -> Self {
        Read::RevRange {
            key: key.to_string(),
            limit,
        }
    }

    pub fn field(key: &str, field: &str) -> Self {
        Read::Field {
            key: key.to_string(),
            field: field.to_string(),
        }
    }
}

/// Answer to one `Read`, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reply", content = "value", rename_all = "snake_case")]
pub enum Reply {
    Score(Option<f64>),
    Rank(Option<u64>),
    Members(Vec<ScoredMember>),
    Field(Option<String>),
    Count(u64),
}
