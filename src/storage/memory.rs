use super::backend::RankingBackend;
use super::batch::{Batch, Read, Reply, StoreOp};
use super::error::{StoreError, StoreResult};
use super::sorted::RankedSet;

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

const MAX_TRACKED_OPS: usize = 10_000;
const OP_RETENTION_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone)]
enum Value {
    Ranked(RankedSet),
    Fields(HashMap<String, String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Ranked,
    Fields,
}

impl Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Ranked(_) => Kind::Ranked,
            Value::Fields(_) => Kind::Fields,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Value::Ranked(set) => set.is_empty(),
            Value::Fields(map) => map.is_empty(),
        }
    }
}

/// In-process ranking backend.
///
/// Every batch runs under the write half of a single lock after the whole
/// batch has been validated, so a batch is observed entirely or not at all.
/// Keys whose value becomes empty are dropped.
pub struct MemoryBackend {
    data: RwLock<HashMap<String, Value>>,
    processed_ops: DashMap<String, u64>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            processed_ops: DashMap::new(),
        }
    }

    /// Applies `batch` unless a batch with the same `op_id` was already applied.
    ///
    /// Returns `false` for a duplicate.
    pub async fn execute_once(&self, op_id: &str, batch: Batch) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        if self.processed_ops.contains_key(op_id) {
            tracing::debug!("Skipping already applied batch {}", op_id);
            return Ok(false);
        }
        apply_batch(&mut data, &batch)?;
        self.remember_op(op_id);
        Ok(true)
    }

    fn remember_op(&self, op_id: &str) {
        let now = now_ms();
        if self.processed_ops.len() >= MAX_TRACKED_OPS {
            self.processed_ops
                .retain(|_, applied_at| now.saturating_sub(*applied_at) < OP_RETENTION_MS);
            if self.processed_ops.len() >= MAX_TRACKED_OPS {
                self.processed_ops.clear();
            }
        }
        self.processed_ops.insert(op_id.to_string(), now);
    }

    pub async fn key_count(&self) -> usize {
        self.data.read().await.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RankingBackend for MemoryBackend {
    async fn execute(&self, batch: Batch) -> StoreResult<()> {
        let mut data = self.data.write().await;
        apply_batch(&mut data, &batch)
    }

    async fn read(&self, reads: Vec<Read>) -> StoreResult<Vec<Reply>> {
        let data = self.data.read().await;
        reads.iter().map(|read| answer(&data, read)).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

fn apply_batch(data: &mut HashMap<String, Value>, batch: &Batch) -> StoreResult<()> {
    validate(data, batch)?;
    for op in batch.ops() {
        apply_op(data, op);
    }
    tracing::debug!("Applied batch of {} ops", batch.len());
    Ok(())
}

/// Dry-runs the batch against the current state so that applying it cannot fail.
fn validate(data: &HashMap<String, Value>, batch: &Batch) -> StoreResult<()> {
    let mut kinds: HashMap<&str, Kind> = HashMap::new();
    let mut pending: HashMap<(&str, &str), Option<f64>> = HashMap::new();

    for op in batch.ops() {
        let expected = match op {
            StoreOp::SetField { .. } | StoreOp::RemoveField { .. } => Kind::Fields,
            _ => Kind::Ranked,
        };
        let key = op.target();
        let kind = match kinds.get(key) {
            Some(kind) => Some(*kind),
            None => data.get(key).map(Value::kind),
        };
        if kind.is_some_and(|kind| kind != expected) {
            return Err(StoreError::WrongType {
                key: key.to_string(),
            });
        }
        kinds.insert(key, expected);

        match op {
            StoreOp::SetScore { key, member, score } => {
                if !score.is_finite() {
                    return Err(invalid_score(key, member));
                }
                pending.insert((key.as_str(), member.as_str()), Some(*score));
            }
            StoreOp::IncrScore { key, member, delta } => {
                let updated = staged_score(data, &pending, key, member).unwrap_or(0.0) + delta;
                if !updated.is_finite() {
                    return Err(invalid_score(key, member));
                }
                pending.insert((key.as_str(), member.as_str()), Some(updated));
            }
            StoreOp::CopyScore { from, to, member } => {
                let source_kind = match kinds.get(from.as_str()) {
                    Some(kind) => Some(*kind),
                    None => data.get(from).map(Value::kind),
                };
                if source_kind == Some(Kind::Fields) {
                    return Err(StoreError::WrongType { key: from.clone() });
                }
                let copied = staged_score(data, &pending, from, member);
                pending.insert((to.as_str(), member.as_str()), copied);
            }
            StoreOp::RemoveMember { key, member } => {
                pending.insert((key.as_str(), member.as_str()), None);
            }
            StoreOp::SetField { .. } | StoreOp::RemoveField { .. } => {}
        }
    }

    Ok(())
}

/// Score of `member` in `key` as it would be after the ops validated so far.
fn staged_score<'a>(
    data: &HashMap<String, Value>,
    pending: &HashMap<(&'a str, &'a str), Option<f64>>,
    key: &'a str,
    member: &'a str,
) -> Option<f64> {
    match pending.get(&(key, member)) {
        Some(score) => *score,
        None => match data.get(key) {
            Some(Value::Ranked(set)) => set.score(member),
            _ => None,
        },
    }
}

fn apply_op(data: &mut HashMap<String, Value>, op: &StoreOp) {
    match op {
        StoreOp::SetScore { key, member, score } => {
            if let Some(set) = ranked_mut(data, key) {
                set.upsert(member, *score);
            }
        }
        StoreOp::IncrScore { key, member, delta } => {
            if let Some(set) = ranked_mut(data, key) {
                set.incr(member, *delta);
            }
        }
        StoreOp::CopyScore { from, to, member } => {
            let source = match data.get(from) {
                Some(Value::Ranked(set)) => set.score(member),
                _ => None,
            };
            match source {
                Some(score) => {
                    if let Some(set) = ranked_mut(data, to) {
                        set.upsert(member, score);
                    }
                }
                None => remove_member(data, to, member),
            }
        }
        StoreOp::RemoveMember { key, member } => remove_member(data, key, member),
        StoreOp::SetField { key, field, value } => {
            let entry = data
                .entry(key.clone())
                .or_insert_with(|| Value::Fields(HashMap::new()));
            if let Value::Fields(map) = entry {
                map.insert(field.clone(), value.clone());
            }
        }
        StoreOp::RemoveField { key, field } => {
            if let Some(Value::Fields(map)) = data.get_mut(key) {
                map.remove(field);
            }
            drop_if_empty(data, key);
        }
    }
}

/// `None` only for a field map, which `validate` has already ruled out.
fn ranked_mut<'a>(data: &'a mut HashMap<String, Value>, key: &str) -> Option<&'a mut RankedSet> {
    match data
        .entry(key.to_string())
        .or_insert_with(|| Value::Ranked(RankedSet::new()))
    {
        Value::Ranked(set) => Some(set),
        Value::Fields(_) => None,
    }
}

fn remove_member(data: &mut HashMap<String, Value>, key: &str, member: &str) {
    if let Some(Value::Ranked(set)) = data.get_mut(key) {
        set.remove(member);
    }
    drop_if_empty(data, key);
}

fn drop_if_empty(data: &mut HashMap<String, Value>, key: &str) {
    if data.get(key).is_some_and(Value::is_empty) {
        data.remove(key);
    }
}

fn answer(data: &HashMap<String, Value>, read: &Read) -> StoreResult<Reply> {
    let reply = match read {
        Read::Score { key, member } => Reply::Score(ranked(data, key)?.and_then(|s| s.score(member))),
        Read::RevRank { key, member } => Reply::Rank(
            ranked(data, key)?
                .and_then(|s| s.rev_rank(member))
                .map(|rank| rank as u64),
        ),
        Read::RevRange { key, limit } => Reply::Members(
            ranked(data, key)?
                .map(|s| s.top(*limit))
                .unwrap_or_default(),
        ),
        Read::Field { key, field } => Reply::Field(match data.get(key) {
            Some(Value::Fields(map)) => map.get(field).cloned(),
            Some(Value::Ranked(_)) => {
                return Err(StoreError::WrongType { key: key.clone() });
            }
            None => None,
        }),
        Read::Cardinality { key } => Reply::Count(match data.get(key) {
            Some(Value::Ranked(set)) => set.len() as u64,
            Some(Value::Fields(map)) => map.len() as u64,
            None => 0,
        }),
        Read::CountSets { prefix } => Reply::Count(
            data.iter()
                .filter(|(key, value)| {
                    key.starts_with(prefix.as_str())
                        && matches!(value, Value::Ranked(set) if !set.is_empty())
                })
                .count() as u64,
        ),
    };
    Ok(reply)
}

fn ranked<'a>(data: &'a HashMap<String, Value>, key: &str) -> StoreResult<Option<&'a RankedSet>> {
    match data.get(key) {
        Some(Value::Ranked(set)) => Ok(Some(set)),
        Some(Value::Fields(_)) => Err(StoreError::WrongType {
            key: key.to_string(),
        }),
        None => Ok(None),
    }
}

fn invalid_score(key: &str, member: &str) -> StoreError {
    StoreError::InvalidScore {
        key: key.to_string(),
        member: member.to_string(),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
