use super::batch::{Batch, Read, Reply};
use super::error::{StoreError, StoreResult};
use super::sorted::ScoredMember;

use async_trait::async_trait;

/// The seam between the leaderboard and wherever its ranked sets live.
///
/// Implementations must apply a `Batch` all-or-nothing and answer a read
/// pipeline with exactly one `Reply` per `Read`, in order.
#[async_trait]
pub trait RankingBackend: Send + Sync {
    async fn execute(&self, batch: Batch) -> StoreResult<()>;

    async fn read(&self, reads: Vec<Read>) -> StoreResult<Vec<Reply>>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Single-read conveniences layered over `RankingBackend::read`.
#[async_trait]
pub trait BackendExt: RankingBackend {
    async fn read_one(&self, read: Read) -> StoreResult<Reply> {
        self.read(vec![read])
            .await?
            .pop()
            .ok_or_else(|| StoreError::protocol("empty reply to single read"))
    }

    async fn score(&self, key: &str, member: &str) -> StoreResult<Option<f64>> {
        expect_score(self.read_one(Read::score(key, member)).await?)
    }

    async fn rev_rank(&self, key: &str, member: &str) -> StoreResult<Option<u64>> {
        expect_rank(self.read_one(Read::rev_rank(key, member)).await?)
    }

    async fn rev_range(&self, key: &str, limit: usize) -> StoreResult<Vec<ScoredMember>> {
        expect_members(self.read_one(Read::rev_range(key, limit)).await?)
    }

    async fn field(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        expect_field(self.read_one(Read::field(key, field)).await?)
    }

    async fn fields(&self, key: &str, fields: &[String]) -> StoreResult<Vec<Option<String>>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let reads = fields.iter().map(|f| Read::field(key, f)).collect();
        self.read(reads).await?.into_iter().map(expect_field).collect()
    }

    async fn cardinality(&self, key: &str) -> StoreResult<u64> {
        expect_count(
            self.read_one(Read::Cardinality {
                key: key.to_string(),
            })
            .await?,
        )
    }

    async fn count_sets(&self, prefix: &str) -> StoreResult<u64> {
        expect_count(
            self.read_one(Read::CountSets {
                prefix: prefix.to_string(),
            })
            .await?,
        )
    }
}

impl<T: RankingBackend + ?Sized> BackendExt for T {}

pub fn expect_score(reply: Reply) -> StoreResult<Option<f64>> {
    match reply {
        Reply::Score(score) => Ok(score),
        other => Err(mismatch("score", &other)),
    }
}

pub fn expect_rank(reply: Reply) -> StoreResult<Option<u64>> {
    match reply {
        Reply::Rank(rank) => Ok(rank),
        other => Err(mismatch("rank", &other)),
    }
}

pub fn expect_members(reply: Reply) -> StoreResult<Vec<ScoredMember>> {
    match reply {
        Reply::Members(members) => Ok(members),
        other => Err(mismatch("members", &other)),
    }
}

pub fn expect_field(reply: Reply) -> StoreResult<Option<String>> {
    match reply {
        Reply::Field(value) => Ok(value),
        other => Err(mismatch("field", &other)),
    }
}

pub fn expect_count(reply: Reply) -> StoreResult<u64> {
    match reply {
        Reply::Count(n) => Ok(n),
        other => Err(mismatch("count", &other)),
    }
}

fn mismatch(expected: &str, got: &Reply) -> StoreError {
    StoreError::protocol(format!("expected {} reply, got {:?}", expected, got))
}
