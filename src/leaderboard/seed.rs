use super::coordinator::Leaderboard;
use super::error::Result;
use super::types::Member;

use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Instant;

pub const DEFAULT_SEED_GROUPS: [&str; 5] = ["US", "UK", "CA", "DE", "FR"];
const MAX_SEED_SCORE: f64 = 1000.0;
const PROGRESS_EVERY: usize = 100_000;

/// Fills the leaderboard with `count` mock members named `user{i}`.
///
/// Scores are uniform in `[0, 1000)`; each member gets a random group from
/// `groups` (ungrouped when `groups` is empty). Returns the number inserted.
pub async fn seed_members(leaderboard: &Leaderboard, count: usize, groups: &[String]) -> Result<usize> {
    let start = Instant::now();
    tracing::info!("Generating {} mock members...", count);

    for i in 0..count {
        let (score, group) = {
            let mut rng = rand::thread_rng();
            let score = rng.gen_range(0.0..MAX_SEED_SCORE);
            let group = groups.choose(&mut rng).cloned().unwrap_or_default();
            (score, group)
        };

        leaderboard
            .add_member(Member::new(format!("user{}", i), group, score))
            .await?;

        if i > 0 && i % PROGRESS_EVERY == 0 {
            tracing::info!("Added {} members...", i);
        }
    }

    tracing::info!("Added {} members in {:?}", count, start.elapsed());
    Ok(count)
}
