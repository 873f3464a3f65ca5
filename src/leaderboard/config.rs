use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_K: usize = 10;
pub const DEFAULT_MAX_MEMBERS: usize = 1_000_000;
pub const DEFAULT_MAX_GROUPS: usize = 200;

/// Settings for one leaderboard.
///
/// `max_members` and `max_groups` are advisory: they are reported by
/// `Leaderboard::stats` and logged when exceeded, never enforced on writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Prefix isolating this leaderboard's keys from others on the same backend.
    pub namespace: String,
    /// Size of every top-K listing.
    pub k: usize,
    pub max_members: usize,
    pub max_groups: usize,
    /// `true` keeps fractional scores, `false` truncates them toward zero.
    pub float_scores: bool,
    /// Store node address. `None` runs against an in-process store.
    pub store_addr: Option<String>,
    /// Bearer token presented to the store node.
    pub store_token: Option<String>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            k: DEFAULT_K,
            max_members: DEFAULT_MAX_MEMBERS,
            max_groups: DEFAULT_MAX_GROUPS,
            float_scores: false,
            store_addr: None,
            store_token: None,
        }
    }
}

impl LeaderboardConfig {
    /// Loads a config from a TOML file. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would let this namespace's keys collide with another's.
    ///
    /// Every key is `{namespace}:...`, so a namespace containing `:` could equal
    /// a prefix of a different namespace's keys (`x:entity:foo:global` is also a
    /// group key of namespace `x`).
    pub fn validate(&self) -> Result<()> {
        if self.namespace.contains(':') {
            bail!("namespace '{}' must not contain ':'", self.namespace);
        }
        Ok(())
    }

    /// Replaces empty or zero settings with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.namespace.trim().is_empty() {
            self.namespace = DEFAULT_NAMESPACE.to_string();
        }
        if self.k == 0 {
            self.k = DEFAULT_K;
        }
        if self.max_members == 0 {
            self.max_members = DEFAULT_MAX_MEMBERS;
        }
        if self.max_groups == 0 {
            self.max_groups = DEFAULT_MAX_GROUPS;
        }
        if self.store_addr.as_deref().is_some_and(|a| a.trim().is_empty()) {
            self.store_addr = None;
        }
        self
    }

    /// Applies the score precision policy.
    pub fn apply_precision(&self, value: f64) -> f64 {
        if self.float_scores { value } else { value.trunc() }
    }
}
