use serde::{Deserialize, Serialize};

/// Rank reported for an identity that is not present in a scope.
pub const UNRANKED: i64 = -1;

/// A single leaderboard entry.
///
/// An empty `group` means the member is ungrouped. On the wire the group is `entity`,
/// matching `Profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default, rename = "entity")]
    pub group: String,
    pub score: f64,
}

impl Member {
    pub fn new(id: impl Into<String>, group: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            score,
        }
    }
}

/// What a score adjustment does to the member's group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupUpdate {
    /// Leave the member in whatever group it currently belongs to.
    #[default]
    Keep,
    /// Assign this group. An empty tag ungroups the member.
    Set(String),
}

impl GroupUpdate {
    /// `None` keeps the current group, `Some(tag)` assigns it.
    pub fn from_option(group: Option<String>) -> Self {
        match group {
            Some(tag) => GroupUpdate::Set(tag),
            None => GroupUpdate::Keep,
        }
    }
}

/// Everything a profile page shows for one identity.
///
/// Missing data degrades to defaults: score 0, ranks `UNRANKED`, empty group
/// and empty top lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "userID")]
    pub id: String,
    pub score: f64,
    #[serde(rename = "entity")]
    pub group: String,
    pub global_rank: i64,
    #[serde(rename = "entityRank")]
    pub group_rank: i64,
    pub top_k_global: Vec<Member>,
    #[serde(rename = "topKEntity")]
    pub top_k_group: Vec<Member>,
}

/// Population counts alongside the advisory limits they are checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardStats {
    pub namespace: String,
    pub members: u64,
    pub groups: u64,
    pub max_members: usize,
    pub max_groups: usize,
}

impl LeaderboardStats {
    pub fn over_member_limit(&self) -> bool {
        self.members > self.max_members as u64
    }

    pub fn over_group_limit(&self) -> bool {
        self.groups > self.max_groups as u64
    }
}
