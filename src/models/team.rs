//! Team aggregate: the team row plus its members, skills and optional project.

use serde::{Deserialize, Serialize};

/// A team with everything hanging off it.
///
/// `id` is generated by the store and exposed as a string; it is ignored
/// on create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub id: String,
    /// Owner identifier
    pub leader: String,
    pub name: String,
    /// Seats still unfilled
    #[serde(default)]
    pub open_roles: i64,
    /// Capacity
    #[serde(default)]
    pub size: i64,
    /// RFC 3339 timestamp of the last mutation
    #[serde(default)]
    pub last_active: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

/// A user's seat on a team. `id` is the user identifier, not the row id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

/// The (at most one) project a team works on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Goal of the project
    #[serde(default)]
    pub description: String,
    pub name: String,
    #[serde(default)]
    pub github_link: String,
    /// Ordinal difficulty level
    #[serde(default)]
    pub complexity: i64,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Rows removed per table by a team delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCounts {
    pub teams: u64,
    pub members: u64,
    pub skills: u64,
    pub projects: u64,
    pub languages: u64,
}

/// How `GetTeams` narrows the set of team ids before paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamFilter {
    /// Teams listing the skill, or with a member in that role
    Skill(String),
    /// Teams whose project has this complexity level
    Complexity(i64),
    All,
}

/// Offset pagination over ascending team ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: i64, limit: i64) -> Self {
        let limit = if limit <= 0 {
            Self::DEFAULT_LIMIT
        } else {
            limit.min(Self::MAX_LIMIT)
        };
        Self {
            page: page.max(0),
            limit,
        }
    }

    /// Index of the first item: `limit * (page - 1)`, pages 0 and 1 both start at 0.
    /// Saturates at `i64::MAX`, which simply yields an empty page.
    pub fn offset(&self) -> i64 {
        if self.page > 1 {
            self.limit.saturating_mul(self.page - 1)
        } else {
            0
        }
    }
}
