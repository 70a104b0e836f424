//! Typed request envelopes, one per operation.
//!
//! Path parameters arrive as strings and are parsed by the handler so a
//! malformed id is reported the same way no matter which gateway decoded it.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use super::{Project, Team};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    #[serde(default)]
    pub api: String,
    pub team: Team,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteTeamRequest {
    pub api: String,
    /// Team id
    pub id: String,
    /// Requesting user, must be the team leader
    pub user_id: String,
}

/// Adds a member to team `id` on behalf of `user_id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpsertRequest {
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub member_id: i64,
    #[serde(default)]
    pub member_email: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default)]
pub struct RemoveMemberRequest {
    pub api: String,
    pub id: String,
    /// Row id returned by AddMember
    pub member_number: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertTeamProjectRequest {
    #[serde(default)]
    pub api: String,
    #[serde(default)]
    pub id: String,
    pub project: Project,
}

#[derive(Debug, Clone, Default)]
pub struct GetTeamRequest {
    pub api: String,
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct GetTeamsByUserIdRequest {
    pub api: String,
    pub id: String,
}

/// Query of `GET /v1/teams`. Empty numeric parameters (`?page=&limit=`) count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetTeamsRequest {
    #[serde(default)]
    pub api: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub limit: Option<i64>,
    /// Skill or member role to filter on
    #[serde(default)]
    pub skill: Option<String>,
    /// Project complexity level to filter on
    #[serde(default, deserialize_with = "empty_as_none")]
    pub complexity: Option<i64>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
