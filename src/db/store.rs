//! Persistence seam between the service handler and SQL.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{DeleteCounts, Member, Page, Project, Team, TeamFilter};

/// Every persistence operation the handler needs.
///
/// Implementations own their transaction boundaries: each call is atomic on
/// its own and never holds a transaction past its return.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Insert a team with its members and skills; returns the generated id.
    async fn create_team(&self, team: &Team) -> Result<i64, AppError>;

    /// Delete a team and all of its children.
    async fn delete_team(&self, team_id: i64) -> Result<DeleteCounts, AppError>;

    /// Insert a member and take one open role; returns the member row id.
    async fn add_member(&self, team_id: i64, member: &Member) -> Result<i64, AppError>;

    /// Remove a member row by its row id; returns rows affected.
    async fn remove_member(&self, team_id: i64, member_number: i64) -> Result<u64, AppError>;

    /// Replace the team's project and languages; returns the project row id.
    async fn upsert_project(&self, team_id: i64, project: &Project) -> Result<i64, AppError>;

    /// `AppError::NotFound` when the team row does not exist.
    async fn get_team_by_id(&self, team_id: i64) -> Result<Team, AppError>;

    async fn get_team_by_name(&self, name: &str) -> Result<Team, AppError>;

    async fn get_teams_by_user_id(&self, user_id: i64) -> Result<Vec<Team>, AppError>;

    async fn get_teams(&self, filter: &TeamFilter, page: Page) -> Result<Vec<Team>, AppError>;

    /// Number of teams led by `leader`.
    async fn count_user_teams(&self, leader: &str) -> Result<i64, AppError>;

    async fn check_user_owns_team(&self, leader: &str, team_id: i64) -> Result<bool, AppError>;

    async fn check_member_exists(&self, user_id: i64, team_id: i64) -> Result<bool, AppError>;

    /// True when the team has no open role left.
    async fn check_team_size(&self, team_id: i64) -> Result<bool, AppError>;
}
