//! Team service handler.
//!
//! Enforces the rules the store does not know about (API version, name
//! uniqueness, leader quota, ownership, capacity, duplicate membership) and
//! then delegates. No SQL lives here. Rejected business rules come back as a
//! `ResponseStatus` in a normal response; only protocol and data-access
//! failures are `Err`.

mod cache;
mod events;

pub use cache::*;
pub use events::*;

use std::collections::HashSet;
use std::sync::Arc;

use crate::db::TeamStore;
use crate::errors::AppError;
use crate::models::{
    ApiResponse, CreateTeamRequest, CreatedId, DeleteCounts, DeleteTeamRequest, GetTeamRequest,
    GetTeamsByUserIdRequest, GetTeamsRequest, MemberUpsertRequest, Page, Removed,
    RemoveMemberRequest, ResponseStatus, Team, TeamFilter, UpsertTeamProjectRequest,
};

/// API version implemented by this service.
pub const API_VERSION: &str = "v1";

/// Reject requests asking for a different API version. An empty version is accepted.
pub fn check_api(api: &str) -> Result<(), AppError> {
    if !api.is_empty() && api != API_VERSION {
        return Err(AppError::Unimplemented(format!(
            "unsupported API version: service implements API version '{}', but asked for '{}'",
            API_VERSION, api
        )));
    }
    Ok(())
}

fn parse_id(name: &str, value: &str) -> Result<i64, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("missing parameter '{}'", name)));
    }
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("parameter '{}' is not a valid id: {}", name, value)))
}

fn validate_new_team(team: &Team) -> Result<(), AppError> {
    if team.name.trim().is_empty() {
        return Err(AppError::BadRequest("team name is required".to_string()));
    }
    if team.leader.trim().is_empty() {
        return Err(AppError::BadRequest("team leader is required".to_string()));
    }
    if team.open_roles < 0 || team.size < 0 {
        return Err(AppError::BadRequest(
            "size and openRoles must not be negative".to_string(),
        ));
    }
    if team.open_roles > team.size {
        return Err(AppError::BadRequest(format!(
            "openRoles ({}) must not exceed size ({})",
            team.open_roles, team.size
        )));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = team.members.iter().find(|m| !seen.insert(m.id)) {
        return Err(AppError::BadRequest(format!(
            "member {} is listed more than once",
            dup.id
        )));
    }
    Ok(())
}

/// Request handler shared by every gateway.
#[derive(Clone)]
pub struct TeamService {
    store: Arc<dyn TeamStore>,
    cache: Arc<dyn TeamCache>,
    events: Arc<dyn EventPublisher>,
    max_teams_per_leader: i64,
}

impl TeamService {
    /// Create a handler with no-op cache and publisher.
    pub fn new(store: Arc<dyn TeamStore>, max_teams_per_leader: i64) -> Self {
        Self {
            store,
            cache: Arc::new(NoopCache),
            events: Arc::new(NoopPublisher),
            max_teams_per_leader,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn TeamCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = events;
        self
    }

    async fn emit(&self, kind: EventKind, team_id: i64) {
        let event = DomainEvent::new(kind, team_id);
        if let Err(e) = self.events.publish(&event).await {
            tracing::warn!(event = kind.as_str(), team_id, "Failed to publish event: {}", e);
        }
    }

    pub async fn create_team(
        &self,
        request: CreateTeamRequest,
    ) -> Result<ApiResponse<CreatedId>, AppError> {
        check_api(&request.api)?;
        let team = request.team;
        validate_new_team(&team)?;

        match self.store.get_team_by_name(&team.name).await {
            Ok(_) => {
                tracing::info!(name = %team.name, "create rejected: duplicate name");
                return Ok(ApiResponse::status(ResponseStatus::DuplicateName));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let owned = self.store.count_user_teams(&team.leader).await?;
        if owned >= self.max_teams_per_leader {
            tracing::info!(leader = %team.leader, owned, "create rejected: team quota reached");
            return Ok(ApiResponse::status(ResponseStatus::MaxTeamCount));
        }

        let team_id = match self.store.create_team(&team).await {
            Ok(id) => id,
            // A concurrent create with the same name won the race
            Err(AppError::Duplicate(_)) => {
                tracing::info!(name = %team.name, "create rejected: duplicate name at insert");
                return Ok(ApiResponse::status(ResponseStatus::DuplicateName));
            }
            Err(e) => return Err(e),
        };

        tracing::info!(team_id, name = %team.name, "team created");
        self.emit(EventKind::TeamCreated, team_id).await;

        Ok(ApiResponse::ok(CreatedId {
            id: team_id.to_string(),
        }))
    }

    pub async fn delete_team(
        &self,
        request: DeleteTeamRequest,
    ) -> Result<ApiResponse<DeleteCounts>, AppError> {
        check_api(&request.api)?;
        let team_id = parse_id("id", &request.id)?;

        if !self
            .store
            .check_user_owns_team(&request.user_id, team_id)
            .await?
        {
            tracing::info!(team_id, user = %request.user_id, "delete rejected: not owner");
            return Ok(ApiResponse::status(ResponseStatus::NotOwner));
        }

        let counts = self.store.delete_team(team_id).await?;
        self.cache.invalidate(team_id).await;
        self.emit(EventKind::TeamDeleted, team_id).await;

        Ok(ApiResponse::ok(counts))
    }

    pub async fn add_member(
        &self,
        request: MemberUpsertRequest,
    ) -> Result<ApiResponse<CreatedId>, AppError> {
        check_api(&request.api)?;
        let team_id = parse_id("id", &request.id)?;

        if self.store.check_team_size(team_id).await? {
            tracing::info!(team_id, "add member rejected: team full");
            return Ok(ApiResponse::status(ResponseStatus::Full));
        }
        if !self
            .store
            .check_user_owns_team(&request.user_id, team_id)
            .await?
        {
            tracing::info!(team_id, user = %request.user_id, "add member rejected: not owner");
            return Ok(ApiResponse::status(ResponseStatus::NotOwner));
        }
        if self
            .store
            .check_member_exists(request.member_id, team_id)
            .await?
        {
            tracing::info!(team_id, member = request.member_id, "add member rejected: already a member");
            return Ok(ApiResponse::status(ResponseStatus::AlreadyMember));
        }

        let member = crate::models::Member {
            id: request.member_id,
            email: request.member_email,
            role: request.role,
        };

        // The guards above are advisory; the store has the final word
        let member_number = match self.store.add_member(team_id, &member).await {
            Ok(n) => n,
            Err(AppError::TeamFull(_)) => return Ok(ApiResponse::status(ResponseStatus::Full)),
            Err(AppError::Duplicate(_)) => {
                return Ok(ApiResponse::status(ResponseStatus::AlreadyMember))
            }
            Err(e) => return Err(e),
        };

        self.cache.invalidate(team_id).await;
        self.emit(EventKind::MemberAdded, team_id).await;

        Ok(ApiResponse::ok(CreatedId {
            id: member_number.to_string(),
        }))
    }

    pub async fn remove_member(
        &self,
        request: RemoveMemberRequest,
    ) -> Result<ApiResponse<Removed>, AppError> {
        check_api(&request.api)?;
        let team_id = parse_id("id", &request.id)?;
        let member_number = parse_id("member_number", &request.member_number)?;

        if !self
            .store
            .check_user_owns_team(&request.user_id, team_id)
            .await?
        {
            tracing::info!(team_id, user = %request.user_id, "remove member rejected: not owner");
            return Ok(ApiResponse::status(ResponseStatus::NotOwner));
        }

        let removed = self.store.remove_member(team_id, member_number).await?;
        if removed == 0 {
            return Ok(ApiResponse::empty_with(Removed { removed }));
        }

        self.cache.invalidate(team_id).await;
        self.emit(EventKind::MemberRemoved, team_id).await;

        Ok(ApiResponse::ok(Removed { removed }))
    }

    pub async fn upsert_team_project(
        &self,
        request: UpsertTeamProjectRequest,
    ) -> Result<ApiResponse<CreatedId>, AppError> {
        check_api(&request.api)?;
        let team_id = parse_id("id", &request.id)?;
        if request.project.name.trim().is_empty() {
            return Err(AppError::BadRequest("project name is required".to_string()));
        }

        let project_id = match self.store.upsert_project(team_id, &request.project).await {
            Ok(id) => id,
            Err(e) if e.is_not_found() => return Ok(ApiResponse::status(ResponseStatus::Empty)),
            Err(e) => return Err(e),
        };

        self.cache.invalidate(team_id).await;
        self.emit(EventKind::ProjectUpserted, team_id).await;

        Ok(ApiResponse::ok(CreatedId {
            id: project_id.to_string(),
        }))
    }

    pub async fn get_team_by_team_id(
        &self,
        request: GetTeamRequest,
    ) -> Result<ApiResponse<Team>, AppError> {
        check_api(&request.api)?;
        let team_id = parse_id("id", &request.id)?;

        if let Some(team) = self.cache.get_entry(team_id).await {
            return Ok(ApiResponse::ok(team));
        }

        match self.store.get_team_by_id(team_id).await {
            Ok(team) => {
                self.cache.add_entry(&team).await;
                Ok(ApiResponse::ok(team))
            }
            Err(e) if e.is_not_found() => Ok(ApiResponse::status(ResponseStatus::Empty)),
            Err(e) => Err(e),
        }
    }

    pub async fn get_teams_by_user_id(
        &self,
        request: GetTeamsByUserIdRequest,
    ) -> Result<ApiResponse<Vec<Team>>, AppError> {
        check_api(&request.api)?;
        let user_id = parse_id("id", &request.id)?;

        let teams = self.store.get_teams_by_user_id(user_id).await?;
        Ok(wrap_list(teams))
    }

    pub async fn get_teams(
        &self,
        request: GetTeamsRequest,
    ) -> Result<ApiResponse<Vec<Team>>, AppError> {
        check_api(&request.api)?;

        let filter = match (request.skill, request.complexity) {
            (Some(skill), _) if !skill.trim().is_empty() => TeamFilter::Skill(skill),
            (_, Some(level)) => TeamFilter::Complexity(level),
            _ => TeamFilter::All,
        };
        let page = Page::new(request.page.unwrap_or(0), request.limit.unwrap_or(0));

        let teams = self.store.get_teams(&filter, page).await?;
        Ok(wrap_list(teams))
    }
}

fn wrap_list(teams: Vec<Team>) -> ApiResponse<Vec<Team>> {
    if teams.is_empty() {
        ApiResponse::empty_with(teams)
    } else {
        ApiResponse::ok(teams)
    }
}
