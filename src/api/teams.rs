//! Team API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{body, query, ApiParams, ApiResult};
use crate::models::{
    CreateTeamRequest, CreatedId, DeleteCounts, DeleteTeamRequest, GetTeamRequest,
    GetTeamsByUserIdRequest, GetTeamsRequest, Team, UpsertTeamProjectRequest,
};
use crate::AppState;

/// POST /v1/teams - Create a team with its roster and skills.
pub async fn create_team(
    State(state): State<AppState>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> ApiResult<CreatedId> {
    let request = body(payload)?;
    state.service.create_team(request).await
}

/// DELETE /v1/teams/{id} - Delete a team and everything under it.
pub async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<ApiParams>, QueryRejection>,
) -> ApiResult<DeleteCounts> {
    let params = query(params)?;
    state
        .service
        .delete_team(DeleteTeamRequest {
            api: params.api,
            id,
            user_id: params.user_id,
        })
        .await
}

/// POST /v1/teams/{id}/project - Replace the team's project.
pub async fn upsert_team_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpsertTeamProjectRequest>, JsonRejection>,
) -> ApiResult<CreatedId> {
    let mut request = body(payload)?;
    request.id = id;
    state.service.upsert_team_project(request).await
}

/// GET /v1/teams/{id} - Get a single hydrated team.
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<ApiParams>, QueryRejection>,
) -> ApiResult<Team> {
    let params = query(params)?;
    state
        .service
        .get_team_by_team_id(GetTeamRequest {
            api: params.api,
            id,
        })
        .await
}

/// GET /v1/teams/users/{id} - Teams a user is a member of.
pub async fn get_teams_by_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<ApiParams>, QueryRejection>,
) -> ApiResult<Vec<Team>> {
    let params = query(params)?;
    state
        .service
        .get_teams_by_user_id(GetTeamsByUserIdRequest {
            api: params.api,
            id,
        })
        .await
}

/// GET /v1/teams?page=&limit= - Page through teams, optionally by skill or complexity.
pub async fn get_teams(
    State(state): State<AppState>,
    params: Result<Query<GetTeamsRequest>, QueryRejection>,
) -> ApiResult<Vec<Team>> {
    let request = query(params)?;
    state.service.get_teams(request).await
}
