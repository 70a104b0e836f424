//! Member API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{body, query, ApiParams, ApiResult};
use crate::models::{CreatedId, MemberUpsertRequest, Removed, RemoveMemberRequest};
use crate::AppState;

/// POST /v1/teams/{id}/members - Add a member to a team.
pub async fn add_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MemberUpsertRequest>, JsonRejection>,
) -> ApiResult<CreatedId> {
    let mut request = body(payload)?;
    request.id = id;
    state.service.add_member(request).await
}

/// DELETE /v1/teams/{id}/members/{member_number} - Remove a member from a team.
pub async fn remove_member(
    State(state): State<AppState>,
    Path((id, member_number)): Path<(String, String)>,
    params: Result<Query<ApiParams>, QueryRejection>,
) -> ApiResult<Removed> {
    let params = query(params)?;
    state
        .service
        .remove_member(RemoveMemberRequest {
            api: params.api,
            id,
            member_number,
            user_id: params.user_id,
        })
        .await
}
