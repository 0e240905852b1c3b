use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::ShareRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::RoleGrant;

pub async fn list_roles(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let roles = state.pages.list_roles(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(roles)))
}

/// Invites grantees; existing rows are left as they are.
pub async fn share_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ShareRequest>,
) -> impl IntoResponse {
    let roles = state.pages.share(&user, id, &req.grants, req.propagate)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(roles))))
}

/// Sets one grantee's role, overwriting any existing row.
pub async fn set_role(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<RoleGrant>,
) -> impl IntoResponse {
    let role = state.pages.set_role(&user, id, &req)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(role)))
}

pub async fn remove_role(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, role_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    state.pages.remove_role(&user, id, role_id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
