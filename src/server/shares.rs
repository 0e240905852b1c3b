use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};

// Public tokens

pub async fn list_tokens(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let tokens = state.pages.list_public_tokens(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(tokens)))
}

pub async fn create_token(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let token = state.pages.create_public_token(&user, id)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(token))))
}

pub async fn archive_token(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, token_id)): Path<(i64, String)>,
) -> impl IntoResponse {
    state.pages.archive_public_token(&user, id, &token_id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// Anonymous read through a live public token.
pub async fn open_public_page(
    State(state): State<Arc<AppState>>,
    Path(token_id): Path<String>,
) -> impl IntoResponse {
    let page = state.pages.resolve_public_token(&token_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}

// Stars

pub async fn star_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let star = state.pages.star(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(star)))
}

pub async fn unstar_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.pages.unstar(&user, id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_stars(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let starred = state.pages.list_starred(&user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(starred)))
}
