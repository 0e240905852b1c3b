use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::ActivityParams;
use crate::server::response::{ApiError, ApiResponse};

/// Newest first. Pass the returned `next_cursor` back as `before` for the next page.
pub async fn list_page_activities(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ActivityParams>,
) -> impl IntoResponse {
    let page = state
        .pages
        .activities(&user, id, params.subtree, params.before, params.limit)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}
