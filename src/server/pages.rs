use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::{
    AccessResponse, CountResponse, DocumentRequest, ListPagesParams, MovePageRequest,
};
use crate::server::response::{ApiError, ApiResponse};
use crate::service::CreatePage;
use crate::types::{NewAsset, PageQuery, PageUpdate};

pub async fn list_pages(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPagesParams>,
) -> impl IntoResponse {
    let view_types = params.parse_view_types().map_err(ApiError::bad_request)?;

    let query = PageQuery {
        org_id: None,
        space_id: params.space_id,
        is_archived: Some(params.archived),
        parent_id: params.parent_id,
        is_all: params.all,
        view_types,
        path_prefix: None,
        offset: params.offset.unwrap_or(0),
        limit: params.limit.unwrap_or(0),
    };

    let pages = state.pages.list(&user, query)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(pages)))
}

pub async fn create_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePage>,
) -> impl IntoResponse {
    let page = state.pages.create(&user, req)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(page))))
}

pub async fn get_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let page = state.pages.get(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}

pub async fn update_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<PageUpdate>,
) -> impl IntoResponse {
    let page = state.pages.update(&user, id, &req)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}

pub async fn delete_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.pages.delete(&user, id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn move_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<MovePageRequest>,
) -> impl IntoResponse {
    let page = state.pages.move_page(&user, id, req.parent_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}

pub async fn archive_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let count = state.pages.archive(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(CountResponse { count })))
}

pub async fn restore_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let count = state.pages.restore(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(CountResponse { count })))
}

pub async fn visit_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let page = state.pages.visit(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}

pub async fn get_document(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let document = state.pages.get_document(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(document)))
}

pub async fn update_document(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<DocumentRequest>,
) -> impl IntoResponse {
    let document = state.pages.update_document(&user, id, &req.content)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(document)))
}

pub async fn list_assets(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let assets = state.pages.list_assets(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(assets)))
}

pub async fn upload_asset(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<NewAsset>,
) -> impl IntoResponse {
    let asset = state.pages.upload_asset(&user, id, &req)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(asset))))
}

pub async fn get_access(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let access = state.pages.effective_access(&user, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(AccessResponse::from(access))))
}
