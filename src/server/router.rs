use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::{activities, pages, roles, shares};
use crate::activity::ActivityRecorder;
use crate::cache::Cache;
use crate::config::AppConfig;
use crate::events::EventPublisher;
use crate::service::{PageService, WorkspaceService};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub pages: PageService,
    pub workspace: WorkspaceService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        events: Arc<dyn EventPublisher>,
        cache: Arc<dyn Cache>,
        config: &AppConfig,
    ) -> Self {
        let activity = ActivityRecorder::new(store.clone(), config.activity);
        let pages = PageService::new(store.clone(), events, activity, config.pages);
        let workspace = WorkspaceService::new(
            store.clone(),
            cache,
            Duration::from_secs(config.cache.user_ttl_secs),
        );

        Self {
            store,
            pages,
            workspace,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Pages
        .route("/pages", get(pages::list_pages).post(pages::create_page))
        .route(
            "/pages/{id}",
            get(pages::get_page)
                .patch(pages::update_page)
                .delete(pages::delete_page),
        )
        .route("/pages/{id}/move", post(pages::move_page))
        .route("/pages/{id}/archive", post(pages::archive_page))
        .route("/pages/{id}/restore", post(pages::restore_page))
        .route("/pages/{id}/visit", post(pages::visit_page))
        .route(
            "/pages/{id}/document",
            get(pages::get_document).put(pages::update_document),
        )
        .route(
            "/pages/{id}/assets",
            get(pages::list_assets).post(pages::upload_asset),
        )
        .route("/pages/{id}/access", get(pages::get_access))
        // Roles
        .route(
            "/pages/{id}/roles",
            get(roles::list_roles)
                .post(roles::share_page)
                .put(roles::set_role),
        )
        .route("/pages/{id}/roles/{role_id}", delete(roles::remove_role))
        // Public tokens
        .route(
            "/pages/{id}/tokens",
            get(shares::list_tokens).post(shares::create_token),
        )
        .route(
            "/pages/{id}/tokens/{token_id}",
            delete(shares::archive_token),
        )
        .route("/public/{token_id}", get(shares::open_public_page))
        // Stars
        .route(
            "/pages/{id}/star",
            put(shares::star_page).delete(shares::unstar_page),
        )
        .route("/stars", get(shares::list_stars))
        // Activity
        .route(
            "/pages/{id}/activities",
            get(activities::list_page_activities),
        )
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
