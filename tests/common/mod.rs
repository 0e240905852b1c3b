#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use folio::cache::MemoryCache;
use folio::config::AppConfig;
use folio::events::BroadcastPublisher;
use folio::server::{AppState, create_router};
use folio::store::{SqliteStore, Store};
use folio::types::{Organization, Space, SpaceRole, User};

/// An in-process server over a fresh database, seeded with one organization,
/// one space and its owner.
pub struct TestApp {
    pub temp_dir: TempDir,
    pub state: Arc<AppState>,
    pub events: Arc<BroadcastPublisher>,
    router: Router,
    pub owner: User,
    pub org: Organization,
    pub space: Space,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("folio.db")).expect("open store");
        store.initialize().expect("initialize store");

        let events = Arc::new(BroadcastPublisher::new(config.events.capacity));
        let state = Arc::new(AppState::new(
            Arc::new(store),
            events.clone(),
            Arc::new(MemoryCache::new()),
            &config,
        ));

        let owner = state
            .workspace
            .create_user("owner@example.com", "Owner")
            .expect("create owner");
        let org = state
            .workspace
            .create_organization(owner.id, "Acme", "acme")
            .expect("create org");
        let space = state
            .workspace
            .create_space(owner.id, org.id, "Docs", "docs")
            .expect("create space");

        let router = create_router(state.clone());

        Self {
            temp_dir,
            state,
            events,
            router,
            owner,
            org,
            space,
        }
    }

    /// Registers a user and adds them to the seeded space.
    pub fn member(&self, email: &str, role: SpaceRole) -> User {
        let user = self.state.workspace.create_user(email, email).expect("create user");
        self.state
            .workspace
            .add_space_member(self.space.id, user.id, role)
            .expect("add space member");
        user
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&User>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.id.to_string());
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("send request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: &User) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &User, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    /// Creates a page over HTTP and returns its JSON.
    pub async fn create_page(&self, user: &User, name: &str, parent_id: Option<i64>) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/pages",
                user,
                serde_json::json!({
                    "space_id": self.space.id,
                    "parent_id": parent_id,
                    "name": name,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create page failed: {body}");
        body["data"].clone()
    }
}
