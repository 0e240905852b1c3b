//! HTTP integration tests, driving the router in-process.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use folio::types::SpaceRole;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, _) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_identity_is_required() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/v1/pages", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let request = axum::http::Request::builder()
        .uri("/api/v1/stars")
        .header("x-user-id", "not-a-number")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(
        folio::server::create_router(app.state.clone()),
        request,
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_user_is_rejected() {
    let app = TestApp::new();
    let mut ghost = app.owner.clone();
    ghost.id = 9_999;

    let (status, _) = app.get("/api/v1/stars", &ghost).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_get_and_list_pages() {
    let app = TestApp::new();
    let root = app.create_page(&app.owner, "Handbook", None).await;
    assert_eq!(root["path"], "");
    assert_eq!(root["general_role"], "restrict");

    let root_id = root["id"].as_i64().unwrap();
    let child = app.create_page(&app.owner, "Onboarding", Some(root_id)).await;
    assert_eq!(child["path"], root_id.to_string());
    assert_eq!(child["general_role"], "inherit");

    let (status, body) = app.get(&format!("/api/v1/pages/{root_id}"), &app.owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Handbook");

    let (status, body) = app
        .get(&format!("/api/v1/pages?space_id={}", app.space.id), &app.owner)
        .await;
    assert_eq!(status, StatusCode::OK);
    let roots = body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 1);

    let (_, body) = app
        .get(
            &format!("/api/v1/pages?space_id={}&parent_id={root_id}", app.space.id),
            &app.owner,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Onboarding");

    let (status, body) = app
        .get(&format!("/api/v1/pages/{root_id}/document"), &app.owner)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["content"].is_object());
}

#[tokio::test]
async fn test_list_rejects_unknown_view_type() {
    let app = TestApp::new();
    let (status, _) = app
        .get("/api/v1/pages?view_types=document,board", &app.owner)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_page_validation() {
    let app = TestApp::new();

    let (status, _) = app
        .post(
            "/api/v1/pages",
            &app.owner,
            json!({ "space_id": app.space.id, "name": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/pages",
            &app.owner,
            json!({ "space_id": app.space.id, "parent_id": 4242, "name": "Orphan" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_restricted_root_is_private() {
    let app = TestApp::new();
    let alice = app.member("alice@example.com", SpaceRole::Member);
    let bob = app.member("bob@example.com", SpaceRole::Member);

    let page = app.create_page(&alice, "Private notes", None).await;
    let page_id = page["id"].as_i64().unwrap();

    let (status, _) = app.get(&format!("/api/v1/pages/{page_id}"), &bob).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app
        .get(&format!("/api/v1/pages?space_id={}", app.space.id), &bob)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // The space owner sees everything.
    let (status, _) = app.get(&format!("/api/v1/pages/{page_id}"), &app.owner).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_guest_cannot_create_root_page() {
    let app = TestApp::new();
    let guest = app.member("guest@example.com", SpaceRole::Guest);

    let (status, _) = app
        .post(
            "/api/v1/pages",
            &guest,
            json!({ "space_id": app.space.id, "name": "Mine" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_share_and_access() {
    let app = TestApp::new();
    let alice = app.member("alice@example.com", SpaceRole::Member);
    let bob = app.member("bob@example.com", SpaceRole::Member);

    let root = app.create_page(&alice, "Plans", None).await;
    let root_id = root["id"].as_i64().unwrap();
    let child = app.create_page(&alice, "Q3", Some(root_id)).await;
    let child_id = child["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            &format!("/api/v1/pages/{root_id}/roles"),
            &alice,
            json!({ "grants": [{ "grantee": { "user": bob.id }, "role": "commenter" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .get(&format!("/api/v1/pages/{child_id}/access"), &bob)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "commenter");
    let caps = body["data"]["capabilities"].as_array().unwrap();
    assert!(caps.contains(&json!("view")));
    assert!(caps.contains(&json!("comment")));
    assert!(!caps.contains(&json!("edit")));

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/pages/{child_id}/document"),
            Some(&bob),
            Some(json!({ "content": { "blocks": [] } })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A direct row on the child overrides what it inherits.
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/pages/{child_id}/roles"),
            Some(&alice),
            Some(json!({ "grantee": { "user": bob.id }, "role": "editor" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/v1/pages/{child_id}/document"),
            Some(&bob),
            Some(json!({ "content": { "blocks": ["hello"] } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"]["blocks"][0], "hello");
}

#[tokio::test]
async fn test_share_rejects_inherit_and_keeps_last_owner() {
    let app = TestApp::new();
    let alice = app.member("alice@example.com", SpaceRole::Member);
    let page = app.create_page(&alice, "Solo", None).await;
    let page_id = page["id"].as_i64().unwrap();

    let (status, _) = app
        .post(
            &format!("/api/v1/pages/{page_id}/roles"),
            &alice,
            json!({ "grants": [{ "grantee": { "email": "x@example.com" }, "role": "inherit" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get(&format!("/api/v1/pages/{page_id}/roles"), &alice).await;
    let owner_row = body["data"][0]["id"].as_i64().unwrap();
    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/pages/{page_id}/roles/{owner_row}"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_email_invitation_is_claimed_on_signup() {
    let app = TestApp::new();
    let page = app.create_page(&app.owner, "Roadmap", None).await;
    let page_id = page["id"].as_i64().unwrap();

    let (status, _) = app
        .post(
            &format!("/api/v1/pages/{page_id}/roles"),
            &app.owner,
            json!({ "grants": [{ "grantee": { "email": "New.Hire@Example.com" }, "role": "viewer" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let hire = app.member("new.hire@example.com", SpaceRole::Member);
    let (status, body) = app.get(&format!("/api/v1/pages/{page_id}/access"), &hire).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "viewer");
}

#[tokio::test]
async fn test_move_archive_restore_delete() {
    let app = TestApp::new();
    let a = app.create_page(&app.owner, "A", None).await;
    let b = app.create_page(&app.owner, "B", None).await;
    let a_id = a["id"].as_i64().unwrap();
    let b_id = b["id"].as_i64().unwrap();
    let leaf = app.create_page(&app.owner, "Leaf", Some(a_id)).await;
    let leaf_id = leaf["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            &format!("/api/v1/pages/{a_id}/move"),
            &app.owner,
            json!({ "parent_id": b_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["path"], b_id.to_string());

    let (_, body) = app.get(&format!("/api/v1/pages/{leaf_id}"), &app.owner).await;
    assert_eq!(body["data"]["path"], format!("{b_id}/{a_id}"));

    // Moving a page under its own descendant is refused.
    let (status, _) = app
        .post(
            &format!("/api/v1/pages/{b_id}/move"),
            &app.owner,
            json!({ "parent_id": leaf_id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(&format!("/api/v1/pages/{b_id}/archive"), &app.owner, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);

    let (_, body) = app
        .get(
            &format!("/api/v1/pages?space_id={}&archived=true", app.space.id),
            &app.owner,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .post(&format!("/api/v1/pages/{b_id}/restore"), &app.owner, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/pages/{b_id}"),
            Some(&app.owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/pages/{leaf_id}"), &app.owner).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_tokens() {
    let app = TestApp::new();
    let page = app.create_page(&app.owner, "Launch post", None).await;
    let page_id = page["id"].as_i64().unwrap();

    let (status, body) = app
        .post(&format!("/api/v1/pages/{page_id}/tokens"), &app.owner, json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let first = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(first.len(), 32);

    let (status, body) = app
        .request(Method::GET, &format!("/api/v1/public/{first}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"]["name"], "Launch post");

    // Issuing a new token retires the old one.
    let (_, body) = app
        .post(&format!("/api/v1/pages/{page_id}/tokens"), &app.owner, json!({}))
        .await;
    let second = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(Method::GET, &format!("/api/v1/public/{first}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/pages/{page_id}/tokens/{second}"),
            Some(&app.owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(Method::GET, &format!("/api/v1/public/{second}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stars() {
    let app = TestApp::new();
    let first = app.create_page(&app.owner, "First", None).await;
    let second = app.create_page(&app.owner, "Second", None).await;
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    for id in [first_id, second_id] {
        let (status, _) = app
            .request(
                Method::PUT,
                &format!("/api/v1/pages/{id}/star"),
                Some(&app.owner),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = app.get("/api/v1/stars", &app.owner).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/pages/{first_id}/star"),
            Some(&app.owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/pages/{first_id}/star"),
            Some(&app.owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/v1/stars", &app.owner).await;
    let stars = body["data"].as_array().unwrap();
    assert_eq!(stars.len(), 1);
    assert_eq!(stars[0]["page"]["id"], second_id);
}

#[tokio::test]
async fn test_activity_feed() {
    let app = TestApp::new();
    let root = app.create_page(&app.owner, "Wiki", None).await;
    let root_id = root["id"].as_i64().unwrap();
    let child = app.create_page(&app.owner, "FAQ", Some(root_id)).await;
    let child_id = child["id"].as_i64().unwrap();

    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/v1/pages/{child_id}"),
            Some(&app.owner),
            Some(json!({ "name": "Questions" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .get(&format!("/api/v1/pages/{child_id}/activities"), &app.owner)
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["action"], "rename");
    assert_eq!(items[1]["action"], "create");

    let (_, body) = app
        .get(
            &format!("/api/v1/pages/{root_id}/activities?subtree=true&limit=2"),
            &app.owner,
        )
        .await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(body["data"]["next_cursor"].is_string());
}
