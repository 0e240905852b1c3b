//! End-to-end scenarios through the service layer.

mod common;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use common::TestApp;
use folio::access::Grant;
use folio::error::Error;
use folio::events::{PAGE_CREATED, PAGE_DELETED};
use folio::service::CreatePage;
use folio::store::{ActivityStore, PageStore, RoleStore, ShareStore};
use folio::types::{
    ActionCode, ActivityQuery, Grantee, NewActivity, Page, Role, RoleGrant, SpaceRole, User,
    ViewType,
};

fn create(app: &TestApp, actor: &User, name: &str, parent: Option<&Page>) -> Page {
    app.state
        .pages
        .create(
            actor,
            CreatePage {
                space_id: app.space.id,
                parent_id: parent.map(|p| p.id),
                name: name.to_string(),
                view_type: ViewType::Document,
                cover_image: None,
                node_id: None,
                content: None,
                asset: None,
            },
        )
        .unwrap()
}

fn grant(user: &User, role: Role) -> RoleGrant {
    RoleGrant {
        grantee: Grantee::User(user.id),
        role,
    }
}

#[test]
fn test_viewer_on_root_inherits_to_child() {
    let app = TestApp::new();
    let u = app.member("u@example.com", SpaceRole::Member);

    let a = create(&app, &app.owner, "A", None);
    assert_eq!(a.general_role, Role::Restrict);
    assert_eq!(a.path, "");

    let b = create(&app, &app.owner, "B", Some(&a));
    assert_eq!(b.path, a.id.to_string());
    assert_eq!(b.general_role, Role::Inherit);

    app.state
        .pages
        .share(&app.owner, a.id, &[grant(&u, Role::Viewer)], false)
        .unwrap();
    assert!(app.state.store.get_page_role(b.id, &Grantee::User(u.id)).unwrap().is_none());

    let access = app.state.pages.effective_access(&u, b.id).unwrap();
    assert_eq!(access.role, Some(Role::Viewer));
    assert_eq!(access.grant, Grant::Direct { page_id: a.id });
    assert!(access.can_view());
    assert!(!access.can_edit());
}

#[test]
fn test_paths_follow_parents_through_moves() {
    let app = TestApp::new();
    let a = create(&app, &app.owner, "A", None);
    let b = create(&app, &app.owner, "B", Some(&a));
    let c = create(&app, &app.owner, "C", Some(&b));
    let other = create(&app, &app.owner, "Other", None);

    app.state.pages.move_page(&app.owner, b.id, Some(other.id)).unwrap();

    for id in [a.id, b.id, c.id, other.id] {
        let page = app.state.store.get_page(id).unwrap().unwrap();
        match page.parent_id {
            None => assert_eq!(page.path, ""),
            Some(parent_id) => {
                let parent = app.state.store.get_page(parent_id).unwrap().unwrap();
                assert_eq!(page.path, parent.child_path());
            }
        }
    }

    let moved_root = app.state.pages.move_page(&app.owner, b.id, None).unwrap();
    assert_eq!(moved_root.path, "");
    assert_eq!(moved_root.general_role, Role::Restrict);
    let c = app.state.store.get_page(c.id).unwrap().unwrap();
    assert_eq!(c.path, b.id.to_string());
}

#[test]
fn test_guest_sees_only_explicit_grants() {
    let app = TestApp::new();
    let guest = app.member("guest@example.com", SpaceRole::Guest);
    let member = app.member("member@example.com", SpaceRole::Member);

    let root = create(&app, &app.owner, "Team", None);
    app.state
        .pages
        .update(
            &app.owner,
            root.id,
            &folio::types::PageUpdate {
                general_role: Some(Role::Viewer),
                ..Default::default()
            },
        )
        .unwrap();
    let child = create(&app, &app.owner, "Notes", Some(&root));

    let access = app.state.pages.effective_access(&member, child.id).unwrap();
    assert_eq!(access.role, Some(Role::Viewer));
    assert_eq!(access.grant, Grant::General { page_id: root.id });

    let access = app.state.pages.effective_access(&guest, child.id).unwrap();
    assert!(!access.can_view());
    assert!(matches!(
        app.state.pages.get(&guest, child.id),
        Err(Error::Forbidden(_))
    ));

    app.state
        .pages
        .set_role(&app.owner, child.id, &grant(&guest, Role::Commenter))
        .unwrap();
    let access = app.state.pages.effective_access(&guest, child.id).unwrap();
    assert_eq!(access.role, Some(Role::Commenter));
}

#[test]
fn test_non_member_has_no_access_despite_grants() {
    let app = TestApp::new();
    let page = create(&app, &app.owner, "Shared", None);
    let outsider = app
        .state
        .workspace
        .create_user("outsider@example.com", "Outsider")
        .unwrap();

    app.state
        .store
        .set_page_role(page.id, &grant(&outsider, Role::Editor))
        .unwrap();

    let access = app.state.pages.effective_access(&outsider, page.id).unwrap();
    assert_eq!(access.role, None);
    assert_eq!(access.grant, Grant::NoMembership);
}

#[test]
fn test_bulk_invite_is_idempotent() {
    let app = TestApp::new();
    let page = create(&app, &app.owner, "Invites", None);
    let invite = RoleGrant {
        grantee: Grantee::Email("someone@example.com".to_string()),
        role: Role::Viewer,
    };

    app.state
        .pages
        .share(&app.owner, page.id, &[invite.clone()], false)
        .unwrap();
    let roles = app
        .state
        .pages
        .share(&app.owner, page.id, &[invite], false)
        .unwrap();

    let invites = roles
        .iter()
        .filter(|r| r.email.as_deref() == Some("someone@example.com"))
        .count();
    assert_eq!(invites, 1);
}

#[test]
fn test_archived_token_stays_readable() {
    let app = TestApp::new();
    let page = create(&app, &app.owner, "Release notes", None);

    let t1 = app.state.pages.create_public_token(&app.owner, page.id).unwrap();
    app.state
        .pages
        .archive_public_token(&app.owner, page.id, &t1.id)
        .unwrap();
    let t2 = app.state.pages.create_public_token(&app.owner, page.id).unwrap();

    let t1 = app.state.store.get_public_token_by_id(&t1.id).unwrap().unwrap();
    assert!(t1.archived_at.is_some());

    let live = app.state.store.get_live_public_token(page.id).unwrap().unwrap();
    assert_eq!(live.id, t2.id);
    assert!(app.state.pages.resolve_public_token(&t1.id).is_err());
    assert_eq!(
        app.state.pages.resolve_public_token(&t2.id).unwrap().page.id,
        page.id
    );
}

#[test]
fn test_starring_twice_keeps_one_row() {
    let app = TestApp::new();
    let page = create(&app, &app.owner, "Favourite", None);

    app.state.store.star_page(app.owner.id, page.id, 1_000.0).unwrap();
    app.state.store.star_page(app.owner.id, page.id, 2_000.0).unwrap();

    let stars = app.state.store.list_stars(app.owner.id).unwrap();
    assert_eq!(stars.len(), 1);
    assert_eq!(stars[0].order, 2_000.0);
}

#[test]
fn test_cursor_pagination_over_activities() {
    let app = TestApp::new();
    let page = create(&app, &app.owner, "Log", None);
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    for i in 0..5 {
        app.state
            .store
            .create_activity(&NewActivity {
                actor_id: app.owner.id,
                action: ActionCode::Visit,
                related_page_ids: vec![page.id],
                snapshot: json!({ "i": i }),
                created_at: Some(base - Duration::minutes(i)),
            })
            .unwrap();
    }

    let query = ActivityQuery {
        actions: vec![ActionCode::Visit],
        related_page_ids: vec![page.id],
        limit: 3,
        ..Default::default()
    };
    let first = app.state.store.list_activities(&query).unwrap();
    assert_eq!(first.len(), 3);
    assert!(first.windows(2).all(|w| w[0].created_at > w[1].created_at));

    let second = app
        .state
        .store
        .list_activities(&ActivityQuery {
            before: Some(first[2].created_at),
            ..query.clone()
        })
        .unwrap();
    assert_eq!(second.len(), 2);
    assert!(second[0].created_at < first[2].created_at);

    let feed = app
        .state
        .pages
        .activities(&app.owner, page.id, false, Some(base + Duration::seconds(1)), Some(3))
        .unwrap();
    assert_eq!(feed.items.len(), 3);
    assert_eq!(feed.next_cursor, Some(feed.items[2].created_at));
}

#[test]
fn test_archive_cascades_and_restore_needs_live_parent() {
    let app = TestApp::new();
    let root = create(&app, &app.owner, "Projects", None);
    let child = create(&app, &app.owner, "Alpha", Some(&root));
    let grandchild = create(&app, &app.owner, "Specs", Some(&child));

    assert_eq!(app.state.pages.archive(&app.owner, root.id).unwrap(), 3);
    let archived = app.state.store.get_page(grandchild.id).unwrap().unwrap();
    assert!(archived.is_archived());

    assert!(matches!(
        app.state.pages.restore(&app.owner, child.id),
        Err(Error::BadRequest(_))
    ));
    assert!(matches!(
        app.state
            .pages
            .update_document(&app.owner, child.id, &json!({ "text": "x" })),
        Err(Error::BadRequest(_))
    ));

    assert_eq!(app.state.pages.restore(&app.owner, root.id).unwrap(), 3);
}

#[test]
fn test_delete_removes_subtree_but_keeps_activity() {
    let app = TestApp::new();
    let root = create(&app, &app.owner, "Scratch", None);
    let child = create(&app, &app.owner, "Draft", Some(&root));

    app.state.pages.delete(&app.owner, root.id).unwrap();
    assert!(app.state.store.get_page(child.id).unwrap().is_none());

    let history = app
        .state
        .store
        .list_activities(&ActivityQuery {
            related_page_ids: vec![child.id],
            limit: 10,
            ..Default::default()
        })
        .unwrap();
    assert!(history.iter().any(|a| a.action == ActionCode::Create));
}

#[test]
fn test_page_events_are_published() {
    let app = TestApp::new();
    let mut rx = app.events.subscribe();

    let page = create(&app, &app.owner, "Announcements", None);
    app.state.pages.delete(&app.owner, page.id).unwrap();

    let created = rx.try_recv().unwrap();
    assert_eq!(created.channel, PAGE_CREATED);
    assert_eq!(created.payload["id"], page.id);

    let deleted = rx.try_recv().unwrap();
    assert_eq!(deleted.channel, PAGE_DELETED);
    assert_eq!(deleted.payload, json!(page.id));
}

#[test]
fn test_propagating_share_lists_grantee_on_descendants() {
    let app = TestApp::new();
    let u = app.member("u@example.com", SpaceRole::Member);
    let root = create(&app, &app.owner, "Guides", None);
    let child = create(&app, &app.owner, "Setup", Some(&root));

    app.state
        .pages
        .share(&app.owner, root.id, &[grant(&u, Role::Editor)], true)
        .unwrap();

    let row = app
        .state
        .store
        .get_page_role(child.id, &Grantee::User(u.id))
        .unwrap()
        .unwrap();
    assert_eq!(row.role, Role::Inherit);
    assert_eq!(
        app.state.pages.effective_access(&u, child.id).unwrap().role,
        Some(Role::Editor)
    );
}
