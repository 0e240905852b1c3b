use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::access::{Access, PermissionResolver};
use crate::activity::{ActivityRecorder, CursorPage};
use crate::config::ListConfig;
use crate::error::{Error, Result};
use crate::events::{Event, EventPublisher};
use crate::store::Store;
use crate::types::*;
use crate::validation::{normalize_email, validate_display_name, validate_email};

/// What a caller supplies to create a page; the author is the acting user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePage {
    pub space_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub name: String,
    #[serde(default = "default_view_type")]
    pub view_type: ViewType,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub asset: Option<NewAsset>,
}

fn default_view_type() -> ViewType {
    ViewType::Document
}

#[derive(Debug, Clone, Serialize)]
pub struct StarredPage {
    pub page: Page,
    pub order: f64,
}

/// A page opened through a public link.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPage {
    pub page: Page,
    pub document: Option<Document>,
}

/// Page tree operations, each checked against the acting user's access.
#[derive(Clone)]
pub struct PageService {
    store: Arc<dyn Store>,
    events: Arc<dyn EventPublisher>,
    activity: ActivityRecorder,
    limits: ListConfig,
}

impl PageService {
    pub fn new(
        store: Arc<dyn Store>,
        events: Arc<dyn EventPublisher>,
        activity: ActivityRecorder,
        limits: ListConfig,
    ) -> Self {
        Self {
            store,
            events,
            activity,
            limits,
        }
    }

    fn load(&self, page_id: i64) -> Result<Page> {
        self.store.get_page(page_id)?.ok_or(Error::NotFound("page"))
    }

    fn resolve(&self, actor: &User, page: &Page) -> Result<Access> {
        PermissionResolver::new(self.store.as_ref()).resolve(actor, page)
    }

    fn authorize(&self, actor: &User, page: &Page, required: Capabilities) -> Result<Access> {
        let access = self.resolve(actor, page)?;
        if !access.has(required) {
            return Err(Error::Forbidden("Insufficient page permissions".to_string()));
        }
        Ok(access)
    }

    /// Root pages may be added by space owners and members, not guests.
    fn authorize_root(&self, actor: &User, space_id: i64) -> Result<()> {
        match self.store.get_space_member(space_id, actor.id)? {
            Some(member) if member.role != SpaceRole::Guest => Ok(()),
            Some(_) => Err(Error::Forbidden(
                "Guests cannot create top-level pages".to_string(),
            )),
            None => Err(Error::Forbidden("Not a member of this space".to_string())),
        }
    }

    fn live(&self, actor: &User, page_id: i64, required: Capabilities) -> Result<Page> {
        let page = self.load(page_id)?;
        self.authorize(actor, &page, required)?;
        Ok(page)
    }

    // Tree

    pub fn create(&self, actor: &User, req: CreatePage) -> Result<Page> {
        validate_display_name(&req.name, "Page")?;

        match req.parent_id {
            Some(parent_id) => {
                let parent = self
                    .store
                    .get_page(parent_id)?
                    .ok_or_else(|| Error::BadRequest("Parent page not found".to_string()))?;
                self.authorize(actor, &parent, Capabilities::EDIT)?;
            }
            None => self.authorize_root(actor, req.space_id)?,
        }

        let has_asset = req.asset.is_some();
        let page = self.store.create_page(&NewPage {
            space_id: req.space_id,
            parent_id: req.parent_id,
            name: req.name,
            view_type: req.view_type,
            author_id: actor.id,
            cover_image: req.cover_image,
            node_id: req.node_id,
            content: req.content,
            asset: req.asset,
        })?;

        tracing::info!("User {} created page {} in space {}", actor.id, page.id, page.space_id);
        self.events.publish(Event::page_created(&page));

        let related = std::iter::once(page.id).chain(page.parent_id).collect();
        let action = if has_asset {
            ActionCode::Upload
        } else {
            ActionCode::Create
        };
        self.activity
            .record_detached(actor.id, action, related, json!({ "name": page.name }));

        Ok(page)
    }

    pub fn get(&self, actor: &User, page_id: i64) -> Result<Page> {
        self.live(actor, page_id, Capabilities::VIEW)
    }

    pub fn get_by_public_id(&self, actor: &User, public_id: &str) -> Result<Page> {
        let page = self
            .store
            .get_page_by_public_id(public_id)?
            .ok_or(Error::NotFound("page"))?;
        self.authorize(actor, &page, Capabilities::VIEW)?;
        Ok(page)
    }

    /// Lists pages the actor can view. The limit bounds the rows read, so a
    /// page of results may come back short when some rows are not visible.
    pub fn list(&self, actor: &User, mut query: PageQuery) -> Result<Vec<Page>> {
        query.limit = self.limits.clamp(Some(query.limit));

        if query.is_all && query.path_prefix.is_none() {
            if let Some(parent_id) = query.parent_id {
                let parent = self.live(actor, parent_id, Capabilities::VIEW)?;
                query.path_prefix = Some(parent.child_path());
            }
        }

        let pages = self.store.list_pages(&query)?;
        let mut visible = Vec::with_capacity(pages.len());
        for page in pages {
            if self.resolve(actor, &page)?.can_view() {
                visible.push(page);
            }
        }
        Ok(visible)
    }

    pub fn update(&self, actor: &User, page_id: i64, update: &PageUpdate) -> Result<Page> {
        if update.is_empty() {
            return Err(Error::BadRequest("Nothing to update".to_string()));
        }
        if let Some(name) = &update.name {
            validate_display_name(name, "Page")?;
        }

        let required = if update.general_role.is_some() {
            Capabilities::MANAGE
        } else {
            Capabilities::EDIT
        };
        let before = self.live(actor, page_id, required)?;
        let page = self.store.update_page(page_id, update)?;

        self.events.publish(Event::page_updated(&page));

        let (action, snapshot) = match &update.name {
            Some(name) if *name != before.name => (
                ActionCode::Rename,
                json!({ "from": before.name, "to": name }),
            ),
            _ => (ActionCode::Update, json!({ "fields": update_fields(update) })),
        };
        self.activity
            .record_detached(actor.id, action, vec![page.id], snapshot);

        Ok(page)
    }

    pub fn get_document(&self, actor: &User, page_id: i64) -> Result<Document> {
        self.live(actor, page_id, Capabilities::VIEW)?;
        self.store
            .get_document(page_id)?
            .ok_or(Error::NotFound("document"))
    }

    pub fn update_document(&self, actor: &User, page_id: i64, content: &Value) -> Result<Document> {
        let page = self.live(actor, page_id, Capabilities::EDIT)?;
        if page.is_archived() {
            return Err(Error::BadRequest("Archived pages are read-only".to_string()));
        }

        let document = self.store.update_document(page_id, content)?;
        self.events.publish(Event::page_updated(&page));
        self.activity.record_detached(
            actor.id,
            ActionCode::Update,
            vec![page_id],
            json!({ "fields": ["content"] }),
        );
        Ok(document)
    }

    /// Re-parents a page. `None` makes it a root page.
    pub fn move_page(&self, actor: &User, page_id: i64, new_parent_id: Option<i64>) -> Result<Page> {
        let before = self.live(actor, page_id, Capabilities::MANAGE)?;

        match new_parent_id {
            Some(parent_id) => {
                let parent = self
                    .store
                    .get_page(parent_id)?
                    .ok_or_else(|| Error::BadRequest("Parent page not found".to_string()))?;
                self.authorize(actor, &parent, Capabilities::EDIT)?;
            }
            None => self.authorize_root(actor, before.space_id)?,
        }

        let page = self.store.move_page(page_id, new_parent_id)?;
        tracing::info!(
            "User {} moved page {page_id} from {:?} to {:?}",
            actor.id,
            before.parent_id,
            new_parent_id
        );
        self.events.publish(Event::page_updated(&page));

        let mut related = vec![page_id];
        related.extend(before.parent_id);
        related.extend(new_parent_id);
        self.activity.record_detached(
            actor.id,
            ActionCode::Move,
            related,
            json!({ "from": before.parent_id, "to": new_parent_id }),
        );

        Ok(page)
    }

    /// Archives the page and its live subtree. Returns how many pages changed.
    pub fn archive(&self, actor: &User, page_id: i64) -> Result<usize> {
        self.live(actor, page_id, Capabilities::MANAGE)?;

        let archived = self.store.archive_page(page_id, Utc::now())?;
        if archived > 0 {
            let page = self.load(page_id)?;
            self.events.publish(Event::page_updated(&page));
            self.activity.record_detached(
                actor.id,
                ActionCode::Archive,
                vec![page_id],
                json!({ "pages": archived }),
            );
        }
        Ok(archived)
    }

    pub fn restore(&self, actor: &User, page_id: i64) -> Result<usize> {
        self.live(actor, page_id, Capabilities::MANAGE)?;

        let restored = self.store.restore_page(page_id)?;
        if restored > 0 {
            let page = self.load(page_id)?;
            self.events.publish(Event::page_updated(&page));
            self.activity.record_detached(
                actor.id,
                ActionCode::Update,
                vec![page_id],
                json!({ "restored": restored }),
            );
        }
        Ok(restored)
    }

    /// Deletes the page and everything beneath it. The activity log keeps its rows.
    pub fn delete(&self, actor: &User, page_id: i64) -> Result<()> {
        let page = self.live(actor, page_id, Capabilities::MANAGE)?;

        if !self.store.delete_page(page_id)? {
            return Err(Error::NotFound("page"));
        }
        tracing::info!("User {} deleted page {page_id}", actor.id);
        self.events.publish(Event::page_deleted(page_id));

        let related = std::iter::once(page_id).chain(page.parent_id).collect();
        self.activity.record_detached(
            actor.id,
            ActionCode::Remove,
            related,
            json!({ "name": page.name }),
        );
        Ok(())
    }

    pub fn visit(&self, actor: &User, page_id: i64) -> Result<Page> {
        let page = self.live(actor, page_id, Capabilities::VIEW)?;
        self.activity
            .record_detached(actor.id, ActionCode::Visit, vec![page_id], json!({}));
        Ok(page)
    }

    // Assets

    pub fn upload_asset(&self, actor: &User, page_id: i64, asset: &NewAsset) -> Result<Asset> {
        self.live(actor, page_id, Capabilities::EDIT)?;
        if asset.url.is_empty() || asset.mime_type.is_empty() {
            return Err(Error::BadRequest("Asset url and mime type are required".to_string()));
        }

        let created = self.store.create_asset(page_id, asset)?;
        self.activity.record_detached(
            actor.id,
            ActionCode::Upload,
            vec![page_id],
            json!({ "asset": created.public_id, "mime_type": created.mime_type }),
        );
        Ok(created)
    }

    pub fn list_assets(&self, actor: &User, page_id: i64) -> Result<Vec<Asset>> {
        self.live(actor, page_id, Capabilities::VIEW)?;
        self.store.list_assets(page_id)
    }

    // Roles

    /// Registered emails become user grants; unknown emails stay as invitations.
    fn normalize_grant(&self, grant: &RoleGrant) -> Result<RoleGrant> {
        if !grant.role.is_grantable() {
            return Err(Error::BadRequest(format!("Role '{}' cannot be granted", grant.role)));
        }

        let grantee = match &grant.grantee {
            Grantee::User(user_id) => {
                self.store.get_user(*user_id)?.ok_or(Error::NotFound("user"))?;
                Grantee::User(*user_id)
            }
            Grantee::Email(email) => {
                let email = normalize_email(email);
                validate_email(&email)?;
                match self.store.get_user_by_email(&email)? {
                    Some(user) => Grantee::User(user.id),
                    None => Grantee::Email(email),
                }
            }
        };

        Ok(RoleGrant {
            grantee,
            role: grant.role,
        })
    }

    /// Refuses a change that would leave the page without an owner row.
    fn guard_last_owner(&self, page_id: i64, changing: &PageRole, new_role: Option<Role>) -> Result<()> {
        if changing.role != Role::Owner || new_role == Some(Role::Owner) {
            return Ok(());
        }
        let owners = self
            .store
            .list_page_roles(page_id)?
            .iter()
            .filter(|r| r.role == Role::Owner)
            .count();
        if owners <= 1 {
            return Err(Error::BadRequest("A page must keep at least one owner".to_string()));
        }
        Ok(())
    }

    /// Invites grantees without touching rows they already have. With
    /// `propagate`, every live descendant lists them too.
    pub fn share(
        &self,
        actor: &User,
        page_id: i64,
        grants: &[RoleGrant],
        propagate: bool,
    ) -> Result<Vec<PageRole>> {
        self.live(actor, page_id, Capabilities::MANAGE)?;
        if grants.is_empty() {
            return Err(Error::BadRequest("No grantees given".to_string()));
        }

        let grants = grants
            .iter()
            .map(|g| self.normalize_grant(g))
            .collect::<Result<Vec<_>>>()?;

        let inserted = self.store.create_page_roles(page_id, &grants)?;
        let propagated = if propagate {
            let grantees: Vec<Grantee> = grants.iter().map(|g| g.grantee.clone()).collect();
            self.store.propagate_page_roles(page_id, &grantees)?
        } else {
            0
        };

        tracing::info!(
            "User {} shared page {page_id}: {inserted} new role(s), {propagated} propagated",
            actor.id
        );
        self.activity.record_detached(
            actor.id,
            ActionCode::Update,
            vec![page_id],
            json!({ "shared": inserted, "propagated": propagated }),
        );

        self.store.list_page_roles(page_id)
    }

    pub fn set_role(&self, actor: &User, page_id: i64, grant: &RoleGrant) -> Result<PageRole> {
        self.live(actor, page_id, Capabilities::MANAGE)?;
        let grant = self.normalize_grant(grant)?;

        if let Some(existing) = self.store.get_page_role(page_id, &grant.grantee)? {
            self.guard_last_owner(page_id, &existing, Some(grant.role))?;
        }

        let row = self.store.set_page_role(page_id, &grant)?;
        self.activity.record_detached(
            actor.id,
            ActionCode::Update,
            vec![page_id],
            json!({ "role": row.role, "grantee": row.grantee() }),
        );
        Ok(row)
    }

    pub fn list_roles(&self, actor: &User, page_id: i64) -> Result<Vec<PageRole>> {
        self.live(actor, page_id, Capabilities::VIEW)?;
        self.store.list_page_roles(page_id)
    }

    pub fn remove_role(&self, actor: &User, page_id: i64, role_id: i64) -> Result<()> {
        self.live(actor, page_id, Capabilities::MANAGE)?;

        let row = self
            .store
            .get_page_role_by_id(role_id)?
            .filter(|r| r.page_id == page_id)
            .ok_or(Error::NotFound("page role"))?;
        self.guard_last_owner(page_id, &row, None)?;

        self.store.delete_page_role(role_id)?;
        self.activity.record_detached(
            actor.id,
            ActionCode::Update,
            vec![page_id],
            json!({ "removed": row.grantee() }),
        );
        Ok(())
    }

    /// The actor's resolved role on a page.
    pub fn effective_access(&self, actor: &User, page_id: i64) -> Result<Access> {
        let page = self.load(page_id)?;
        self.resolve(actor, &page)
    }

    // Public tokens

    pub fn create_public_token(&self, actor: &User, page_id: i64) -> Result<PagePublicToken> {
        let page = self.live(actor, page_id, Capabilities::MANAGE)?;
        if page.is_archived() {
            return Err(Error::BadRequest("Archived pages cannot be published".to_string()));
        }
        let token = self.store.create_public_token(page_id)?;
        tracing::info!("User {} published page {page_id}", actor.id);
        Ok(token)
    }

    pub fn list_public_tokens(&self, actor: &User, page_id: i64) -> Result<Vec<PagePublicToken>> {
        self.live(actor, page_id, Capabilities::MANAGE)?;
        self.store.list_public_tokens(page_id)
    }

    pub fn archive_public_token(&self, actor: &User, page_id: i64, token_id: &str) -> Result<()> {
        self.live(actor, page_id, Capabilities::MANAGE)?;
        self.store
            .get_public_token_by_id(token_id)?
            .filter(|t| t.page_id == page_id)
            .ok_or(Error::NotFound("public token"))?;

        self.store.archive_public_token(token_id, Utc::now())?;
        Ok(())
    }

    /// Opens a page anonymously. Archived tokens and archived pages resolve to nothing.
    pub fn resolve_public_token(&self, token_id: &str) -> Result<PublicPage> {
        let token = self
            .store
            .get_public_token_by_id(token_id)?
            .filter(PagePublicToken::is_live)
            .ok_or(Error::NotFound("public token"))?;

        let page = self
            .store
            .get_page(token.page_id)?
            .filter(|p| !p.is_archived())
            .ok_or(Error::NotFound("page"))?;
        let document = self.store.get_document(page.id)?;

        Ok(PublicPage { page, document })
    }

    // Stars

    pub fn star(&self, actor: &User, page_id: i64) -> Result<PageStar> {
        self.live(actor, page_id, Capabilities::VIEW)?;
        let order = Utc::now().timestamp_millis() as f64;
        self.store.star_page(actor.id, page_id, order)
    }

    pub fn unstar(&self, actor: &User, page_id: i64) -> Result<()> {
        if !self.store.unstar_page(actor.id, page_id)? {
            return Err(Error::NotFound("star"));
        }
        Ok(())
    }

    /// Starred pages, most recent first, leaving out archived or no longer visible ones.
    pub fn list_starred(&self, actor: &User) -> Result<Vec<StarredPage>> {
        let mut starred = Vec::new();
        for star in self.store.list_stars(actor.id)? {
            let Some(page) = self.store.get_page(star.page_id)? else {
                continue;
            };
            if page.is_archived() || !self.resolve(actor, &page)?.can_view() {
                continue;
            }
            starred.push(StarredPage {
                page,
                order: star.order,
            });
        }
        Ok(starred)
    }

    // Activity

    pub fn activities(
        &self,
        actor: &User,
        page_id: i64,
        subtree: bool,
        before: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<CursorPage<Activity>> {
        let page = self.live(actor, page_id, Capabilities::VIEW)?;
        if subtree {
            self.activity
                .list_for_subtree(page_id, &page.child_path(), before, limit)
        } else {
            self.activity.list_for_page(page_id, before, limit)
        }
    }
}

fn update_fields(update: &PageUpdate) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if update.name.is_some() {
        fields.push("name");
    }
    if update.cover_image.is_some() {
        fields.push("cover_image");
    }
    if update.node_id.is_some() {
        fields.push("node_id");
    }
    if update.general_role.is_some() {
        fields.push("general_role");
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::events::BroadcastPublisher;
    use crate::service::WorkspaceService;
    use crate::store::SqliteStore;

    struct Harness {
        _temp: tempfile::TempDir,
        workspace: WorkspaceService,
        pages: PageService,
        owner: User,
        space: Space,
    }

    fn harness() -> Harness {
        let temp = tempfile::TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::new(temp.path().join("test.db")).unwrap());
        store.initialize().unwrap();

        let workspace = WorkspaceService::new(
            store.clone(),
            Arc::new(MemoryCache::new()),
            std::time::Duration::from_secs(60),
        );
        let pages = PageService::new(
            store.clone(),
            Arc::new(BroadcastPublisher::new(16)),
            ActivityRecorder::new(store.clone(), ListConfig::default()),
            ListConfig::default(),
        );

        let owner = workspace.create_user("owner@example.com", "Owner").unwrap();
        let org = workspace.create_organization(owner.id, "Acme", "acme").unwrap();
        let space = workspace.create_space(owner.id, org.id, "Docs", "docs").unwrap();

        Harness {
            _temp: temp,
            workspace,
            pages,
            owner,
            space,
        }
    }

    impl Harness {
        fn member(&self, email: &str) -> User {
            let user = self.workspace.create_user(email, email).unwrap();
            self.workspace
                .add_space_member(self.space.id, user.id, SpaceRole::Member)
                .unwrap();
            user
        }

        fn page(&self, actor: &User, name: &str) -> Page {
            self.pages
                .create(
                    actor,
                    CreatePage {
                        space_id: self.space.id,
                        parent_id: None,
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
    }

    #[test]
    fn test_last_owner_cannot_be_removed() {
        let h = harness();
        let page = h.page(&h.owner, "Roadmap");
        let roles = h.pages.list_roles(&h.owner, page.id).unwrap();
        let owner_row = roles.iter().find(|r| r.role == Role::Owner).unwrap();

        assert!(matches!(
            h.pages.remove_role(&h.owner, page.id, owner_row.id),
            Err(Error::BadRequest(_))
        ));
        let demote = RoleGrant {
            grantee: Grantee::User(h.owner.id),
            role: Role::Editor,
        };
        assert!(matches!(
            h.pages.set_role(&h.owner, page.id, &demote),
            Err(Error::BadRequest(_))
        ));

        let co = h.member("co@example.com");
        h.pages
            .set_role(
                &h.owner,
                page.id,
                &RoleGrant {
                    grantee: Grantee::User(co.id),
                    role: Role::Owner,
                },
            )
            .unwrap();
        h.pages.remove_role(&h.owner, page.id, owner_row.id).unwrap();
    }

    #[test]
    fn test_inherit_is_not_grantable() {
        let h = harness();
        let page = h.page(&h.owner, "Budget");
        let grant = RoleGrant {
            grantee: Grantee::Email("x@example.com".to_string()),
            role: Role::Inherit,
        };
        assert!(matches!(
            h.pages.share(&h.owner, page.id, &[grant], false),
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            h.pages.share(&h.owner, page.id, &[], false),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn test_share_by_email_resolves_registered_users() {
        let h = harness();
        let page = h.page(&h.owner, "Hiring");
        let known = h.member("known@example.com");

        let roles = h
            .pages
            .share(
                &h.owner,
                page.id,
                &[
                    RoleGrant {
                        grantee: Grantee::Email("KNOWN@example.com".to_string()),
                        role: Role::Viewer,
                    },
                    RoleGrant {
                        grantee: Grantee::Email("later@example.com".to_string()),
                        role: Role::Viewer,
                    },
                ],
                false,
            )
            .unwrap();

        assert!(roles.iter().any(|r| r.user_id == Some(known.id)));
        assert!(
            roles
                .iter()
                .any(|r| r.email.as_deref() == Some("later@example.com"))
        );
    }

    #[test]
    fn test_unstar_without_star_is_not_found() {
        let h = harness();
        let page = h.page(&h.owner, "Inbox");

        assert!(matches!(
            h.pages.unstar(&h.owner, page.id),
            Err(Error::NotFound("star"))
        ));
        h.pages.star(&h.owner, page.id).unwrap();
        assert_eq!(h.pages.list_starred(&h.owner).unwrap().len(), 1);
        h.pages.unstar(&h.owner, page.id).unwrap();
        assert!(h.pages.list_starred(&h.owner).unwrap().is_empty());
    }

    #[test]
    fn test_list_hides_pages_without_view_access() {
        let h = harness();
        let alice = h.member("alice@example.com");
        let bob = h.member("bob@example.com");
        h.page(&alice, "Private");
        h.page(&bob, "Bob's notes");

        let query = PageQuery {
            space_id: Some(h.space.id),
            ..Default::default()
        };
        let seen: Vec<String> = h
            .pages
            .list(&bob, query.clone())
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(seen, vec!["Bob's notes".to_string()]);

        assert_eq!(h.pages.list(&h.owner, query).unwrap().len(), 2);
    }

    #[test]
    fn test_general_role_change_requires_manage() {
        let h = harness();
        let page = h.page(&h.owner, "Wiki");
        let editor = h.member("editor@example.com");
        h.pages
            .set_role(
                &h.owner,
                page.id,
                &RoleGrant {
                    grantee: Grantee::User(editor.id),
                    role: Role::Editor,
                },
            )
            .unwrap();

        let rename = PageUpdate {
            name: Some("Team wiki".to_string()),
            ..Default::default()
        };
        assert_eq!(h.pages.update(&editor, page.id, &rename).unwrap().name, "Team wiki");

        let open = PageUpdate {
            general_role: Some(Role::Viewer),
            ..Default::default()
        };
        assert!(matches!(
            h.pages.update(&editor, page.id, &open),
            Err(Error::Forbidden(_))
        ));
    }
}
