use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, user_key};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{OrgRole, Organization, OrganizationMember, Space, SpaceMember, SpaceRole, User};
use crate::validation::{normalize_email, validate_display_name, validate_email, validate_slug};

/// Users, organizations and spaces.
#[derive(Clone)]
pub struct WorkspaceService {
    store: Arc<dyn Store>,
    cache: Arc<dyn Cache>,
    user_ttl: Duration,
}

impl WorkspaceService {
    pub fn new(store: Arc<dyn Store>, cache: Arc<dyn Cache>, user_ttl: Duration) -> Self {
        Self {
            store,
            cache,
            user_ttl,
        }
    }

    /// Registers a user and hands them any roles they were invited to by email.
    pub fn create_user(&self, email: &str, name: &str) -> Result<User> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_display_name(name, "User")?;

        let user = self.store.create_user(&email, name).map_err(|e| match e {
            Error::Conflict(_) => Error::Conflict(format!("User '{email}' already exists")),
            other => other,
        })?;

        let claimed = self.store.claim_email_roles(user.id, &user.email)?;
        tracing::info!("Created user {} ({}), claimed {claimed} invitation(s)", user.id, user.email);

        Ok(user)
    }

    /// Hydrates a user, from the cache when possible.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let key = user_key(id);
        if let Some(raw) = self.cache.get(&key) {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => return Ok(Some(user)),
                Err(e) => {
                    tracing::warn!("Dropping unreadable cache entry {key}: {e}");
                    self.cache.delete(&key);
                }
            }
        }

        let user = self.store.get_user(id)?;
        if let Some(user) = &user {
            match serde_json::to_string(user) {
                Ok(raw) => self.cache.set(&key, raw, self.user_ttl),
                Err(e) => tracing::warn!("Failed to cache user {id}: {e}"),
            }
        }
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.store.get_user_by_email(&normalize_email(email))
    }

    pub fn create_organization(&self, owner_id: i64, name: &str, slug: &str) -> Result<Organization> {
        validate_display_name(name, "Organization")?;
        validate_slug(slug, "Organization")?;
        self.require_user(owner_id)?;

        let org = self.store.create_organization(name, slug, owner_id)?;
        tracing::info!("Created organization '{}' ({})", org.slug, org.id);
        Ok(org)
    }

    pub fn get_organization(&self, id: i64) -> Result<Organization> {
        self.store
            .get_organization(id)?
            .ok_or(Error::NotFound("organization"))
    }

    pub fn add_organization_member(&self, org_id: i64, user_id: i64, role: OrgRole) -> Result<()> {
        self.get_organization(org_id)?;
        self.require_user(user_id)?;
        self.store.upsert_organization_member(org_id, user_id, role)
    }

    pub fn list_organization_members(&self, org_id: i64) -> Result<Vec<OrganizationMember>> {
        self.get_organization(org_id)?;
        self.store.list_organization_members(org_id)
    }

    /// Only organization owners and admins may open a space.
    pub fn create_space(&self, actor_id: i64, org_id: i64, name: &str, slug: &str) -> Result<Space> {
        validate_display_name(name, "Space")?;
        validate_slug(slug, "Space")?;

        let member = self
            .store
            .get_organization_member(org_id, actor_id)?
            .ok_or_else(|| Error::Forbidden("Not a member of this organization".to_string()))?;
        if member.role == OrgRole::Member {
            return Err(Error::Forbidden(
                "Only organization owners and admins can create spaces".to_string(),
            ));
        }

        let space = self.store.create_space(org_id, name, slug, actor_id)?;
        tracing::info!("Created space '{}' in organization {org_id}", space.slug);
        Ok(space)
    }

    pub fn get_space(&self, id: i64) -> Result<Space> {
        self.store.get_space(id)?.ok_or(Error::NotFound("space"))
    }

    pub fn list_spaces(&self, org_id: i64) -> Result<Vec<Space>> {
        self.store.list_spaces(org_id)
    }

    /// Space members must belong to the space's organization; they join it as
    /// plain members when they do not.
    pub fn add_space_member(&self, space_id: i64, user_id: i64, role: SpaceRole) -> Result<SpaceMember> {
        let space = self.get_space(space_id)?;
        self.require_user(user_id)?;

        if self
            .store
            .get_organization_member(space.org_id, user_id)?
            .is_none()
        {
            self.store
                .upsert_organization_member(space.org_id, user_id, OrgRole::Member)?;
        }

        self.store.upsert_space_member(space_id, user_id, role)?;
        tracing::info!("User {user_id} joined space {space_id} as {role}");

        self.store
            .get_space_member(space_id, user_id)?
            .ok_or(Error::NotFound("space member"))
    }

    pub fn remove_space_member(&self, space_id: i64, user_id: i64) -> Result<()> {
        if !self.store.delete_space_member(space_id, user_id)? {
            return Err(Error::NotFound("space member"));
        }
        Ok(())
    }

    fn require_user(&self, id: i64) -> Result<User> {
        self.get_user(id)?.ok_or(Error::NotFound("user"))
    }
}
