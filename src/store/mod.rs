pub mod path;
mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::Result;
use crate::types::*;

/// Users, organizations, spaces and their memberships.
pub trait WorkspaceStore: Send + Sync {
    fn create_user(&self, email: &str, name: &str) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Creates the organization and its owner membership together.
    fn create_organization(&self, name: &str, slug: &str, owner_id: i64) -> Result<Organization>;
    fn get_organization(&self, id: i64) -> Result<Option<Organization>>;
    fn upsert_organization_member(&self, org_id: i64, user_id: i64, role: OrgRole) -> Result<()>;
    fn get_organization_member(
        &self,
        org_id: i64,
        user_id: i64,
    ) -> Result<Option<OrganizationMember>>;
    fn list_organization_members(&self, org_id: i64) -> Result<Vec<OrganizationMember>>;

    /// Creates the space and its owner membership together.
    fn create_space(&self, org_id: i64, name: &str, slug: &str, owner_id: i64) -> Result<Space>;
    fn get_space(&self, id: i64) -> Result<Option<Space>>;
    fn list_spaces(&self, org_id: i64) -> Result<Vec<Space>>;
    fn upsert_space_member(&self, space_id: i64, user_id: i64, role: SpaceRole) -> Result<()>;
    fn get_space_member(&self, space_id: i64, user_id: i64) -> Result<Option<SpaceMember>>;
    fn delete_space_member(&self, space_id: i64, user_id: i64) -> Result<bool>;
}

/// The page tree and page bodies.
pub trait PageStore: Send + Sync {
    /// Inserts the page, its body, the author's owner role and the snapshot of
    /// the parent's role rows in one transaction.
    fn create_page(&self, page: &NewPage) -> Result<Page>;
    fn get_page(&self, id: i64) -> Result<Option<Page>>;
    fn get_page_by_public_id(&self, public_id: &str) -> Result<Option<Page>>;
    fn list_pages(&self, query: &PageQuery) -> Result<Vec<Page>>;
    fn update_page(&self, id: i64, update: &PageUpdate) -> Result<Page>;
    /// Re-parents a page, rewriting its path and every descendant path.
    fn move_page(&self, id: i64, new_parent_id: Option<i64>) -> Result<Page>;
    /// Archives the page and its live descendants. Returns the number of pages archived.
    fn archive_page(&self, id: i64, at: DateTime<Utc>) -> Result<usize>;
    /// Restores the page and the descendants archived along with it.
    fn restore_page(&self, id: i64) -> Result<usize>;
    fn delete_page(&self, id: i64) -> Result<bool>;

    fn get_document(&self, page_id: i64) -> Result<Option<Document>>;
    fn update_document(&self, page_id: i64, content: &Value) -> Result<Document>;
    fn create_asset(&self, page_id: i64, asset: &NewAsset) -> Result<Asset>;
    fn list_assets(&self, page_id: i64) -> Result<Vec<Asset>>;
}

/// Per-page role rows.
pub trait RoleStore: Send + Sync {
    /// Inserts grants, leaving existing rows for the same grantee untouched.
    /// Returns the number of rows inserted.
    fn create_page_roles(&self, page_id: i64, grants: &[RoleGrant]) -> Result<usize>;
    /// Inserts or overwrites the role of one grantee.
    fn set_page_role(&self, page_id: i64, grant: &RoleGrant) -> Result<PageRole>;
    fn get_page_role(&self, page_id: i64, grantee: &Grantee) -> Result<Option<PageRole>>;
    /// Finds the row matching a user either by id or by their email.
    fn find_page_role_for_user(&self, page_id: i64, user: &User) -> Result<Option<PageRole>>;
    fn get_page_role_by_id(&self, id: i64) -> Result<Option<PageRole>>;
    fn list_page_roles(&self, page_id: i64) -> Result<Vec<PageRole>>;
    fn delete_page_role(&self, id: i64) -> Result<bool>;
    /// Adds `inherit` rows for the grantees on every live descendant of the page.
    fn propagate_page_roles(&self, page_id: i64, grantees: &[Grantee]) -> Result<usize>;
    /// Converts email-keyed rows into rows for the now registered user.
    fn claim_email_roles(&self, user_id: i64, email: &str) -> Result<usize>;
}

/// Public tokens and stars.
pub trait ShareStore: Send + Sync {
    /// Archives the page's live tokens and issues a new one.
    fn create_public_token(&self, page_id: i64) -> Result<PagePublicToken>;
    fn get_public_token_by_id(&self, id: &str) -> Result<Option<PagePublicToken>>;
    fn get_live_public_token(&self, page_id: i64) -> Result<Option<PagePublicToken>>;
    fn list_public_tokens(&self, page_id: i64) -> Result<Vec<PagePublicToken>>;
    fn archive_public_token(&self, id: &str, at: DateTime<Utc>) -> Result<bool>;

    fn star_page(&self, user_id: i64, page_id: i64, order: f64) -> Result<PageStar>;
    fn unstar_page(&self, user_id: i64, page_id: i64) -> Result<bool>;
    fn list_stars(&self, user_id: i64) -> Result<Vec<PageStar>>;
}

/// The activity log.
pub trait ActivityStore: Send + Sync {
    fn create_activity(&self, activity: &NewActivity) -> Result<Activity>;
    fn get_activity(&self, id: i64) -> Result<Option<Activity>>;
    /// Lists matching activities newest first, at most `query.limit` rows.
    fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Activity>>;
    fn update_activity(&self, id: i64, update: &ActivityUpdate) -> Result<Activity>;
}

/// Store defines the database interface.
pub trait Store: WorkspaceStore + PageStore + RoleStore + ShareStore + ActivityStore {
    fn initialize(&self) -> Result<()>;
}
