use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OrgRole, Role, SpaceRole, ViewType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub public_id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub org_id: i64,
    pub user_id: i64,
    pub role: OrgRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: i64,
    pub public_id: String,
    pub org_id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceMember {
    pub space_id: i64,
    pub user_id: i64,
    pub role: SpaceRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub public_id: String,
    pub org_id: i64,
    pub space_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    /// Slash-joined ids of every ancestor, root first. Empty for root pages.
    pub path: String,
    pub name: String,
    pub view_type: ViewType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub general_role: Role,
    pub author_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Path that every child of this page carries.
    pub fn child_path(&self) -> String {
        crate::store::path::append_path(&self.path, self.id)
    }

    /// Number of ancestors recorded in the path.
    pub fn depth(&self) -> usize {
        crate::store::path::path_depth(&self.path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPage {
    pub space_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub view_type: ViewType,
    pub author_id: i64,
    pub cover_image: Option<String>,
    pub node_id: Option<String>,
    pub content: Option<Value>,
    pub asset: Option<NewAsset>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub general_role: Option<Role>,
}

impl PageUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.cover_image.is_none()
            && self.node_id.is_none()
            && self.general_role.is_none()
    }
}

/// Filters for listing pages.
///
/// Without `is_all`, only direct children of `parent_id` are matched (root pages
/// when `parent_id` is `None`). With `is_all`, every page whose path lies under
/// `path_prefix` is matched.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub org_id: Option<i64>,
    pub space_id: Option<i64>,
    /// `None` lists live pages only.
    pub is_archived: Option<bool>,
    pub parent_id: Option<i64>,
    pub is_all: bool,
    pub view_types: Vec<ViewType>,
    pub path_prefix: Option<String>,
    pub offset: usize,
    pub limit: usize,
}

/// Who a page role is granted to. Invitees without an account are keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grantee {
    User(i64),
    Email(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGrant {
    pub grantee: Grantee,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRole {
    pub id: i64,
    pub page_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PageRole {
    pub fn grantee(&self) -> Grantee {
        match (&self.user_id, &self.email) {
            (Some(id), _) => Grantee::User(*id),
            (None, Some(email)) => Grantee::Email(email.clone()),
            (None, None) => Grantee::Email(String::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub page_id: i64,
    pub content: Value,
    pub updated_at: DateTime<Utc>,
}

/// Thumbnail URLs for an uploaded asset. Any of them may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetThumbnail {
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub large: String,
}

impl fmt::Display for AssetThumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for AssetThumbnail {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub public_id: String,
    pub page_id: i64,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub thumbnail: AssetThumbnail,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub url: String,
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: i64,
    #[serde(default)]
    pub thumbnail: AssetThumbnail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStar {
    pub user_id: i64,
    pub page_id: i64,
    /// Wall-clock derived sort key; larger sorts first.
    pub order: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePublicToken {
    pub id: String,
    pub page_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl PagePublicToken {
    pub fn is_live(&self) -> bool {
        self.archived_at.is_none()
    }
}
