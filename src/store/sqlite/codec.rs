//! Column lists and row mappers shared by the SQLite store modules.

use rusqlite::Row;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use super::parse_datetime;
use crate::types::*;

macro_rules! sql_text_enum {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.as_str()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    value
                        .as_str()?
                        .parse()
                        .map_err(|e| FromSqlError::Other(Box::new(e)))
                }
            }
        )+
    };
}

sql_text_enum!(Role, SpaceRole, OrgRole, ViewType, ActionCode);

fn datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    Ok(parse_datetime(&row.get::<_, String>(idx)?))
}

fn optional_datetime(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<chrono::DateTime<chrono::Utc>>> {
    Ok(row.get::<_, Option<String>>(idx)?.map(|s| parse_datetime(&s)))
}

fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<serde_json::Value> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub const USER_COLUMNS: &str = "id, public_id, email, name, created_at";

pub fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        public_id: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        created_at: datetime(row, 4)?,
    })
}

pub const ORGANIZATION_COLUMNS: &str = "id, public_id, name, slug, created_at, updated_at";

pub fn organization_from_row(row: &Row<'_>) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get(0)?,
        public_id: row.get(1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        created_at: datetime(row, 4)?,
        updated_at: datetime(row, 5)?,
    })
}

pub fn organization_member_from_row(row: &Row<'_>) -> rusqlite::Result<OrganizationMember> {
    Ok(OrganizationMember {
        org_id: row.get(0)?,
        user_id: row.get(1)?,
        role: row.get(2)?,
        created_at: datetime(row, 3)?,
    })
}

pub const SPACE_COLUMNS: &str = "id, public_id, org_id, name, slug, created_at, updated_at";

pub fn space_from_row(row: &Row<'_>) -> rusqlite::Result<Space> {
    Ok(Space {
        id: row.get(0)?,
        public_id: row.get(1)?,
        org_id: row.get(2)?,
        name: row.get(3)?,
        slug: row.get(4)?,
        created_at: datetime(row, 5)?,
        updated_at: datetime(row, 6)?,
    })
}

pub fn space_member_from_row(row: &Row<'_>) -> rusqlite::Result<SpaceMember> {
    Ok(SpaceMember {
        space_id: row.get(0)?,
        user_id: row.get(1)?,
        role: row.get(2)?,
        created_at: datetime(row, 3)?,
    })
}

pub const PAGE_COLUMNS: &str = "id, public_id, org_id, space_id, parent_id, path, name, view_type, \
     cover_image, node_id, general_role, author_id, archived_at, created_at, updated_at";

pub fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        public_id: row.get(1)?,
        org_id: row.get(2)?,
        space_id: row.get(3)?,
        parent_id: row.get(4)?,
        path: row.get(5)?,
        name: row.get(6)?,
        view_type: row.get(7)?,
        cover_image: row.get(8)?,
        node_id: row.get(9)?,
        general_role: row.get(10)?,
        author_id: row.get(11)?,
        archived_at: optional_datetime(row, 12)?,
        created_at: datetime(row, 13)?,
        updated_at: datetime(row, 14)?,
    })
}

pub const PAGE_ROLE_COLUMNS: &str = "id, page_id, user_id, email, role, created_at, updated_at";

pub fn page_role_from_row(row: &Row<'_>) -> rusqlite::Result<PageRole> {
    Ok(PageRole {
        id: row.get(0)?,
        page_id: row.get(1)?,
        user_id: row.get(2)?,
        email: row.get(3)?,
        role: row.get(4)?,
        created_at: datetime(row, 5)?,
        updated_at: datetime(row, 6)?,
    })
}

pub fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        page_id: row.get(0)?,
        content: json_column(row, 1)?,
        updated_at: datetime(row, 2)?,
    })
}

pub const ASSET_COLUMNS: &str =
    "id, public_id, page_id, url, mime_type, size_bytes, thumbnail, created_at";

pub fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
    let thumbnail: String = row.get(6)?;
    Ok(Asset {
        id: row.get(0)?,
        public_id: row.get(1)?,
        page_id: row.get(2)?,
        url: row.get(3)?,
        mime_type: row.get(4)?,
        size_bytes: row.get(5)?,
        thumbnail: thumbnail.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: datetime(row, 7)?,
    })
}

pub fn star_from_row(row: &Row<'_>) -> rusqlite::Result<PageStar> {
    Ok(PageStar {
        user_id: row.get(0)?,
        page_id: row.get(1)?,
        order: row.get(2)?,
        created_at: datetime(row, 3)?,
    })
}

pub fn public_token_from_row(row: &Row<'_>) -> rusqlite::Result<PagePublicToken> {
    Ok(PagePublicToken {
        id: row.get(0)?,
        page_id: row.get(1)?,
        created_at: datetime(row, 2)?,
        archived_at: optional_datetime(row, 3)?,
    })
}

pub const ACTIVITY_COLUMNS: &str = "id, public_id, actor_id, action, snapshot, created_at, updated_at";

/// Maps an activity row; related pages are loaded separately.
pub fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        public_id: row.get(1)?,
        actor_id: row.get(2)?,
        action: row.get(3)?,
        related_page_ids: Vec::new(),
        snapshot: json_column(row, 4)?,
        created_at: datetime(row, 5)?,
        updated_at: datetime(row, 6)?,
    })
}
