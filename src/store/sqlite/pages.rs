use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::Value;

use super::codec::*;
use super::workspace::get_space;
use super::{SqliteStore, format_datetime, new_public_id, placeholders};
use crate::error::{Error, MutationResultExt, Result};
use crate::store::PageStore;
use crate::store::path::{append_path, descendant_pattern};
use crate::types::*;

/// Matches a page (?1), and everything beneath its child prefix (?2, ?3).
const SUBTREE_CLAUSE: &str = "(id = ?1 OR path = ?2 OR path LIKE ?3 ESCAPE '\\')";

pub(super) fn get_page(conn: &Connection, id: i64) -> Result<Option<Page>> {
    conn.query_row(
        &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = ?1"),
        params![id],
        page_from_row,
    )
    .optional()
    .map_err(Error::from)
}

pub(super) fn require_page(conn: &Connection, id: i64) -> Result<Page> {
    get_page(conn, id)?.ok_or(Error::NotFound("page"))
}

fn get_document(conn: &Connection, page_id: i64) -> Result<Option<Document>> {
    conn.query_row(
        "SELECT page_id, content, updated_at FROM documents WHERE page_id = ?1",
        params![page_id],
        document_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn insert_asset(conn: &Connection, page_id: i64, asset: &NewAsset) -> Result<Asset> {
    conn.execute(
        "INSERT INTO assets (public_id, page_id, url, mime_type, size_bytes, thumbnail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new_public_id(),
            page_id,
            asset.url,
            asset.mime_type,
            asset.size_bytes,
            asset.thumbnail.to_string(),
            format_datetime(&Utc::now()),
        ],
    )
    .mutation()?;

    let id = conn.last_insert_rowid();
    conn.query_row(
        &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1"),
        params![id],
        asset_from_row,
    )
    .map_err(Error::from)
}

fn sql_int(value: usize, name: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::BadRequest(format!("{name} is out of range")))
}

fn default_content(view_type: ViewType) -> Value {
    match view_type {
        ViewType::Document => serde_json::json!({}),
        ViewType::Table => serde_json::json!({ "columns": [], "rows": [] }),
    }
}

impl PageStore for SqliteStore {
    fn create_page(&self, new: &NewPage) -> Result<Page> {
        self.with_transaction(|tx| {
            let space = get_space(tx, new.space_id)?.ok_or(Error::NotFound("space"))?;

            let parent = match new.parent_id {
                Some(parent_id) => {
                    let parent = get_page(tx, parent_id)?
                        .ok_or_else(|| Error::BadRequest("Parent page not found".to_string()))?;
                    if parent.space_id != space.id {
                        return Err(Error::BadRequest(
                            "Parent page must belong to the same space".to_string(),
                        ));
                    }
                    if parent.is_archived() {
                        return Err(Error::BadRequest("Parent page is archived".to_string()));
                    }
                    Some(parent)
                }
                None => None,
            };

            let path = parent.as_ref().map(Page::child_path).unwrap_or_default();
            let general_role = Role::default_general(parent.is_none());
            let now = format_datetime(&Utc::now());

            tx.execute(
                "INSERT INTO pages (public_id, org_id, space_id, parent_id, path, name, view_type,
                                    cover_image, node_id, general_role, author_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
                params![
                    new_public_id(),
                    space.org_id,
                    space.id,
                    new.parent_id,
                    path,
                    new.name,
                    new.view_type,
                    new.cover_image,
                    new.node_id,
                    general_role,
                    new.author_id,
                    now,
                ],
            )
            .mutation()?;
            let page_id = tx.last_insert_rowid();

            let content = new
                .content
                .clone()
                .unwrap_or_else(|| default_content(new.view_type));
            tx.execute(
                "INSERT INTO documents (page_id, content, updated_at) VALUES (?1, ?2, ?3)",
                params![page_id, serde_json::to_string(&content)?, now],
            )
            .mutation()?;

            if let Some(asset) = &new.asset {
                insert_asset(tx, page_id, asset)?;
            }

            tx.execute(
                "INSERT INTO page_roles (page_id, user_id, email, role, created_at, updated_at)
                 VALUES (?1, ?2, NULL, ?3, ?4, ?4)",
                params![page_id, new.author_id, Role::Owner, now],
            )
            .mutation()?;

            // Snapshot the parent's grantees as inherit rows; the author keeps owner.
            if let Some(parent) = &parent {
                tx.execute(
                    "INSERT INTO page_roles (page_id, user_id, email, role, created_at, updated_at)
                     SELECT ?1, user_id, email, ?2, ?3, ?3
                     FROM page_roles WHERE page_id = ?4 AND role <> ?5
                     ON CONFLICT DO NOTHING",
                    params![page_id, Role::Inherit, now, parent.id, Role::Restrict],
                )
                .mutation()?;
            }

            require_page(tx, page_id)
        })
    }

    fn get_page(&self, id: i64) -> Result<Option<Page>> {
        get_page(&self.conn(), id)
    }

    fn get_page_by_public_id(&self, public_id: &str) -> Result<Option<Page>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PAGE_COLUMNS} FROM pages WHERE public_id = ?1"),
            params![public_id],
            page_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_pages(&self, query: &PageQuery) -> Result<Vec<Page>> {
        let mut sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE 1 = 1");
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(org_id) = query.org_id {
            sql.push_str(" AND org_id = ?");
            values.push(SqlValue::Integer(org_id));
        }
        if let Some(space_id) = query.space_id {
            sql.push_str(" AND space_id = ?");
            values.push(SqlValue::Integer(space_id));
        }

        match query.is_archived {
            Some(true) => sql.push_str(" AND archived_at IS NOT NULL"),
            _ => sql.push_str(" AND archived_at IS NULL"),
        }

        if query.is_all {
            if let Some(prefix) = query.path_prefix.as_deref().filter(|p| !p.is_empty()) {
                sql.push_str(" AND (path = ? OR path LIKE ? ESCAPE '\\')");
                values.push(SqlValue::Text(prefix.to_string()));
                values.push(SqlValue::Text(descendant_pattern(prefix)));
            }
        } else {
            match query.parent_id {
                Some(parent_id) => {
                    sql.push_str(" AND parent_id = ?");
                    values.push(SqlValue::Integer(parent_id));
                }
                None => sql.push_str(" AND parent_id IS NULL"),
            }
        }

        if !query.view_types.is_empty() {
            sql.push_str(&format!(
                " AND view_type IN ({})",
                placeholders(query.view_types.len())
            ));
            values.extend(
                query
                    .view_types
                    .iter()
                    .map(|v| SqlValue::Text(v.as_str().to_string())),
            );
        }

        // LIMIT -1 is unbounded in SQLite.
        let limit = match query.limit {
            0 => -1,
            n => sql_int(n, "limit")?,
        };
        sql.push_str(" ORDER BY created_at, id LIMIT ? OFFSET ?");
        values.push(SqlValue::Integer(limit));
        values.push(SqlValue::Integer(sql_int(query.offset, "offset")?));

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), page_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_page(&self, id: i64, update: &PageUpdate) -> Result<Page> {
        self.with_transaction(|tx| {
            let mut page = require_page(tx, id)?;

            if let Some(name) = &update.name {
                page.name = name.clone();
            }
            if let Some(cover_image) = &update.cover_image {
                page.cover_image = Some(cover_image.clone()).filter(|c| !c.is_empty());
            }
            if let Some(node_id) = &update.node_id {
                page.node_id = Some(node_id.clone()).filter(|n| !n.is_empty());
            }
            if let Some(general_role) = update.general_role {
                if page.is_root() && general_role == Role::Inherit {
                    return Err(Error::BadRequest(
                        "Root pages have no parent to inherit from".to_string(),
                    ));
                }
                page.general_role = general_role;
            }

            tx.execute(
                "UPDATE pages SET name = ?1, cover_image = ?2, node_id = ?3, general_role = ?4,
                                  updated_at = ?5
                 WHERE id = ?6",
                params![
                    page.name,
                    page.cover_image,
                    page.node_id,
                    page.general_role,
                    format_datetime(&Utc::now()),
                    id
                ],
            )
            .mutation()?;

            require_page(tx, id)
        })
    }

    fn move_page(&self, id: i64, new_parent_id: Option<i64>) -> Result<Page> {
        self.with_transaction(|tx| {
            let page = require_page(tx, id)?;
            let old_prefix = page.child_path();

            let new_path = match new_parent_id {
                Some(parent_id) => {
                    if parent_id == page.id {
                        return Err(Error::BadRequest("Page cannot be its own parent".to_string()));
                    }
                    let parent = get_page(tx, parent_id)?
                        .ok_or_else(|| Error::BadRequest("Parent page not found".to_string()))?;
                    if parent.space_id != page.space_id {
                        return Err(Error::BadRequest(
                            "Pages cannot be moved across spaces".to_string(),
                        ));
                    }
                    if crate::store::path::is_within(&parent.path, &old_prefix) {
                        return Err(Error::BadRequest(
                            "Moving page would create a cycle".to_string(),
                        ));
                    }
                    if parent.is_archived() {
                        return Err(Error::BadRequest("Parent page is archived".to_string()));
                    }
                    parent.child_path()
                }
                None => String::new(),
            };

            let general_role = if new_parent_id.is_none() && page.general_role == Role::Inherit {
                Role::Restrict
            } else {
                page.general_role
            };

            let now = format_datetime(&Utc::now());
            let new_prefix = append_path(&new_path, page.id);

            tx.execute(
                "UPDATE pages SET parent_id = ?1, path = ?2, general_role = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![new_parent_id, new_path, general_role, now, id],
            )
            .mutation()?;

            let moved = tx
                .execute(
                    "UPDATE pages SET path = ?1 || substr(path, ?2), updated_at = ?3
                     WHERE path = ?4 OR path LIKE ?5 ESCAPE '\\'",
                    params![
                        new_prefix,
                        old_prefix.len() as i64 + 1,
                        now,
                        old_prefix,
                        descendant_pattern(&old_prefix)
                    ],
                )
                .mutation()?;

            tracing::debug!("Moved page {id} with {moved} descendants");

            require_page(tx, id)
        })
    }

    fn archive_page(&self, id: i64, at: DateTime<Utc>) -> Result<usize> {
        self.with_transaction(|tx| {
            let page = require_page(tx, id)?;
            if page.is_archived() {
                return Ok(0);
            }

            let prefix = page.child_path();
            let at = format_datetime(&at);
            let rows = tx
                .execute(
                    &format!(
                        "UPDATE pages SET archived_at = ?4, updated_at = ?4
                         WHERE {SUBTREE_CLAUSE} AND archived_at IS NULL"
                    ),
                    params![id, prefix, descendant_pattern(&prefix), at],
                )
                .mutation()?;
            Ok(rows)
        })
    }

    fn restore_page(&self, id: i64) -> Result<usize> {
        self.with_transaction(|tx| {
            let page = require_page(tx, id)?;
            let Some(archived_at) = page.archived_at else {
                return Ok(0);
            };

            if let Some(parent_id) = page.parent_id {
                if require_page(tx, parent_id)?.is_archived() {
                    return Err(Error::BadRequest("Parent page is archived".to_string()));
                }
            }

            // Only descendants archived by the same operation come back.
            let prefix = page.child_path();
            let rows = tx
                .execute(
                    &format!(
                        "UPDATE pages SET archived_at = NULL, updated_at = ?5
                         WHERE {SUBTREE_CLAUSE} AND archived_at = ?4"
                    ),
                    params![
                        id,
                        prefix,
                        descendant_pattern(&prefix),
                        format_datetime(&archived_at),
                        format_datetime(&Utc::now())
                    ],
                )
                .mutation()?;
            Ok(rows)
        })
    }

    fn delete_page(&self, id: i64) -> Result<bool> {
        self.with_transaction(|tx| {
            let Some(page) = get_page(tx, id)? else {
                return Ok(false);
            };

            let prefix = page.child_path();
            let rows = tx
                .execute(
                    &format!("DELETE FROM pages WHERE {SUBTREE_CLAUSE}"),
                    params![id, prefix, descendant_pattern(&prefix)],
                )
                .mutation()?;
            Ok(rows > 0)
        })
    }

    fn get_document(&self, page_id: i64) -> Result<Option<Document>> {
        get_document(&self.conn(), page_id)
    }

    fn update_document(&self, page_id: i64, content: &Value) -> Result<Document> {
        let conn = self.conn();
        let rows = conn
            .execute(
                "UPDATE documents SET content = ?1, updated_at = ?2 WHERE page_id = ?3",
                params![
                    serde_json::to_string(content)?,
                    format_datetime(&Utc::now()),
                    page_id
                ],
            )
            .mutation()?;

        if rows == 0 {
            return Err(Error::NotFound("document"));
        }
        get_document(&conn, page_id)?.ok_or(Error::NotFound("document"))
    }

    fn create_asset(&self, page_id: i64, asset: &NewAsset) -> Result<Asset> {
        let conn = self.conn();
        require_page(&conn, page_id)?;
        insert_asset(&conn, page_id, asset)
    }

    fn list_assets(&self, page_id: i64) -> Result<Vec<Asset>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE page_id = ?1 ORDER BY created_at, id"
        ))?;

        let rows = stmt.query_map(params![page_id], asset_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
