use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use super::codec::*;
use super::pages::require_page;
use super::{SqliteStore, format_datetime};
use crate::error::{Error, MutationResultExt, Result};
use crate::store::RoleStore;
use crate::store::path::descendant_pattern;
use crate::types::*;

fn get_page_role(conn: &Connection, page_id: i64, grantee: &Grantee) -> Result<Option<PageRole>> {
    let result = match grantee {
        Grantee::User(user_id) => conn.query_row(
            &format!("SELECT {PAGE_ROLE_COLUMNS} FROM page_roles WHERE page_id = ?1 AND user_id = ?2"),
            params![page_id, user_id],
            page_role_from_row,
        ),
        Grantee::Email(email) => conn.query_row(
            &format!("SELECT {PAGE_ROLE_COLUMNS} FROM page_roles WHERE page_id = ?1 AND email = ?2"),
            params![page_id, email],
            page_role_from_row,
        ),
    };

    result.optional().map_err(Error::from)
}

/// Inserts one grant, doing nothing when the grantee already has a row.
fn insert_grant_if_absent(
    conn: &Connection,
    page_id: i64,
    grantee: &Grantee,
    role: Role,
    now: &str,
) -> Result<usize> {
    let (user_id, email) = match grantee {
        Grantee::User(id) => (Some(*id), None),
        Grantee::Email(email) => (None, Some(email.as_str())),
    };

    conn.execute(
        "INSERT INTO page_roles (page_id, user_id, email, role, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT DO NOTHING",
        params![page_id, user_id, email, role, now],
    )
    .mutation()
}

fn validate_grantee(grantee: &Grantee) -> Result<()> {
    if let Grantee::Email(email) = grantee {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(Error::BadRequest(format!("Invalid email '{email}'")));
        }
    }
    Ok(())
}

impl RoleStore for SqliteStore {
    fn create_page_roles(&self, page_id: i64, grants: &[RoleGrant]) -> Result<usize> {
        for grant in grants {
            validate_grantee(&grant.grantee)?;
        }

        self.with_transaction(|tx| {
            require_page(tx, page_id)?;

            let now = format_datetime(&Utc::now());
            let mut inserted = 0;
            for grant in grants {
                inserted += insert_grant_if_absent(tx, page_id, &grant.grantee, grant.role, &now)?;
            }
            Ok(inserted)
        })
    }

    fn set_page_role(&self, page_id: i64, grant: &RoleGrant) -> Result<PageRole> {
        validate_grantee(&grant.grantee)?;

        self.with_transaction(|tx| {
            require_page(tx, page_id)?;

            let now = format_datetime(&Utc::now());
            let written = match &grant.grantee {
                Grantee::User(user_id) => tx.execute(
                    "INSERT INTO page_roles (page_id, user_id, email, role, created_at, updated_at)
                     VALUES (?1, ?2, NULL, ?3, ?4, ?4)
                     ON CONFLICT (page_id, user_id) WHERE user_id IS NOT NULL
                     DO UPDATE SET role = excluded.role, updated_at = excluded.updated_at",
                    params![page_id, user_id, grant.role, now],
                ),
                Grantee::Email(email) => tx.execute(
                    "INSERT INTO page_roles (page_id, user_id, email, role, created_at, updated_at)
                     VALUES (?1, NULL, ?2, ?3, ?4, ?4)
                     ON CONFLICT (page_id, email) WHERE email IS NOT NULL
                     DO UPDATE SET role = excluded.role, updated_at = excluded.updated_at",
                    params![page_id, email, grant.role, now],
                ),
            };
            written.mutation()?;

            get_page_role(tx, page_id, &grant.grantee)?.ok_or(Error::NotFound("page role"))
        })
    }

    fn get_page_role(&self, page_id: i64, grantee: &Grantee) -> Result<Option<PageRole>> {
        get_page_role(&self.conn(), page_id, grantee)
    }

    fn find_page_role_for_user(&self, page_id: i64, user: &User) -> Result<Option<PageRole>> {
        let conn = self.conn();
        // An unclaimed invite for the user's email still counts; the id row wins.
        conn.query_row(
            &format!(
                "SELECT {PAGE_ROLE_COLUMNS} FROM page_roles
                 WHERE page_id = ?1 AND (user_id = ?2 OR email = ?3)
                 ORDER BY user_id IS NULL
                 LIMIT 1"
            ),
            params![page_id, user.id, user.email],
            page_role_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_page_role_by_id(&self, id: i64) -> Result<Option<PageRole>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PAGE_ROLE_COLUMNS} FROM page_roles WHERE id = ?1"),
            params![id],
            page_role_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_page_roles(&self, page_id: i64) -> Result<Vec<PageRole>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PAGE_ROLE_COLUMNS} FROM page_roles WHERE page_id = ?1 ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![page_id], page_role_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_page_role(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM page_roles WHERE id = ?1", params![id])
            .mutation()?;
        Ok(rows > 0)
    }

    fn propagate_page_roles(&self, page_id: i64, grantees: &[Grantee]) -> Result<usize> {
        if grantees.is_empty() {
            return Ok(0);
        }

        self.with_transaction(|tx| {
            let page = require_page(tx, page_id)?;
            let prefix = page.child_path();

            let mut stmt = tx.prepare(
                "SELECT id FROM pages
                 WHERE (path = ?1 OR path LIKE ?2 ESCAPE '\\') AND archived_at IS NULL",
            )?;
            let descendants = stmt
                .query_map(params![prefix, descendant_pattern(&prefix)], |row| {
                    row.get::<_, i64>(0)
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let now = format_datetime(&Utc::now());
            let mut inserted = 0;
            for descendant in descendants {
                for grantee in grantees {
                    inserted += insert_grant_if_absent(tx, descendant, grantee, Role::Inherit, &now)?;
                }
            }
            Ok(inserted)
        })
    }

    fn claim_email_roles(&self, user_id: i64, email: &str) -> Result<usize> {
        self.with_transaction(|tx| {
            let now = format_datetime(&Utc::now());
            let claimed = tx
                .execute(
                    "UPDATE OR IGNORE page_roles SET user_id = ?1, email = NULL, updated_at = ?2
                     WHERE email = ?3",
                    params![user_id, now, email],
                )
                .mutation()?;

            // Rows left behind collided with an existing row for the user.
            tx.execute("DELETE FROM page_roles WHERE email = ?1", params![email])
                .mutation()?;

            Ok(claimed)
        })
    }
}
