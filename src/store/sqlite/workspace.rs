use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use super::codec::*;
use super::{SqliteStore, format_datetime, new_public_id};
use crate::error::{Error, MutationResultExt, Result};
use crate::store::WorkspaceStore;
use crate::types::*;

pub(super) fn get_organization(conn: &Connection, id: i64) -> Result<Option<Organization>> {
    conn.query_row(
        &format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = ?1"),
        params![id],
        organization_from_row,
    )
    .optional()
    .map_err(Error::from)
}

pub(super) fn get_space(conn: &Connection, id: i64) -> Result<Option<Space>> {
    conn.query_row(
        &format!("SELECT {SPACE_COLUMNS} FROM spaces WHERE id = ?1"),
        params![id],
        space_from_row,
    )
    .optional()
    .map_err(Error::from)
}

impl WorkspaceStore for SqliteStore {
    // User operations

    fn create_user(&self, email: &str, name: &str) -> Result<User> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (public_id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![new_public_id(), email, name, format_datetime(&Utc::now())],
        )
        .mutation()?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .map_err(Error::from)
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    // Organization operations

    fn create_organization(&self, name: &str, slug: &str, owner_id: i64) -> Result<Organization> {
        self.with_transaction(|tx| {
            let now = format_datetime(&Utc::now());
            tx.execute(
                "INSERT INTO organizations (public_id, name, slug, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![new_public_id(), name, slug, now],
            )
            .map_err(|e| match Error::mutation(e) {
                Error::Conflict(_) => Error::Conflict(format!("Organization '{slug}' already exists")),
                other => other,
            })?;
            let org_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO organization_members (org_id, user_id, role, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![org_id, owner_id, OrgRole::Owner, now],
            )
            .mutation()?;

            get_organization(tx, org_id)?.ok_or(Error::NotFound("organization"))
        })
    }

    fn get_organization(&self, id: i64) -> Result<Option<Organization>> {
        get_organization(&self.conn(), id)
    }

    fn upsert_organization_member(&self, org_id: i64, user_id: i64, role: OrgRole) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO organization_members (org_id, user_id, role, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (org_id, user_id) DO UPDATE SET role = excluded.role",
                params![org_id, user_id, role, format_datetime(&Utc::now())],
            )
            .mutation()?;
        Ok(())
    }

    fn get_organization_member(
        &self,
        org_id: i64,
        user_id: i64,
    ) -> Result<Option<OrganizationMember>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT org_id, user_id, role, created_at
             FROM organization_members WHERE org_id = ?1 AND user_id = ?2",
            params![org_id, user_id],
            organization_member_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_organization_members(&self, org_id: i64) -> Result<Vec<OrganizationMember>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT org_id, user_id, role, created_at
             FROM organization_members WHERE org_id = ?1 ORDER BY user_id",
        )?;

        let rows = stmt.query_map(params![org_id], organization_member_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Space operations

    fn create_space(&self, org_id: i64, name: &str, slug: &str, owner_id: i64) -> Result<Space> {
        self.with_transaction(|tx| {
            if get_organization(tx, org_id)?.is_none() {
                return Err(Error::NotFound("organization"));
            }

            let now = format_datetime(&Utc::now());
            tx.execute(
                "INSERT INTO spaces (public_id, org_id, name, slug, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![new_public_id(), org_id, name, slug, now],
            )
            .map_err(|e| match Error::mutation(e) {
                Error::Conflict(_) => Error::Conflict(format!("Space '{slug}' already exists")),
                other => other,
            })?;
            let space_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO space_members (space_id, user_id, role, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![space_id, owner_id, SpaceRole::Owner, now],
            )
            .mutation()?;

            get_space(tx, space_id)?.ok_or(Error::NotFound("space"))
        })
    }

    fn get_space(&self, id: i64) -> Result<Option<Space>> {
        get_space(&self.conn(), id)
    }

    fn list_spaces(&self, org_id: i64) -> Result<Vec<Space>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SPACE_COLUMNS} FROM spaces WHERE org_id = ?1 ORDER BY slug"
        ))?;

        let rows = stmt.query_map(params![org_id], space_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn upsert_space_member(&self, space_id: i64, user_id: i64, role: SpaceRole) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO space_members (space_id, user_id, role, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (space_id, user_id) DO UPDATE SET role = excluded.role",
                params![space_id, user_id, role, format_datetime(&Utc::now())],
            )
            .mutation()?;
        Ok(())
    }

    fn get_space_member(&self, space_id: i64, user_id: i64) -> Result<Option<SpaceMember>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT space_id, user_id, role, created_at
             FROM space_members WHERE space_id = ?1 AND user_id = ?2",
            params![space_id, user_id],
            space_member_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_space_member(&self, space_id: i64, user_id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute(
                "DELETE FROM space_members WHERE space_id = ?1 AND user_id = ?2",
                params![space_id, user_id],
            )
            .mutation()?;
        Ok(rows > 0)
    }
}
