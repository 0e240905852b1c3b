use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rusqlite::{Connection, OptionalExtension, params};

use super::codec::*;
use super::pages::require_page;
use super::{SqliteStore, format_datetime};
use crate::error::{Error, MutationResultExt, Result};
use crate::store::ShareStore;
use crate::types::*;

const TOKEN_LENGTH: usize = 32;
const TOKEN_COLUMNS: &str = "id, page_id, created_at, archived_at";

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn get_public_token(conn: &Connection, id: &str) -> Result<Option<PagePublicToken>> {
    conn.query_row(
        &format!("SELECT {TOKEN_COLUMNS} FROM public_tokens WHERE id = ?1"),
        params![id],
        public_token_from_row,
    )
    .optional()
    .map_err(Error::from)
}

impl ShareStore for SqliteStore {
    fn create_public_token(&self, page_id: i64) -> Result<PagePublicToken> {
        self.with_transaction(|tx| {
            require_page(tx, page_id)?;

            let now = format_datetime(&Utc::now());
            let archived = tx
                .execute(
                    "UPDATE public_tokens SET archived_at = ?1
                     WHERE page_id = ?2 AND archived_at IS NULL",
                    params![now, page_id],
                )
                .mutation()?;
            if archived > 0 {
                tracing::debug!("Archived {archived} live token(s) for page {page_id}");
            }

            let token = generate_token();
            tx.execute(
                "INSERT INTO public_tokens (id, page_id, created_at) VALUES (?1, ?2, ?3)",
                params![token, page_id, now],
            )
            .mutation()?;

            get_public_token(tx, &token)?.ok_or(Error::NotFound("public token"))
        })
    }

    fn get_public_token_by_id(&self, id: &str) -> Result<Option<PagePublicToken>> {
        get_public_token(&self.conn(), id)
    }

    fn get_live_public_token(&self, page_id: i64) -> Result<Option<PagePublicToken>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {TOKEN_COLUMNS} FROM public_tokens
                 WHERE page_id = ?1 AND archived_at IS NULL
                 ORDER BY created_at DESC LIMIT 1"
            ),
            params![page_id],
            public_token_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_public_tokens(&self, page_id: i64) -> Result<Vec<PagePublicToken>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOKEN_COLUMNS} FROM public_tokens WHERE page_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![page_id], public_token_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn archive_public_token(&self, id: &str, at: DateTime<Utc>) -> Result<bool> {
        let rows = self
            .conn()
            .execute(
                "UPDATE public_tokens SET archived_at = ?1 WHERE id = ?2 AND archived_at IS NULL",
                params![format_datetime(&at), id],
            )
            .mutation()?;
        Ok(rows > 0)
    }

    // Stars

    fn star_page(&self, user_id: i64, page_id: i64, order: f64) -> Result<PageStar> {
        let conn = self.conn();
        require_page(&conn, page_id)?;

        conn.execute(
            "INSERT INTO page_stars (user_id, page_id, order_key, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id, page_id) DO UPDATE SET order_key = excluded.order_key",
            params![user_id, page_id, order, format_datetime(&Utc::now())],
        )
        .mutation()?;

        conn.query_row(
            "SELECT user_id, page_id, order_key, created_at
             FROM page_stars WHERE user_id = ?1 AND page_id = ?2",
            params![user_id, page_id],
            star_from_row,
        )
        .map_err(Error::from)
    }

    fn unstar_page(&self, user_id: i64, page_id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute(
                "DELETE FROM page_stars WHERE user_id = ?1 AND page_id = ?2",
                params![user_id, page_id],
            )
            .mutation()?;
        Ok(rows > 0)
    }

    fn list_stars(&self, user_id: i64) -> Result<Vec<PageStar>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, page_id, order_key, created_at
             FROM page_stars WHERE user_id = ?1 ORDER BY order_key DESC",
        )?;

        let rows = stmt.query_map(params![user_id], star_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
