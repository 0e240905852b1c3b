use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::codec::*;
use super::{SqliteStore, format_datetime, new_public_id, placeholders};
use crate::error::{Error, MutationResultExt, Result};
use crate::store::ActivityStore;
use crate::store::path::descendant_pattern;
use crate::types::*;

fn related_page_ids(conn: &Connection, activity_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT page_id FROM activity_pages WHERE activity_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![activity_id], |row| row.get::<_, i64>(0))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn link_pages(conn: &Connection, activity_id: i64, page_ids: &[i64]) -> Result<()> {
    for page_id in page_ids {
        conn.execute(
            "INSERT INTO activity_pages (activity_id, page_id) VALUES (?1, ?2)
             ON CONFLICT DO NOTHING",
            params![activity_id, page_id],
        )
        .mutation()?;
    }
    Ok(())
}

fn get_activity(conn: &Connection, id: i64) -> Result<Option<Activity>> {
    let activity = conn
        .query_row(
            &format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"),
            params![id],
            activity_from_row,
        )
        .optional()?;

    match activity {
        Some(mut activity) => {
            activity.related_page_ids = related_page_ids(conn, id)?;
            Ok(Some(activity))
        }
        None => Ok(None),
    }
}

fn query_activities(conn: &Connection, query: &ActivityQuery) -> Result<Vec<Activity>> {
    let mut sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities a WHERE 1 = 1");
    let mut values: Vec<SqlValue> = Vec::new();

    if !query.actions.is_empty() {
        sql.push_str(&format!(" AND a.action IN ({})", placeholders(query.actions.len())));
        values.extend(
            query
                .actions
                .iter()
                .map(|a| SqlValue::Text(a.as_str().to_string())),
        );
    }
    if !query.actor_ids.is_empty() {
        sql.push_str(&format!(
            " AND a.actor_id IN ({})",
            placeholders(query.actor_ids.len())
        ));
        values.extend(query.actor_ids.iter().map(|id| SqlValue::Integer(*id)));
    }
    if !query.related_page_ids.is_empty() {
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM activity_pages ap
                          WHERE ap.activity_id = a.id AND ap.page_id IN ({}))",
            placeholders(query.related_page_ids.len())
        ));
        values.extend(query.related_page_ids.iter().map(|id| SqlValue::Integer(*id)));
    }
    if let Some(prefix) = query.path_prefix.as_deref().filter(|p| !p.is_empty()) {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM activity_pages ap JOIN pages p ON p.id = ap.page_id
                          WHERE ap.activity_id = a.id
                            AND (p.path = ? OR p.path LIKE ? ESCAPE '\\'))",
        );
        values.push(SqlValue::Text(prefix.to_string()));
        values.push(SqlValue::Text(descendant_pattern(prefix)));
    }
    if let Some(before) = &query.before {
        sql.push_str(" AND a.created_at < ?");
        values.push(SqlValue::Text(format_datetime(before)));
    }

    sql.push_str(" ORDER BY a.created_at DESC, a.id DESC LIMIT ?");
    values.push(SqlValue::Integer(query.limit as i64));

    let mut stmt = conn.prepare(&sql)?;
    let mut activities = stmt
        .query_map(params_from_iter(values.iter()), activity_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for activity in &mut activities {
        activity.related_page_ids = related_page_ids(conn, activity.id)?;
    }
    Ok(activities)
}

impl ActivityStore for SqliteStore {
    fn create_activity(&self, activity: &NewActivity) -> Result<Activity> {
        self.with_transaction(|tx| {
            let created_at = format_datetime(&activity.created_at.unwrap_or_else(Utc::now));
            tx.execute(
                "INSERT INTO activities (public_id, actor_id, action, snapshot, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![
                    new_public_id(),
                    activity.actor_id,
                    activity.action,
                    serde_json::to_string(&activity.snapshot)?,
                    created_at,
                ],
            )
            .mutation()?;
            let id = tx.last_insert_rowid();

            link_pages(tx, id, &activity.related_page_ids)?;

            get_activity(tx, id)?.ok_or(Error::NotFound("activity"))
        })
    }

    fn get_activity(&self, id: i64) -> Result<Option<Activity>> {
        get_activity(&self.conn(), id)
    }

    fn list_activities(&self, query: &ActivityQuery) -> Result<Vec<Activity>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        if query.lock {
            self.with_immediate_transaction(|tx| query_activities(tx, query))
        } else {
            query_activities(&self.conn(), query)
        }
    }

    fn update_activity(&self, id: i64, update: &ActivityUpdate) -> Result<Activity> {
        self.with_immediate_transaction(|tx| {
            let mut current = get_activity(tx, id)?.ok_or(Error::NotFound("activity"))?;

            if let Some(action) = update.action {
                current.action = action;
            }
            if let Some(snapshot) = &update.snapshot {
                current.snapshot = snapshot.clone();
            }

            tx.execute(
                "UPDATE activities SET action = ?1, snapshot = ?2, updated_at = ?3 WHERE id = ?4",
                params![
                    current.action,
                    serde_json::to_string(&current.snapshot)?,
                    format_datetime(&Utc::now()),
                    id
                ],
            )
            .mutation()?;

            link_pages(tx, id, &update.add_related_page_ids)?;

            get_activity(tx, id)?.ok_or(Error::NotFound("activity"))
        })
    }
}
