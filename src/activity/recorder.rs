use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::cursor::CursorPage;
use crate::config::ListConfig;
use crate::error::Result;
use crate::store::Store;
use crate::types::{ActionCode, Activity, ActivityQuery, ActivityUpdate, NewActivity};

/// Appends and reads the activity log.
#[derive(Clone)]
pub struct ActivityRecorder {
    store: Arc<dyn Store>,
    limits: ListConfig,
}

impl ActivityRecorder {
    pub fn new(store: Arc<dyn Store>, limits: ListConfig) -> Self {
        Self { store, limits }
    }

    pub fn record(
        &self,
        actor_id: i64,
        action: ActionCode,
        related_page_ids: Vec<i64>,
        snapshot: Value,
    ) -> Result<Activity> {
        self.store.create_activity(&NewActivity {
            actor_id,
            action,
            related_page_ids,
            snapshot,
            created_at: None,
        })
    }

    /// Records without failing the caller. Errors are logged and dropped.
    pub fn record_detached(
        &self,
        actor_id: i64,
        action: ActionCode,
        related_page_ids: Vec<i64>,
        snapshot: Value,
    ) {
        if let Err(e) = self.record(actor_id, action, related_page_ids, snapshot) {
            tracing::warn!("Failed to record {action} activity for user {actor_id}: {e}");
        }
    }

    pub fn get(&self, id: i64) -> Result<Option<Activity>> {
        self.store.get_activity(id)
    }

    /// Lists newest first. A zero limit takes the configured default.
    pub fn list(&self, mut query: ActivityQuery) -> Result<CursorPage<Activity>> {
        query.limit = self.limits.clamp(Some(query.limit));
        let items = self.store.list_activities(&query)?;
        Ok(CursorPage::new(items, query.limit))
    }

    /// The feed of one page, as recorded against it directly.
    pub fn list_for_page(
        &self,
        page_id: i64,
        before: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<CursorPage<Activity>> {
        self.list(ActivityQuery {
            related_page_ids: vec![page_id],
            before,
            limit: limit.unwrap_or(0),
            ..Default::default()
        })
    }

    /// Everything recorded against a page or anything beneath it.
    pub fn list_for_subtree(
        &self,
        page_id: i64,
        child_prefix: &str,
        before: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<CursorPage<Activity>> {
        let limit = self.limits.clamp(limit);
        let query = ActivityQuery {
            before,
            limit,
            ..Default::default()
        };

        let own = self.store.list_activities(&ActivityQuery {
            related_page_ids: vec![page_id],
            ..query.clone()
        })?;
        let below = self.store.list_activities(&ActivityQuery {
            path_prefix: Some(child_prefix.to_string()),
            ..query
        })?;

        let mut items: Vec<Activity> = own;
        for activity in below {
            if !items.iter().any(|a| a.id == activity.id) {
                items.push(activity);
            }
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items.truncate(limit);

        Ok(CursorPage::new(items, limit))
    }

    /// Overwrites action or snapshot in place and adds related pages.
    pub fn update(&self, id: i64, update: &ActivityUpdate) -> Result<Activity> {
        let activity = self.store.update_activity(id, update)?;
        tracing::info!("Corrected activity {} ({})", activity.id, activity.action);
        Ok(activity)
    }
}
