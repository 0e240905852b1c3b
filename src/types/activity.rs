use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::role::string_enum;

string_enum! {
    pub enum ActionCode("action code") {
        Create => "create",
        Remove => "remove",
        Move => "move",
        Visit => "visit",
        Update => "update",
        Rename => "rename",
        Archive => "archive",
        Upload => "upload",
    }
}

/// One recorded event. A single event may relate to several pages, e.g. a move
/// relates the page, its old parent and its new parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub public_id: String,
    pub actor_id: i64,
    pub action: ActionCode,
    pub related_page_ids: Vec<i64>,
    pub snapshot: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub actor_id: i64,
    pub action: ActionCode,
    pub related_page_ids: Vec<i64>,
    pub snapshot: Value,
    /// Stamped at insert time when `None`.
    pub created_at: Option<DateTime<Utc>>,
}

/// Correction applied to a recorded activity. Related pages are only ever added.
#[derive(Debug, Clone, Default)]
pub struct ActivityUpdate {
    pub action: Option<ActionCode>,
    pub snapshot: Option<Value>,
    pub add_related_page_ids: Vec<i64>,
}

/// Filters for listing activities, newest first.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    pub actions: Vec<ActionCode>,
    pub actor_ids: Vec<i64>,
    pub related_page_ids: Vec<i64>,
    /// Matches activities related to any page whose path lies under this prefix.
    pub path_prefix: Option<String>,
    /// Only activities strictly older than this instant.
    pub before: Option<DateTime<Utc>>,
    pub limit: usize,
    /// Read under a write reservation so concurrent writers wait.
    pub lock: bool,
}
