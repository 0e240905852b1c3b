use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::Activity;

/// An entity listed newest first by a timestamp.
pub trait Cursored {
    fn cursor(&self) -> DateTime<Utc>;
}

impl Cursored for Activity {
    fn cursor(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// One page of a time-ordered listing.
///
/// `next_cursor` is the ordering key of the last item when the page is full,
/// and `None` when fewer than `limit` items came back.
#[derive(Debug, Clone, Serialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<DateTime<Utc>>,
}

impl<T: Cursored> CursorPage<T> {
    pub fn new(items: Vec<T>, limit: usize) -> Self {
        let next_cursor = if limit > 0 && items.len() >= limit {
            items.last().map(Cursored::cursor)
        } else {
            None
        };
        Self { items, next_cursor }
    }
}

impl<T> CursorPage<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> CursorPage<U> {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}
