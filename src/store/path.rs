//! Materialized paths: a page's path is the slash-joined ids of its ancestors,
//! root first, and is empty for root pages.

/// Returns the path of a child whose parent has `parent_path` and `parent_id`.
pub fn append_path(parent_path: &str, parent_id: i64) -> String {
    if parent_path.is_empty() {
        parent_id.to_string()
    } else {
        format!("{parent_path}/{parent_id}")
    }
}

pub fn path_depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split('/').count()
    }
}

/// Returns true if `path` is `prefix` itself or lies underneath it.
///
/// `1/23` starts with `1/2` but does not lie beneath it, so the match has to
/// end on a segment boundary.
pub fn is_within(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path == prefix
        || (path.len() > prefix.len()
            && path.starts_with(prefix)
            && path.as_bytes()[prefix.len()] == b'/')
}

/// SQL LIKE pattern matching every path strictly beneath `prefix`.
pub fn descendant_pattern(prefix: &str) -> String {
    format!("{}/%", escape_like(prefix))
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
