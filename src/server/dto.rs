use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::{Access, Grant};
use crate::types::{Role, RoleGrant, ViewType};

#[derive(Debug, Default, Deserialize)]
pub struct ListPagesParams {
    #[serde(default)]
    pub space_id: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Whole subtree under `parent_id` instead of direct children.
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub archived: bool,
    /// Comma separated, e.g. `document,table`.
    #[serde(default)]
    pub view_types: Option<String>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListPagesParams {
    pub fn parse_view_types(&self) -> Result<Vec<ViewType>, String> {
        let Some(raw) = self.view_types.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<ViewType>().map_err(|e| e.to_string()))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct MovePageRequest {
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub content: Value,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub grants: Vec<RoleGrant>,
    #[serde(default)]
    pub propagate: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityParams {
    #[serde(default)]
    pub before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub subtree: bool,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub role: Option<Role>,
    pub capabilities: Vec<&'static str>,
    pub grant: Grant,
}

impl From<Access> for AccessResponse {
    fn from(access: Access) -> Self {
        Self {
            role: access.role,
            capabilities: access.capabilities.expand_implied().to_strings(),
            grant: access.grant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_types() {
        let params = ListPagesParams {
            view_types: Some("document, table".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.parse_view_types().unwrap(),
            vec![ViewType::Document, ViewType::Table]
        );

        let params = ListPagesParams {
            view_types: Some("board".to_string()),
            ..Default::default()
        };
        assert!(params.parse_view_types().is_err());
        assert!(ListPagesParams::default().parse_view_types().unwrap().is_empty());
    }
}
