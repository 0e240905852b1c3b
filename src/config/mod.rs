mod server;

pub use server::{ServerConfig, StorageConfig};

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Full application configuration. Every field has a default, so an empty
/// file or no file at all is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub events: EventsConfig,
    pub pages: ListConfig,
    pub activity: ListConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a hydrated user stays cached.
    pub user_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { user_ttl_secs: 300 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Page size bounds for a list endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl ListConfig {
    /// Applies the default to a missing or zero limit and caps it at the maximum.
    pub fn clamp(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(0) | None => self.default_limit,
            Some(n) => n.min(self.max_limit),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}

impl AppConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml(&raw)
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, list) in [("pages", &self.pages), ("activity", &self.activity)] {
            if list.default_limit == 0 || list.default_limit > list.max_limit {
                return Err(Error::Config(format!(
                    "{name}.default_limit must be between 1 and {name}.max_limit"
                )));
            }
        }
        if self.events.capacity == 0 {
            return Err(Error::Config("events.capacity must be positive".to_string()));
        }
        if self.storage.db_file.is_empty() {
            return Err(Error::Config("storage.db_file must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.db_path(), Path::new("./data").join("folio.db"));
        assert_eq!(config.activity.default_limit, 50);
        assert_eq!(config.cache.user_ttl_secs, 300);
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9000

            [activity]
            max_limit = 20
            default_limit = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.activity.max_limit, 20);
        assert_eq!(config.pages.max_limit, 100);
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let result = AppConfig::from_toml("[pages]\ndefault_limit = 500\n");
        assert!(matches!(result, Err(Error::Config(_))));

        let result = AppConfig::from_toml("[server]\nport = \"x\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_clamp() {
        let list = ListConfig::default();
        assert_eq!(list.clamp(None), 50);
        assert_eq!(list.clamp(Some(0)), 50);
        assert_eq!(list.clamp(Some(7)), 7);
        assert_eq!(list.clamp(Some(1000)), 100);
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("folio.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"/srv/folio\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.storage.data_dir, Path::new("/srv/folio"));
        assert!(AppConfig::load(None).is_ok());
    }
}
