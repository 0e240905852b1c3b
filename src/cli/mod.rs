mod admin;
mod commands;

pub use admin::{
    run_init, run_org_create, run_space_add_member, run_space_create, run_user_create,
};
pub use commands::{AdminCommands, OrgCommands, SpaceCommands, UserCommands};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::MemoryCache;
use crate::config::{CacheConfig, StorageConfig};
use crate::service::WorkspaceService;
use crate::store::SqliteStore;

/// Open the store in a data directory, checking it was initialized
pub fn init_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let storage = StorageConfig {
        data_dir: PathBuf::from(data_dir),
        ..Default::default()
    };
    let db_path = storage.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'folio admin init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}

fn open_workspace(data_dir: &str) -> anyhow::Result<WorkspaceService> {
    let store = Arc::new(init_store(data_dir)?);
    Ok(WorkspaceService::new(
        store,
        Arc::new(MemoryCache::new()),
        Duration::from_secs(CacheConfig::default().user_ttl_secs),
    ))
}
