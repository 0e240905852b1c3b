use std::fs;
use std::path::PathBuf;

use anyhow::bail;

use super::open_workspace;
use crate::config::StorageConfig;
use crate::store::{SqliteStore, Store};
use crate::types::SpaceRole;

pub fn run_init(data_dir: String) -> anyhow::Result<()> {
    let storage = StorageConfig {
        data_dir: PathBuf::from(data_dir),
        ..Default::default()
    };
    let db_path = storage.db_path();

    if db_path.exists() {
        bail!("Server already initialized. Database exists at: {}", db_path.display());
    }

    fs::create_dir_all(&storage.data_dir)?;
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!("Initialized database at {}", db_path.display());
    Ok(())
}

pub fn run_user_create(data_dir: String, email: String, name: String) -> anyhow::Result<()> {
    let workspace = open_workspace(&data_dir)?;
    let user = workspace.create_user(&email, &name)?;

    println!("Created user {} <{}> with id {}", user.name, user.email, user.id);
    Ok(())
}

pub fn run_org_create(
    data_dir: String,
    name: String,
    slug: String,
    owner_email: String,
) -> anyhow::Result<()> {
    let workspace = open_workspace(&data_dir)?;
    let Some(owner) = workspace.get_user_by_email(&owner_email)? else {
        bail!("No user with email '{owner_email}'");
    };

    let org = workspace.create_organization(owner.id, &name, &slug)?;
    println!("Created organization \"{}\" with id {}", org.slug, org.id);
    Ok(())
}

pub fn run_space_create(
    data_dir: String,
    org_id: i64,
    name: String,
    slug: String,
    owner_email: String,
) -> anyhow::Result<()> {
    let workspace = open_workspace(&data_dir)?;
    let Some(owner) = workspace.get_user_by_email(&owner_email)? else {
        bail!("No user with email '{owner_email}'");
    };

    let space = workspace.create_space(owner.id, org_id, &name, &slug)?;
    println!("Created space \"{}\" with id {}", space.slug, space.id);
    Ok(())
}

pub fn run_space_add_member(
    data_dir: String,
    space_id: i64,
    email: String,
    role: SpaceRole,
) -> anyhow::Result<()> {
    let workspace = open_workspace(&data_dir)?;
    let Some(user) = workspace.get_user_by_email(&email)? else {
        bail!("No user with email '{email}'");
    };

    let member = workspace.add_space_member(space_id, user.id, role)?;
    println!("User {} is now {} of space {}", user.email, member.role, space_id);
    Ok(())
}
