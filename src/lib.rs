//! # Folio
//!
//! A multi-tenant workspace backend: organizations own spaces, spaces hold a
//! tree of pages, and page access is resolved through explicit grants and
//! inherited sharing. Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! folio = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use folio::cache::MemoryCache;
//! use folio::config::AppConfig;
//! use folio::events::BroadcastPublisher;
//! use folio::server::{AppState, create_router};
//! use folio::store::{SqliteStore, Store};
//!
//! let config = AppConfig::default();
//! let store = SqliteStore::new(config.storage.db_path())?;
//! store.initialize()?;
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     Arc::new(BroadcastPublisher::new(config.events.capacity)),
//!     Arc::new(MemoryCache::new()),
//!     &config,
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the admin CLI module. Disable with `default-features = false`.

pub mod access;
pub mod activity;
pub mod auth;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;
