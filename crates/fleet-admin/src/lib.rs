//! # fleet-admin
//!
//! Fleet compliance admin built on [`fleet_forms`] and [`fleet_table`].
//!
//! This crate provides:
//!
//! - A record catalog (vehicles, drivers, training, subcontractors, working
//!   time, subscriptions), each with its form, rules and table columns
//! - A JSON [`DocumentStore`] backed by SQLite
//! - A TTL [`KeyValueCache`] and cache-aside [`ProfileService`]
//! - Sidebar links switched on and off per browser through a cookie
//! - Bootstrap 5 pages and a JSON envelope for API clients
//! - The `fleet-admin` command line tool
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fleet_admin::http::Request;
//! use fleet_admin::{dispatch, AdminConfig, AppContext, SqliteDocumentStore};
//! use fleet_forms::MemoryUrlRegistry;
//! use sqlx::sqlite::SqlitePoolOptions;
//!
//! # async fn run() -> fleet_admin::Result<()> {
//! let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await?;
//! let store = SqliteDocumentStore::new(pool);
//! store.init().await?;
//!
//! let ctx = AppContext::new(
//!     AdminConfig::new(),
//!     Arc::new(store),
//!     Arc::new(MemoryUrlRegistry::new()),
//! );
//! let res = dispatch(&ctx, &Request::get("/vehicles/?q=volvo")).await;
//! assert_eq!(res.status, 200);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod import;
pub mod nav;
pub mod profile;
pub mod records;
pub mod store;
pub mod templates;
pub mod views;

pub use cache::{KeyValueCache, MemoryCache};
pub use config::AdminConfig;
pub use error::{AdminError, Result};
pub use import::{import_json, import_records, ImportRejection, ImportReport};
pub use nav::{FeatureFlags, NavItem, NAV_CATALOG};
pub use profile::{Profile, ProfileService};
pub use records::{Collection, Resource};
pub use store::{Document, DocumentStore, SqliteDocumentStore};
pub use views::{dispatch, AppContext};
