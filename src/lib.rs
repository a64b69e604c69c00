//! # schemagraph
//!
//! Database catalog introspection into a cross-referenced schema graph.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schemagraph::prelude::*;
//!
//! # fn main() -> schemagraph::Result<()> {
//! let mut conn = rusqlite::Connection::open_in_memory().map_err(DriverError::from)?;
//! Connection::execute(&mut conn, "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")?;
//!
//! let registry = AdapterRegistry::builtin();
//! let graph = load_schema(&registry, Dialect::SQLite, &mut conn, &LoaderOptions::default())?;
//!
//! let user = graph.relation("users").unwrap();
//! assert_eq!(user.name, "User");
//! assert_eq!(user.primary_key_field().unwrap().name, "ID");
//! # Ok(())
//! # }
//! ```
//!
//! ## Engine Support
//!
//! | Engine      | Catalog source                 | Driver feature   |
//! |-------------|--------------------------------|------------------|
//! | SQLite      | `pragma_*` table functions     | `rusqlite`       |
//! | PostgreSQL  | `pg_catalog`                   | `postgres-sync`  |
//! | CockroachDB | `pg_catalog`                   | `postgres-sync`  |
//! | MySQL       | `information_schema`           | bring your own   |
//! | Oracle      | `all_*` views                  | bring your own   |
//!
//! Engines without a bundled driver are reached by implementing
//! [`Connection`] for the driver's handle.

// =============================================================================
// Root-level exports
// =============================================================================

pub use schemagraph_introspect::*;

/// Database engine enum
pub use schemagraph_types::Dialect;

/// Presentation and naming modes
pub use schemagraph_types::{ForeignKeyMode, TypeMode};

/// Raw catalog rows as returned by the backend adapters.
pub use schemagraph_types::catalog;

/// Shared vocabulary crate.
pub use schemagraph_types as types;

/// Prelude module for commonly used types
pub mod prelude {
    pub use schemagraph_introspect::{
        Adapter, AdapterRegistry, Config, Connection, DriverError, Error, GraphBuilder,
        LoaderOptions, QuerySpec, Result, SchemaGraph, introspect_query, load_schema,
    };
    pub use schemagraph_types::{Dialect, ForeignKeyMode, RelKind, TypeMode};
}
