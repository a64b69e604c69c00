//! schemagraph-introspect - Catalog introspection for schemagraph
//!
//! This crate reads a live database catalog through a backend [`Adapter`] and
//! resolves it into a [`SchemaGraph`]: relations with typed fields, enums,
//! procedures, foreign keys and indexes, every cross-reference checked.
//!
//! - [`names`] - snake/camel conversion that keeps initialisms (`ID`, `HTTP`) whole
//! - [`AdapterRegistry`] - explicit engine → adapter registry
//! - [`resolve`] - native type → target type mapping under a [`TypeMode`](schemagraph_types::TypeMode)
//! - [`GraphBuilder`] - the phased build
//! - [`introspect_query`] - typed ad-hoc queries through a throwaway view
//!
//! # Example
//!
//! ```ignore
//! use schemagraph_introspect::{AdapterRegistry, Config, load_schema};
//!
//! let config = Config::load()?;
//! let options = config.loader_options()?;
//! let registry = AdapterRegistry::builtin();
//!
//! let mut conn = rusqlite::Connection::open("app.db")?;
//! let graph = load_schema(&registry, config.dialect()?, &mut conn, &options)?;
//! for relation in graph.relations().values() {
//!     println!("{} ({} fields)", relation.name, relation.fields.len());
//! }
//! ```
//!
//! # Features
//!
//! - `tracing` - emit `tracing` events for catalog queries and build phases
//! - `rusqlite` - [`Connection`] for `rusqlite::Connection`
//! - `postgres-sync` - [`Connection`] for `postgres::Client`

mod trace;

pub mod adapter;
pub mod config;
pub mod connection;
pub mod error;
mod foreign_keys;
pub mod indexes;
pub mod ir;
pub mod loader;
pub mod mysql;
pub mod names;
pub mod oracle;
pub mod postgres;
pub mod query;
pub mod resolve;
pub mod sqlite;

pub use adapter::{Adapter, AdapterRegistry, Capabilities};
pub use config::{CONFIG_FILE, Config};
pub use connection::{Connection, Row, Value};
pub use error::{DriverError, Error, ForeignKeyMiss, Result};
pub use ir::{
    Enum, EnumValue, Field, FieldRef, ForeignKey, Index, Locator, Proc, ProcParam, Relation,
    SchemaGraph,
};
pub use loader::{GraphBuilder, LoaderOptions, Phase, load_schema};
pub use names::Initialisms;
pub use query::{EphemeralView, Query, QueryParam, QuerySpec, introspect_query};
pub use resolve::{ResolvedType, TypeContext};

pub use mysql::MySqlAdapter;
pub use oracle::OracleAdapter;
pub use postgres::{CockroachAdapter, PostgresAdapter};
pub use sqlite::SqliteAdapter;
