//! Backend adapter contract and registry
//!
//! One adapter per engine. Adapters supply the engine vocabulary (relation
//! kinds, placeholders, quoting, native types) and the raw catalog queries;
//! everything engine-neutral lives in the graph builder.

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::query::introspect_with_view;
use crate::resolve::{ResolvedType, TypeContext};
use schemagraph_types::Dialect;
use schemagraph_types::catalog::{
    EscapeKind, RawColumn, RawEnum, RawEnumValue, RawForeignKey, RawIndex, RawIndexColumn,
    RawProc, RawProcParam, RawTable, RelKind,
};
use std::collections::{BTreeMap, HashSet};

/// Optional behaviour an adapter opts into.
///
/// The graph builder checks these flags before calling the matching methods;
/// a disabled capability skips its phase instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// [`Adapter::enums`] and [`Adapter::enum_values`] are implemented.
    pub enums: bool,
    /// [`Adapter::procedures`] and [`Adapter::procedure_params`] are implemented.
    pub procedures: bool,
    /// [`Adapter::correct_foreign_keys`] must run before foreign keys are resolved.
    pub foreign_key_correction: bool,
    /// A primary key index is synthesized when the catalog reports none.
    pub primary_key_index_synthesis: bool,
}

pub trait Adapter {
    fn dialect(&self) -> Dialect;

    fn capabilities(&self) -> Capabilities;

    /// Native encoding of a relation kind, as accepted by [`tables`](Self::tables).
    fn relkind(&self, kind: RelKind) -> &'static str;

    /// Placeholder for the 0-based parameter `index`.
    fn nth_param(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn escape(&self, _kind: EscapeKind, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Discover the active schema when none was configured.
    fn schema_name(&self, conn: &mut dyn Connection) -> Result<String>;

    fn resolve_type(&self, ctx: &TypeContext<'_>, native: &str, nullable: bool) -> ResolvedType;

    fn enums(&self, _conn: &mut dyn Connection, _schema: &str) -> Result<Vec<RawEnum>> {
        Err(self.unsupported("enums"))
    }

    fn enum_values(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        _enum_name: &str,
    ) -> Result<Vec<RawEnumValue>> {
        Err(self.unsupported("enums"))
    }

    fn procedures(&self, _conn: &mut dyn Connection, _schema: &str) -> Result<Vec<RawProc>> {
        Err(self.unsupported("procedures"))
    }

    fn procedure_params(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        _proc_name: &str,
    ) -> Result<Vec<RawProcParam>> {
        Err(self.unsupported("procedures"))
    }

    /// Relations of the native kind `relkind`.
    fn tables(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        relkind: &str,
    ) -> Result<Vec<RawTable>>;

    /// Tables whose primary key is backed by a sequence.
    fn sequence_tables(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
    ) -> Result<HashSet<String>> {
        Ok(HashSet::new())
    }

    /// Tables whose primary key is backed by an engine auto-increment.
    fn auto_increment_tables(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
    ) -> Result<HashSet<String>> {
        Ok(HashSet::new())
    }

    fn columns(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumn>>;

    fn foreign_keys(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawForeignKey>>;

    /// Drop spurious rows before resolution; only called when
    /// [`Capabilities::foreign_key_correction`] is set.
    fn correct_foreign_keys(&self, fks: Vec<RawForeignKey>) -> Vec<RawForeignKey> {
        fks
    }

    fn indexes(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawIndex>>;

    /// Unordered column list of an index.
    fn index_columns(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<Vec<RawIndexColumn>>;

    /// Space-separated column ids of an index, in index order (`"2 1"`).
    fn index_column_order(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<String>;

    fn create_view_sql(&self, name: &str, statement: &str) -> String {
        format!(
            "CREATE VIEW {} AS ({statement})",
            self.escape(EscapeKind::Table, name)
        )
    }

    fn drop_view_sql(&self, name: &str) -> String {
        format!("DROP VIEW {}", self.escape(EscapeKind::Table, name))
    }

    /// Schema a freshly created view landed in.
    fn view_schema(&self, conn: &mut dyn Connection, _view: &str) -> Result<String> {
        self.schema_name(conn)
    }

    /// Column shape of an arbitrary statement.
    fn query_columns(&self, conn: &mut dyn Connection, statement: &str) -> Result<Vec<RawColumn>> {
        introspect_with_view(self, conn, statement)
    }

    /// Move engine-specific annotations out of query lines into their
    /// comment slots (`comments[i + 1]` belongs to `lines[i]`).
    fn strip_query(&self, _lines: &mut [String], _comments: &mut [String]) -> Result<()> {
        Ok(())
    }

    fn unsupported(&self, capability: &'static str) -> Error {
        Error::Unsupported {
            dialect: self.dialect(),
            capability,
        }
    }
}

/// Explicit engine → adapter registry.
///
/// Built once at startup and passed by reference; tests register doubles.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<Dialect, Box<dyn Adapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::postgres::PostgresAdapter::default()));
        registry.register(Box::new(crate::postgres::CockroachAdapter::default()));
        registry.register(Box::new(crate::sqlite::SqliteAdapter));
        registry.register(Box::new(crate::mysql::MySqlAdapter));
        registry.register(Box::new(crate::oracle::OracleAdapter));
        registry
    }

    /// Register `adapter` for its dialect, returning the one it replaces.
    pub fn register(&mut self, adapter: Box<dyn Adapter>) -> Option<Box<dyn Adapter>> {
        self.adapters.insert(adapter.dialect(), adapter)
    }

    pub fn get(&self, dialect: Dialect) -> Result<&dyn Adapter> {
        self.adapters
            .get(&dialect)
            .map(|adapter| adapter.as_ref())
            .ok_or(Error::NoAdapter(dialect))
    }

    /// Look up by engine name or alias (`pg`, `crdb`, `sqlite3`, ...).
    pub fn get_by_name(&self, name: &str) -> Result<&dyn Adapter> {
        let dialect = Dialect::parse(name).ok_or_else(|| Error::UnknownEngine(name.to_string()))?;
        self.get(dialect)
    }

    pub fn dialects(&self) -> impl Iterator<Item = Dialect> + '_ {
        self.adapters.keys().copied()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.adapters.keys()).finish()
    }
}
