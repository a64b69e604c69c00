//! CockroachDB adapter
//!
//! CockroachDB speaks the PostgreSQL catalog closely enough to reuse every
//! query, with two differences: `unique_rowid()` defaults stand in for
//! sequences, and the foreign-key join reports one row per column pair of a
//! composite constraint, including pairs that do not belong together.

use super::PostgresAdapter;
use crate::adapter::{Adapter, Capabilities};
use crate::connection::{Connection, query_map};
use crate::error::Result;
use crate::resolve::{ResolvedType, TypeContext};
use schemagraph_types::Dialect;
use schemagraph_types::catalog::{
    RawColumn, RawEnum, RawEnumValue, RawForeignKey, RawIndex, RawIndexColumn, RawProc,
    RawProcParam, RawTable, RelKind,
};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct CockroachAdapter {
    inner: PostgresAdapter,
}

pub mod queries {
    pub const AUTO_INCREMENT_QUERY: &str = r#"
        SELECT table_name
        FROM information_schema.columns
        WHERE table_schema = $1 AND column_default = 'unique_rowid()'
    "#;
}

impl Adapter for CockroachAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::CockroachDB
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            foreign_key_correction: true,
            ..self.inner.capabilities()
        }
    }

    fn relkind(&self, kind: RelKind) -> &'static str {
        self.inner.relkind(kind)
    }

    fn schema_name(&self, conn: &mut dyn Connection) -> Result<String> {
        self.inner.schema_name(conn)
    }

    fn resolve_type(&self, ctx: &TypeContext<'_>, native: &str, nullable: bool) -> ResolvedType {
        self.inner.resolve_type(ctx, native, nullable)
    }

    fn enums(&self, conn: &mut dyn Connection, schema: &str) -> Result<Vec<RawEnum>> {
        self.inner.enums(conn, schema)
    }

    fn enum_values(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        enum_name: &str,
    ) -> Result<Vec<RawEnumValue>> {
        self.inner.enum_values(conn, schema, enum_name)
    }

    fn procedures(&self, conn: &mut dyn Connection, schema: &str) -> Result<Vec<RawProc>> {
        self.inner.procedures(conn, schema)
    }

    fn procedure_params(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        proc_name: &str,
    ) -> Result<Vec<RawProcParam>> {
        self.inner.procedure_params(conn, schema, proc_name)
    }

    fn tables(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        relkind: &str,
    ) -> Result<Vec<RawTable>> {
        self.inner.tables(conn, schema, relkind)
    }

    fn sequence_tables(&self, conn: &mut dyn Connection, schema: &str) -> Result<HashSet<String>> {
        self.inner.sequence_tables(conn, schema)
    }

    fn auto_increment_tables(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
    ) -> Result<HashSet<String>> {
        Ok(
            query_map(conn, queries::AUTO_INCREMENT_QUERY, &[schema], |row| row.text(0))?
                .into_iter()
                .collect(),
        )
    }

    fn columns(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumn>> {
        self.inner.columns(conn, schema, table)
    }

    fn foreign_keys(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawForeignKey>> {
        self.inner.foreign_keys(conn, schema, table)
    }

    /// Keep only rows whose constraint name mentions the owning column.
    fn correct_foreign_keys(&self, fks: Vec<RawForeignKey>) -> Vec<RawForeignKey> {
        fks.into_iter()
            .filter(|fk| fk.name.contains(&fk.column))
            .collect()
    }

    fn indexes(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawIndex>> {
        self.inner.indexes(conn, schema, table)
    }

    fn index_columns(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<Vec<RawIndexColumn>> {
        self.inner.index_columns(conn, schema, table, index)
    }

    fn index_column_order(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<String> {
        self.inner.index_column_order(conn, schema, table, index)
    }

    fn view_schema(&self, conn: &mut dyn Connection, view: &str) -> Result<String> {
        self.inner.view_schema(conn, view)
    }

    fn query_columns(&self, conn: &mut dyn Connection, statement: &str) -> Result<Vec<RawColumn>> {
        self.inner.query_columns(conn, statement)
    }

    fn strip_query(&self, lines: &mut [String], comments: &mut [String]) -> Result<()> {
        self.inner.strip_query(lines, comments)
    }
}
