//! Test doubles: an adapter serving a fixed catalog and a connection that
//! records the DDL it is asked to run.

#![allow(dead_code)]

use schemagraph_introspect::{
    Adapter, Capabilities, CockroachAdapter, Connection, DriverError, PostgresAdapter,
    ResolvedType, Result, Row, TypeContext,
};
use schemagraph_types::Dialect;
use schemagraph_types::catalog::{
    RawColumn, RawEnum, RawEnumValue, RawForeignKey, RawIndex, RawIndexColumn, RawProc,
    RawProcParam, RawTable, RelKind,
};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Connection
// ============================================================================

/// Returns no rows and remembers every executed statement.
#[derive(Debug, Default)]
pub struct Recorder {
    pub executed: Vec<String>,
    /// Refuse `DROP` statements.
    pub fail_drop: bool,
}

impl Connection for Recorder {
    fn query(&mut self, _sql: &str, _params: &[&str]) -> Result<Vec<Row>, DriverError> {
        Ok(Vec::new())
    }

    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.executed.push(sql.to_string());
        if self.fail_drop && sql.starts_with("DROP") {
            return Err(DriverError::Message("drop refused".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Adapter
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FixtureIndex {
    pub raw: RawIndex,
    pub columns: Vec<RawIndexColumn>,
    pub order: String,
}

/// An adapter answering from in-memory catalog rows.
///
/// Types resolve through the PostgreSQL vocabulary; the foreign-key
/// correction pass is CockroachDB's.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub dialect: Dialect,
    pub capabilities: Capabilities,
    pub tables: Vec<RawTable>,
    pub views: Vec<RawTable>,
    pub columns: HashMap<String, Vec<RawColumn>>,
    pub foreign_keys: HashMap<String, Vec<RawForeignKey>>,
    pub indexes: HashMap<String, Vec<FixtureIndex>>,
    pub sequences: HashSet<String>,
    pub fail_sequence_probe: bool,
    pub enums: Vec<(RawEnum, Vec<RawEnumValue>)>,
    pub procs: Vec<(RawProc, Vec<RawProcParam>)>,
    /// Columns reported for throwaway query views.
    pub query_columns: Vec<RawColumn>,
    /// Relation whose column query fails.
    pub fail_columns: Option<String>,
}

const QUERY_VIEW_PREFIX: &str = "_sg_";

impl Fixture {
    pub fn table(mut self, name: &str, columns: &[(&str, &str, bool, bool)]) -> Self {
        self.tables.push(raw_table(name, "r"));
        self.columns.insert(name.to_string(), raw_columns(columns));
        self
    }

    pub fn view(mut self, name: &str, columns: &[(&str, &str, bool, bool)]) -> Self {
        self.views.push(raw_table(name, "v"));
        self.columns.insert(name.to_string(), raw_columns(columns));
        self
    }

    pub fn foreign_key(
        mut self,
        table: &str,
        name: &str,
        column: &str,
        ref_table: &str,
        ref_column: Option<&str>,
    ) -> Self {
        self.foreign_keys
            .entry(table.to_string())
            .or_default()
            .push(RawForeignKey {
                name: name.to_string(),
                column: column.to_string(),
                ref_table: ref_table.to_string(),
                ref_column: ref_column.map(str::to_string),
                ..RawForeignKey::default()
            });
        self
    }

    /// `columns` are `(cid, name)` in catalog listing order.
    pub fn index(
        mut self,
        table: &str,
        raw: RawIndex,
        columns: &[(i64, &str)],
        order: &str,
    ) -> Self {
        let columns = columns
            .iter()
            .enumerate()
            .map(|(seq, (cid, name))| RawIndexColumn {
                seq_no: seq as i64,
                cid: *cid,
                name: name.to_string(),
            })
            .collect();
        self.indexes
            .entry(table.to_string())
            .or_default()
            .push(FixtureIndex {
                raw,
                columns,
                order: order.to_string(),
            });
        self
    }

    fn find_index(&self, table: &str, index: &str) -> Option<&FixtureIndex> {
        self.indexes
            .get(table)?
            .iter()
            .find(|ix| ix.raw.name == index)
    }
}

pub fn raw_table(name: &str, kind: &str) -> RawTable {
    RawTable {
        name: name.to_string(),
        kind: kind.to_string(),
        comment: None,
    }
}

/// `(name, data_type, not_null, primary_key)`
pub fn raw_columns(columns: &[(&str, &str, bool, bool)]) -> Vec<RawColumn> {
    columns
        .iter()
        .enumerate()
        .map(|(i, (name, data_type, not_null, pk))| RawColumn {
            ordinal: i as i64 + 1,
            name: name.to_string(),
            data_type: data_type.to_string(),
            not_null: *not_null,
            is_primary_key: *pk,
            ..RawColumn::default()
        })
        .collect()
}

pub fn unique(name: &str) -> RawIndex {
    RawIndex {
        name: name.to_string(),
        is_unique: true,
        ..RawIndex::default()
    }
}

pub fn plain(name: &str) -> RawIndex {
    RawIndex {
        name: name.to_string(),
        ..RawIndex::default()
    }
}

pub fn primary(name: &str) -> RawIndex {
    RawIndex {
        name: name.to_string(),
        is_unique: true,
        is_primary: true,
        origin: Some("pk".to_string()),
    }
}

impl Adapter for Fixture {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn relkind(&self, kind: RelKind) -> &'static str {
        match kind {
            RelKind::Table => "r",
            RelKind::View => "v",
        }
    }

    fn schema_name(&self, _conn: &mut dyn Connection) -> Result<String> {
        Ok("public".to_string())
    }

    fn resolve_type(&self, ctx: &TypeContext<'_>, native: &str, nullable: bool) -> ResolvedType {
        PostgresAdapter.resolve_type(ctx, native, nullable)
    }

    fn enums(&self, _conn: &mut dyn Connection, _schema: &str) -> Result<Vec<RawEnum>> {
        Ok(self.enums.iter().map(|(e, _)| e.clone()).collect())
    }

    fn enum_values(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        enum_name: &str,
    ) -> Result<Vec<RawEnumValue>> {
        Ok(self
            .enums
            .iter()
            .find(|(e, _)| e.name == enum_name)
            .map(|(_, values)| values.clone())
            .unwrap_or_default())
    }

    fn procedures(&self, _conn: &mut dyn Connection, _schema: &str) -> Result<Vec<RawProc>> {
        Ok(self.procs.iter().map(|(p, _)| p.clone()).collect())
    }

    fn procedure_params(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        proc_name: &str,
    ) -> Result<Vec<RawProcParam>> {
        Ok(self
            .procs
            .iter()
            .find(|(p, _)| p.name == proc_name)
            .map(|(_, params)| params.clone())
            .unwrap_or_default())
    }

    fn tables(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        relkind: &str,
    ) -> Result<Vec<RawTable>> {
        Ok(match relkind {
            "r" => self.tables.clone(),
            "v" => self.views.clone(),
            _ => Vec::new(),
        })
    }

    fn sequence_tables(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
    ) -> Result<HashSet<String>> {
        if self.fail_sequence_probe {
            return Err(DriverError::Message("pg_depend is not readable".into()).into());
        }
        Ok(self.sequences.clone())
    }

    fn columns(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumn>> {
        let fails = |name: &str| table.starts_with(name);
        if self.fail_columns.as_deref().is_some_and(fails) {
            return Err(DriverError::Message(format!("cannot read columns of {table}")).into());
        }
        if table.starts_with(QUERY_VIEW_PREFIX) {
            return Ok(self.query_columns.clone());
        }
        Ok(self.columns.get(table).cloned().unwrap_or_default())
    }

    fn foreign_keys(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<RawForeignKey>> {
        Ok(self.foreign_keys.get(table).cloned().unwrap_or_default())
    }

    fn correct_foreign_keys(&self, fks: Vec<RawForeignKey>) -> Vec<RawForeignKey> {
        CockroachAdapter::default().correct_foreign_keys(fks)
    }

    fn indexes(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<RawIndex>> {
        Ok(self
            .indexes
            .get(table)
            .map(|ixs| ixs.iter().map(|ix| ix.raw.clone()).collect())
            .unwrap_or_default())
    }

    fn index_columns(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
        index: &str,
    ) -> Result<Vec<RawIndexColumn>> {
        Ok(self
            .find_index(table, index)
            .map(|ix| ix.columns.clone())
            .unwrap_or_default())
    }

    fn index_column_order(
        &self,
        _conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
        index: &str,
    ) -> Result<String> {
        Ok(self
            .find_index(table, index)
            .map(|ix| ix.order.clone())
            .unwrap_or_default())
    }
}

/// users ← books → (book_tags), the catalog most tests start from.
pub fn library() -> Fixture {
    Fixture {
        dialect: Dialect::PostgreSQL,
        capabilities: Capabilities {
            primary_key_index_synthesis: true,
            ..Capabilities::default()
        },
        ..Fixture::default()
    }
    .table(
        "users",
        &[("id", "integer", true, true), ("name", "text", true, false)],
    )
    .table(
        "books",
        &[
            ("id", "integer", true, true),
            ("title", "text", true, false),
            ("author_id", "integer", true, false),
            ("isbn", "character varying(13)", false, false),
        ],
    )
    .table(
        "book_tags",
        &[
            ("book_id", "integer", true, true),
            ("tag_id", "integer", true, true),
        ],
    )
    .foreign_key("books", "", "author_id", "users", None)
    .foreign_key("book_tags", "book_tags_book_id_fkey", "book_id", "books", Some("id"))
    .index("users", primary("users_pkey"), &[(1, "id")], "1")
    .index("books", unique("books_isbn_key"), &[(4, "isbn")], "4")
    .index(
        "books",
        plain("books_author_title_idx"),
        &[(2, "title"), (3, "author_id")],
        "3 2",
    )
}
