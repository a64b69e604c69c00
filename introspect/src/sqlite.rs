//! SQLite catalog adapter
//!
//! Everything is read through the pragma table-valued functions
//! (`pragma_table_info`, `pragma_index_list`, ...), so the adapter needs
//! nothing beyond plain `SELECT` support from the connection. SQLite has a
//! single schema per database file, reported as `main`.

use crate::adapter::{Adapter, Capabilities};
use crate::connection::{Connection, query_map, query_scalar};
use crate::error::{Error, Result};
use crate::resolve::{NativeType, Precision, ResolvedType, TypeContext, resolve_native};
use schemagraph_types::Dialect;
use schemagraph_types::catalog::{
    EscapeKind, RawColumn, RawForeignKey, RawIndex, RawIndexColumn, RawTable, RelKind,
};
use std::collections::HashSet;

const MAIN_SCHEMA: &str = "main";

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteAdapter;

impl Adapter for SqliteAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    /// Rowid primary keys never show up in `pragma_index_list`.
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            primary_key_index_synthesis: true,
            ..Capabilities::default()
        }
    }

    fn relkind(&self, kind: RelKind) -> &'static str {
        match kind {
            RelKind::Table => "table",
            RelKind::View => "view",
        }
    }

    fn nth_param(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn schema_name(&self, _conn: &mut dyn Connection) -> Result<String> {
        Ok(MAIN_SCHEMA.to_string())
    }

    fn resolve_type(&self, ctx: &TypeContext<'_>, native: &str, nullable: bool) -> ResolvedType {
        resolve_native(ctx, native, nullable, &lookup)
    }

    fn tables(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        relkind: &str,
    ) -> Result<Vec<RawTable>> {
        Ok(query_map(conn, queries::TABLES_QUERY, &[relkind], |row| {
            Ok(RawTable {
                name: row.text(0)?,
                kind: relkind.to_string(),
                comment: None,
            })
        })?)
    }

    fn sequence_tables(&self, conn: &mut dyn Connection, _schema: &str) -> Result<HashSet<String>> {
        Ok(query_map(conn, queries::SEQUENCES_QUERY, &[], |row| row.text(0))?
            .into_iter()
            .collect())
    }

    /// Tables whose single `INTEGER PRIMARY KEY` aliases the rowid.
    fn auto_increment_tables(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
    ) -> Result<HashSet<String>> {
        Ok(query_map(conn, queries::ROWID_TABLES_QUERY, &[], |row| row.text(0))?
            .into_iter()
            .collect())
    }

    fn columns(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumn>> {
        Ok(query_map(conn, queries::COLUMNS_QUERY, &[table], |row| {
            Ok(RawColumn {
                ordinal: row.int(0)?,
                name: row.text(1)?,
                data_type: row.text(2)?,
                not_null: row.boolean(3)?,
                default_value: row.opt_text(4)?,
                is_primary_key: row.boolean(5)?,
                comment: None,
            })
        })?)
    }

    fn foreign_keys(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<RawForeignKey>> {
        Ok(query_map(conn, queries::FOREIGN_KEYS_QUERY, &[table], |row| {
            Ok(RawForeignKey {
                name: String::new(),
                column: row.text(0)?,
                ref_table: row.text(1)?,
                ref_column: row.opt_text(2)?,
                on_update: row.opt_text(3)?,
                on_delete: row.opt_text(4)?,
            })
        })?)
    }

    fn indexes(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<RawIndex>> {
        Ok(query_map(conn, queries::INDEXES_QUERY, &[table], |row| {
            Ok(RawIndex {
                name: row.text(0)?,
                is_unique: row.boolean(1)?,
                is_primary: false,
                origin: row.opt_text(2)?,
            })
        })?)
    }

    fn index_columns(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        _table: &str,
        index: &str,
    ) -> Result<Vec<RawIndexColumn>> {
        Ok(query_map(conn, queries::INDEX_COLUMNS_QUERY, &[index], |row| {
            Ok(RawIndexColumn {
                seq_no: row.int(0)?,
                cid: row.int(1)?,
                name: row.text(2)?,
            })
        })?)
    }

    fn index_column_order(
        &self,
        conn: &mut dyn Connection,
        _schema: &str,
        table: &str,
        index: &str,
    ) -> Result<String> {
        query_scalar(conn, queries::INDEX_ORDER_QUERY, &[index])?.ok_or_else(|| Error::IndexOrder {
            relation: table.to_string(),
            index: index.to_string(),
        })
    }

    /// SQLite rejects a parenthesized select after `AS`.
    fn create_view_sql(&self, name: &str, statement: &str) -> String {
        format!(
            "CREATE VIEW {} AS {statement}",
            self.escape(EscapeKind::Table, name)
        )
    }

    fn view_schema(&self, _conn: &mut dyn Connection, _view: &str) -> Result<String> {
        Ok(MAIN_SCHEMA.to_string())
    }
}

/// Declared types are free-form in SQLite; a handful of well-known names are
/// matched exactly, the rest follow the column affinity rules.
fn lookup(dt: &str, _: Precision, _: &TypeContext<'_>) -> Option<NativeType> {
    let ty = match dt {
        "bool" | "boolean" => NativeType::plain("bool", "false"),
        "date" => NativeType::plain("chrono::NaiveDate", "chrono::NaiveDate::default()"),
        "datetime" | "timestamp" => NativeType::plain(
            "chrono::NaiveDateTime",
            "chrono::NaiveDateTime::default()",
        ),
        "time" => NativeType::plain("chrono::NaiveTime", "chrono::NaiveTime::default()"),
        "uuid" => NativeType::plain("uuid::Uuid", "uuid::Uuid::nil()")
            .internal("[u8; 16]", "[0u8; 16]"),
        "json" | "jsonb" => NativeType::plain("serde_json::Value", "serde_json::Value::Null"),
        "" => NativeType::plain("Vec<u8>", "Vec::new()"),
        dt if dt.contains("int") => NativeType::plain("i64", "0"),
        dt if ["char", "clob", "text"].iter().any(|a| dt.contains(a)) => {
            NativeType::plain("String", "String::new()")
        }
        dt if dt.contains("blob") => NativeType::plain("Vec<u8>", "Vec::new()"),
        dt if ["real", "floa", "doub"].iter().any(|a| dt.contains(a)) => {
            NativeType::plain("f64", "0.0")
        }
        "numeric" | "decimal" => NativeType::plain("f64", "0.0"),
        _ => return None,
    };
    Some(ty)
}

pub mod queries {
    pub const TABLES_QUERY: &str = r#"
        SELECT name
        FROM sqlite_master
        WHERE type = ?1 AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
        ORDER BY name
    "#;

    pub const SEQUENCES_QUERY: &str = r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table' AND upper(sql) LIKE '%AUTOINCREMENT%'
    "#;

    pub const ROWID_TABLES_QUERY: &str = r#"
        SELECT m.name
        FROM sqlite_master m, pragma_table_info(m.name) p
        WHERE m.type = 'table'
            AND m.name NOT LIKE 'sqlite\_%' ESCAPE '\'
            AND upper(m.sql) NOT LIKE '%WITHOUT ROWID%'
        GROUP BY m.name
        HAVING sum(p.pk > 0) = 1 AND max(p.pk = 1 AND upper(p.type) = 'INTEGER') = 1
    "#;

    // rowid aliases report notnull = 0 even though they can never be NULL
    pub const COLUMNS_QUERY: &str = r#"
        SELECT cid + 1, name, type, "notnull" OR pk > 0, dflt_value, pk > 0
        FROM pragma_table_info(?1)
        ORDER BY cid
    "#;

    pub const FOREIGN_KEYS_QUERY: &str = r#"
        SELECT "from", "table", "to", on_update, on_delete
        FROM pragma_foreign_key_list(?1)
        ORDER BY id, seq
    "#;

    pub const INDEXES_QUERY: &str = r#"
        SELECT name, "unique", origin
        FROM pragma_index_list(?1)
        ORDER BY name
    "#;

    pub const INDEX_COLUMNS_QUERY: &str = r#"
        SELECT seqno, cid, name
        FROM pragma_index_info(?1)
    "#;

    pub const INDEX_ORDER_QUERY: &str = r#"
        SELECT group_concat(cid, ' ')
        FROM (SELECT cid FROM pragma_index_info(?1) ORDER BY seqno)
    "#;
}
