//! MySQL / MariaDB catalog adapter
//!
//! Reads `information_schema`. MySQL has no named enum types: every
//! `enum(...)` column is reported as an enum named after the column, and the
//! column's type descriptor is replaced by the schema-qualified column name
//! (`shop.status`). The qualified name never matches a builtin, so a column
//! called `date` still resolves to its generated enum.

use crate::adapter::{Adapter, Capabilities};
use crate::connection::{Connection, query_map, query_scalar};
use crate::error::{Error, Result, qualified};
use crate::resolve::{NativeType, Precision, ResolvedType, TypeContext, resolve_native};
use schemagraph_types::Dialect;
use schemagraph_types::catalog::{
    EscapeKind, RawColumn, RawEnum, RawEnumValue, RawForeignKey, RawIndex, RawIndexColumn,
    RawProc, RawProcParam, RawTable, RelKind,
};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlAdapter;

impl Adapter for MySqlAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            enums: true,
            procedures: true,
            foreign_key_correction: false,
            primary_key_index_synthesis: true,
        }
    }

    fn relkind(&self, kind: RelKind) -> &'static str {
        match kind {
            RelKind::Table => "BASE TABLE",
            RelKind::View => "VIEW",
        }
    }

    fn nth_param(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn escape(&self, _kind: EscapeKind, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn schema_name(&self, conn: &mut dyn Connection) -> Result<String> {
        Ok(query_scalar(conn, queries::SCHEMA_QUERY, &[])?.unwrap_or_default())
    }

    fn resolve_type(&self, ctx: &TypeContext<'_>, native: &str, nullable: bool) -> ResolvedType {
        resolve_native(ctx, native, nullable, &lookup)
    }

    fn enums(&self, conn: &mut dyn Connection, schema: &str) -> Result<Vec<RawEnum>> {
        Ok(query_map(conn, queries::ENUMS_QUERY, &[schema], |row| {
            Ok(RawEnum { name: row.text(0)? })
        })?)
    }

    fn enum_values(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        enum_name: &str,
    ) -> Result<Vec<RawEnumValue>> {
        let column_type = query_scalar(conn, queries::ENUM_VALUES_QUERY, &[schema, enum_name])?
            .unwrap_or_default();
        Ok(parse_enum_values(&column_type)
            .into_iter()
            .zip(1..)
            .map(|(value, const_value)| RawEnumValue { value, const_value })
            .collect())
    }

    fn procedures(&self, conn: &mut dyn Connection, schema: &str) -> Result<Vec<RawProc>> {
        Ok(query_map(conn, queries::PROCS_QUERY, &[schema], |row| {
            Ok(RawProc {
                name: row.text(0)?,
                return_type: row.text(1)?,
            })
        })?)
    }

    fn procedure_params(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        proc_name: &str,
    ) -> Result<Vec<RawProcParam>> {
        Ok(query_map(
            conn,
            queries::PROC_PARAMS_QUERY,
            &[schema, proc_name],
            |row| {
                Ok(RawProcParam {
                    param_type: row.text(0)?,
                })
            },
        )?)
    }

    fn tables(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        relkind: &str,
    ) -> Result<Vec<RawTable>> {
        Ok(query_map(conn, queries::TABLES_QUERY, &[schema, relkind], |row| {
            Ok(RawTable {
                name: row.text(0)?,
                kind: relkind.to_string(),
                comment: row.opt_text(1)?.filter(|c| !c.is_empty()),
            })
        })?)
    }

    fn auto_increment_tables(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
    ) -> Result<HashSet<String>> {
        Ok(query_map(conn, queries::AUTO_INCREMENT_QUERY, &[schema], |row| row.text(0))?
            .into_iter()
            .collect())
    }

    fn columns(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumn>> {
        Ok(query_map(conn, queries::COLUMNS_QUERY, &[schema, table], |row| {
            Ok(RawColumn {
                ordinal: row.int(0)?,
                name: row.text(1)?,
                data_type: row.text(2)?,
                not_null: row.boolean(3)?,
                default_value: row.opt_text(4)?,
                is_primary_key: row.boolean(5)?,
                comment: row.opt_text(6)?.filter(|c| !c.is_empty()),
            })
        })?)
    }

    fn foreign_keys(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawForeignKey>> {
        Ok(query_map(conn, queries::FOREIGN_KEYS_QUERY, &[schema, table], |row| {
            Ok(RawForeignKey {
                name: row.text(0)?,
                column: row.text(1)?,
                ref_table: row.text(2)?,
                ref_column: row.opt_text(3)?,
                on_update: row.opt_text(4)?,
                on_delete: row.opt_text(5)?,
            })
        })?)
    }

    /// The `PRIMARY` index is left out; the builder synthesizes it.
    fn indexes(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawIndex>> {
        Ok(query_map(conn, queries::INDEXES_QUERY, &[schema, table], |row| {
            Ok(RawIndex {
                name: row.text(0)?,
                is_unique: row.boolean(1)?,
                is_primary: false,
                origin: None,
            })
        })?)
    }

    fn index_columns(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<Vec<RawIndexColumn>> {
        Ok(query_map(
            conn,
            queries::INDEX_COLUMNS_QUERY,
            &[schema, table, index],
            |row| {
                Ok(RawIndexColumn {
                    seq_no: row.int(0)?,
                    cid: row.int(1)?,
                    name: row.text(2)?,
                })
            },
        )?)
    }

    fn index_column_order(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<String> {
        query_scalar(conn, queries::INDEX_ORDER_QUERY, &[schema, table, index])?.ok_or_else(|| {
            Error::IndexOrder {
                relation: qualified(schema, table),
                index: index.to_string(),
            }
        })
    }
}

/// Labels of an `enum('a','b')` column type, with `''` unescaped.
pub fn parse_enum_values(column_type: &str) -> Vec<String> {
    let inner = column_type
        .trim()
        .strip_prefix("enum(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(column_type);

    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    let mut quoted = false;
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('\'', false) => quoted = true,
            ('\'', true) if chars.peek() == Some(&'\'') => {
                chars.next();
                current.push('\'');
            }
            ('\'', true) => {
                quoted = false;
                values.push(std::mem::take(&mut current));
            }
            (c, true) => current.push(c),
            _ => {}
        }
    }
    values
}

fn lookup(dt: &str, p: Precision, ctx: &TypeContext<'_>) -> Option<NativeType> {
    let dt = dt.trim_end_matches(" zerofill");
    let (base, unsigned) = match dt.strip_suffix(" unsigned") {
        Some(base) => (base, true),
        None => (dt, false),
    };

    let ty = match (base, unsigned) {
        ("bit" | "tinyint", _) if p.precision == Some(1) => NativeType::plain("bool", "false"),
        ("bool" | "boolean", _) => NativeType::plain("bool", "false"),
        ("bit", _) => NativeType::plain("u64", "0"),
        ("tinyint", false) => NativeType::plain("i8", "0"),
        ("tinyint", true) => NativeType::plain("u8", "0"),
        ("smallint" | "year", false) => NativeType::plain("i16", "0"),
        ("smallint" | "year", true) => NativeType::plain("u16", "0"),
        ("mediumint" | "int" | "integer", false) => NativeType::plain(ctx.int32_type, "0"),
        ("mediumint" | "int" | "integer", true) => NativeType::plain(ctx.uint32_type, "0"),
        ("bigint", false) => NativeType::plain("i64", "0"),
        ("bigint", true) => NativeType::plain("u64", "0"),

        ("float", _) => NativeType::plain("f32", "0.0"),
        ("double" | "real" | "decimal" | "dec" | "numeric" | "fixed", _) => {
            NativeType::plain("f64", "0.0")
        }

        (
            "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "set"
            | "enum",
            _,
        ) => NativeType::plain("String", "String::new()"),
        (
            "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob",
            _,
        ) => NativeType::plain("Vec<u8>", "Vec::new()"),

        ("date", _) => NativeType::plain("chrono::NaiveDate", "chrono::NaiveDate::default()"),
        ("datetime" | "timestamp", _) => NativeType::plain(
            "chrono::NaiveDateTime",
            "chrono::NaiveDateTime::default()",
        ),
        ("time", _) => NativeType::plain("chrono::NaiveTime", "chrono::NaiveTime::default()"),
        ("json", _) => NativeType::plain("serde_json::Value", "serde_json::Value::Null"),

        _ => return None,
    };
    Some(ty)
}

pub mod queries {
    pub const SCHEMA_QUERY: &str = "SELECT DATABASE()";

    pub const ENUMS_QUERY: &str = r#"
        SELECT DISTINCT column_name
        FROM information_schema.columns
        WHERE data_type = 'enum' AND table_schema = ?
        ORDER BY column_name
    "#;

    pub const ENUM_VALUES_QUERY: &str = r#"
        SELECT column_type
        FROM information_schema.columns
        WHERE data_type = 'enum' AND table_schema = ? AND column_name = ?
        LIMIT 1
    "#;

    pub const PROCS_QUERY: &str = r#"
        SELECT r.routine_name, p.dtd_identifier
        FROM information_schema.routines r
        JOIN information_schema.parameters p
            ON p.specific_schema = r.routine_schema
            AND p.specific_name = r.routine_name
            AND p.ordinal_position = 0
        WHERE r.routine_schema = ?
        ORDER BY r.routine_name
    "#;

    pub const PROC_PARAMS_QUERY: &str = r#"
        SELECT dtd_identifier
        FROM information_schema.parameters
        WHERE ordinal_position > 0 AND specific_schema = ? AND specific_name = ?
        ORDER BY ordinal_position
    "#;

    pub const TABLES_QUERY: &str = r#"
        SELECT table_name, table_comment
        FROM information_schema.tables
        WHERE table_schema = ? AND table_type = ?
        ORDER BY table_name
    "#;

    pub const AUTO_INCREMENT_QUERY: &str = r#"
        SELECT table_name
        FROM information_schema.tables
        WHERE auto_increment IS NOT NULL AND table_schema = ?
    "#;

    pub const COLUMNS_QUERY: &str = r#"
        SELECT
            ordinal_position,
            column_name,
            IF(data_type = 'enum', CONCAT(table_schema, '.', column_name), column_type),
            is_nullable = 'NO',
            column_default,
            column_key = 'PRI',
            column_comment
        FROM information_schema.columns
        WHERE table_schema = ? AND table_name = ?
        ORDER BY ordinal_position
    "#;

    pub const FOREIGN_KEYS_QUERY: &str = r#"
        SELECT
            k.constraint_name,
            k.column_name,
            k.referenced_table_name,
            k.referenced_column_name,
            r.update_rule,
            r.delete_rule
        FROM information_schema.key_column_usage k
        JOIN information_schema.referential_constraints r
            ON r.constraint_schema = k.table_schema
            AND r.table_name = k.table_name
            AND r.constraint_name = k.constraint_name
        WHERE k.referenced_table_name IS NOT NULL
            AND k.table_schema = ?
            AND k.table_name = ?
        ORDER BY k.constraint_name, k.ordinal_position
    "#;

    pub const INDEXES_QUERY: &str = r#"
        SELECT DISTINCT index_name, NOT non_unique
        FROM information_schema.statistics
        WHERE index_name <> 'PRIMARY' AND index_schema = ? AND table_name = ?
        ORDER BY index_name
    "#;

    pub const INDEX_COLUMNS_QUERY: &str = r#"
        SELECT s.seq_in_index, c.ordinal_position, s.column_name
        FROM information_schema.statistics s
        JOIN information_schema.columns c
            ON c.table_schema = s.index_schema
            AND c.table_name = s.table_name
            AND c.column_name = s.column_name
        WHERE s.index_schema = ? AND s.table_name = ? AND s.index_name = ?
    "#;

    pub const INDEX_ORDER_QUERY: &str = r#"
        SELECT GROUP_CONCAT(c.ordinal_position ORDER BY s.seq_in_index SEPARATOR ' ')
        FROM information_schema.statistics s
        JOIN information_schema.columns c
            ON c.table_schema = s.index_schema
            AND c.table_name = s.table_name
            AND c.column_name = s.column_name
        WHERE s.index_schema = ? AND s.table_name = ? AND s.index_name = ?
    "#;
}
