//! PostgreSQL catalog adapter
//!
//! Reads `pg_catalog` directly rather than `information_schema`, so that
//! enums, functions, comments and index key order are all available.
//! [`CockroachAdapter`] reuses these queries and adds its own corrections.

mod cockroach;
mod types;

pub use cockroach::CockroachAdapter;

use crate::adapter::{Adapter, Capabilities};
use crate::connection::{Connection, Row, query_map, query_scalar};
use crate::error::{DriverError, Error, Result, qualified};
use crate::query::introspect_with_view;
use crate::resolve::{ResolvedType, TypeContext, resolve_native};
use regex::Regex;
use schemagraph_types::Dialect;
use schemagraph_types::catalog::{
    RawColumn, RawEnum, RawEnumValue, RawForeignKey, RawIndex, RawIndexColumn, RawProc,
    RawProcParam, RawTable, RelKind,
};
use std::collections::HashSet;

/// `::type AS name` casts that the query stripper moves into line comments.
const QUERY_STRIP_PATTERN: &str = r"(?i)::[a-z][a-z0-9_\.]+\s+AS\s+[a-z][a-z0-9_\.]+";

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresAdapter;

impl Adapter for PostgresAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
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
            RelKind::Table => "r",
            RelKind::View => "v",
        }
    }

    fn schema_name(&self, conn: &mut dyn Connection) -> Result<String> {
        Ok(query_scalar(conn, queries::SCHEMA_QUERY, &[])?.unwrap_or_else(|| "public".to_string()))
    }

    fn resolve_type(&self, ctx: &TypeContext<'_>, native: &str, nullable: bool) -> ResolvedType {
        resolve_native(ctx, native, nullable, &types::lookup)
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
        Ok(query_map(
            conn,
            queries::ENUM_VALUES_QUERY,
            &[schema, enum_name],
            |row| {
                Ok(RawEnumValue {
                    value: row.text(0)?,
                    const_value: row.int(1)?,
                })
            },
        )?)
    }

    /// Skipped silently when `pg_get_function_result` is unavailable.
    fn procedures(&self, conn: &mut dyn Connection, schema: &str) -> Result<Vec<RawProc>> {
        let supported = query_map(conn, queries::FUNCTION_RESULT_EXISTS_QUERY, &[], |row| {
            row.boolean(0)
        })?;
        if supported != [true] {
            return Ok(Vec::new());
        }

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
                comment: row.opt_text(1)?,
            })
        })?)
    }

    fn sequence_tables(&self, conn: &mut dyn Connection, schema: &str) -> Result<HashSet<String>> {
        Ok(query_map(conn, queries::SEQUENCES_QUERY, &[schema], |row| row.text(0))?
            .into_iter()
            .collect())
    }

    fn columns(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumn>> {
        Ok(query_map(conn, queries::COLUMNS_QUERY, &[schema, table], process_column)?)
    }

    fn foreign_keys(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawForeignKey>> {
        Ok(query_map(
            conn,
            queries::FOREIGN_KEYS_QUERY,
            &[schema, table],
            process_foreign_key,
        )?)
    }

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
                is_primary: row.boolean(2)?,
                origin: None,
            })
        })?)
    }

    fn index_columns(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        _table: &str,
        index: &str,
    ) -> Result<Vec<RawIndexColumn>> {
        Ok(query_map(
            conn,
            queries::INDEX_COLUMNS_QUERY,
            &[schema, index],
            process_index_column,
        )?)
    }

    fn index_column_order(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        table: &str,
        index: &str,
    ) -> Result<String> {
        query_scalar(conn, queries::INDEX_ORDER_QUERY, &[schema, index])?.ok_or_else(|| {
            Error::IndexOrder {
                relation: qualified(schema, table),
                index: index.to_string(),
            }
        })
    }

    fn view_schema(&self, conn: &mut dyn Connection, view: &str) -> Result<String> {
        query_scalar(conn, queries::VIEW_SCHEMA_QUERY, &[view])?.ok_or_else(|| Error::ViewSchema {
            view: view.to_string(),
        })
    }

    /// JSON columns of ad-hoc queries resolve to a type named after the column.
    fn query_columns(&self, conn: &mut dyn Connection, statement: &str) -> Result<Vec<RawColumn>> {
        let mut columns = introspect_with_view(self, conn, statement)?;
        for column in &mut columns {
            if matches!(column.data_type.as_str(), "json" | "jsonb") {
                column.data_type = column.name.clone();
            }
        }
        Ok(columns)
    }

    fn strip_query(&self, lines: &mut [String], comments: &mut [String]) -> Result<()> {
        let re = Regex::new(QUERY_STRIP_PATTERN)?;
        for (i, line) in lines.iter_mut().enumerate() {
            let annotation = re.find(line).map(|m| m.range());
            let stripped = match annotation {
                Some(range) => {
                    let cast = line[range.clone()].to_string();
                    line.replace_range(range, "");
                    cast
                }
                None => String::new(),
            };
            if let Some(slot) = comments.get_mut(i + 1) {
                *slot = stripped;
            }
        }
        Ok(())
    }
}

pub(crate) fn process_column(row: &Row) -> Result<RawColumn, DriverError> {
    Ok(RawColumn {
        ordinal: row.int(0)?,
        name: row.text(1)?,
        data_type: row.text(2)?,
        not_null: row.boolean(3)?,
        default_value: row.opt_text(4)?,
        is_primary_key: row.boolean(5)?,
        comment: row.opt_text(6)?,
    })
}

pub(crate) fn process_foreign_key(row: &Row) -> Result<RawForeignKey, DriverError> {
    Ok(RawForeignKey {
        name: row.text(0)?,
        column: row.text(1)?,
        ref_table: row.text(2)?,
        ref_column: row.opt_text(3)?,
        on_update: row.opt_text(4)?.map(|code| action_code_to_string(&code)),
        on_delete: row.opt_text(5)?.map(|code| action_code_to_string(&code)),
    })
}

fn process_index_column(row: &Row) -> Result<RawIndexColumn, DriverError> {
    Ok(RawIndexColumn {
        seq_no: row.int(0)?,
        cid: row.int(1)?,
        name: row.text(2)?,
    })
}

/// Convert a `pg_constraint` action code to its SQL spelling.
pub fn action_code_to_string(code: &str) -> String {
    match code {
        "a" => "NO ACTION",
        "r" => "RESTRICT",
        "c" => "CASCADE",
        "n" => "SET NULL",
        "d" => "SET DEFAULT",
        other => other,
    }
    .to_string()
}

/// Catalog queries, parameterized with `$n` text parameters.
pub mod queries {
    pub const SCHEMA_QUERY: &str = "SELECT current_schema()";

    pub const ENUMS_QUERY: &str = r#"
        SELECT DISTINCT t.typname
        FROM pg_type t
        JOIN ONLY pg_namespace n ON n.oid = t.typnamespace
        JOIN ONLY pg_enum e ON t.oid = e.enumtypid
        WHERE n.nspname = $1
        ORDER BY t.typname
    "#;

    pub const ENUM_VALUES_QUERY: &str = r#"
        SELECT e.enumlabel, e.enumsortorder::integer
        FROM pg_type t
        JOIN ONLY pg_namespace n ON n.oid = t.typnamespace
        LEFT JOIN pg_enum e ON t.oid = e.enumtypid
        WHERE n.nspname = $1 AND t.typname = $2
        ORDER BY e.enumsortorder
    "#;

    pub const FUNCTION_RESULT_EXISTS_QUERY: &str = r#"
        SELECT EXISTS (
            SELECT 1 FROM pg_catalog.pg_proc WHERE proname = 'pg_get_function_result'
        )
    "#;

    pub const PROCS_QUERY: &str = r#"
        SELECT p.proname, pg_get_function_result(p.oid)
        FROM pg_proc p
        JOIN ONLY pg_namespace n ON p.pronamespace = n.oid
        WHERE n.nspname = $1
        ORDER BY p.proname
    "#;

    pub const PROC_PARAMS_QUERY: &str = r#"
        SELECT UNNEST(STRING_TO_ARRAY(oidvectortypes(p.proargtypes), ', '))
        FROM pg_proc p
        JOIN ONLY pg_namespace n ON p.pronamespace = n.oid
        WHERE n.nspname = $1 AND p.proname = $2
    "#;

    pub const TABLES_QUERY: &str = r#"
        SELECT c.relname, obj_description(c.oid, 'pg_class')
        FROM pg_class c
        JOIN ONLY pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = $1 AND c.relkind::text = $2
        ORDER BY c.relname
    "#;

    pub const SEQUENCES_QUERY: &str = r#"
        SELECT t.relname
        FROM pg_class s
        JOIN pg_depend d ON d.objid = s.oid
        JOIN pg_class t ON d.objid = s.oid AND d.refobjid = t.oid
        JOIN pg_namespace n ON n.oid = s.relnamespace
        WHERE n.nspname = $1 AND s.relkind = 'S'
    "#;

    pub const COLUMNS_QUERY: &str = r#"
        SELECT
            a.attnum::integer,
            a.attname::text,
            format_type(a.atttypid, a.atttypmod),
            a.attnotnull,
            pg_get_expr(ad.adbin, ad.adrelid),
            COALESCE(ct.contype = 'p', false),
            col_description(a.attrelid, a.attnum)
        FROM pg_attribute a
        JOIN ONLY pg_class c ON c.oid = a.attrelid
        JOIN ONLY pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_constraint ct ON ct.conrelid = c.oid
            AND a.attnum = ANY(ct.conkey)
            AND ct.contype = 'p'
        LEFT JOIN pg_attrdef ad ON ad.adrelid = c.oid AND ad.adnum = a.attnum
        WHERE a.attisdropped = false
            AND n.nspname = $1
            AND c.relname = $2
            AND a.attnum > 0
        ORDER BY a.attnum
    "#;

    pub const FOREIGN_KEYS_QUERY: &str = r#"
        SELECT
            r.conname::text,
            b.attname::text,
            i.relname::text,
            f.attname::text,
            r.confupdtype::text,
            r.confdeltype::text
        FROM pg_constraint r
        JOIN ONLY pg_class c ON r.conrelid = c.oid
        JOIN ONLY pg_namespace n ON c.relnamespace = n.oid
        JOIN ONLY pg_attribute b ON b.attisdropped = false
            AND b.attnum = ANY(r.conkey)
            AND b.attrelid = r.conrelid
        JOIN ONLY pg_class i ON r.confrelid = i.oid
        JOIN ONLY pg_attribute f ON f.attisdropped = false
            AND f.attnum = ANY(r.confkey)
            AND f.attrelid = r.confrelid
        WHERE r.contype = 'f' AND n.nspname = $1 AND c.relname = $2
        ORDER BY r.conname, b.attname
    "#;

    pub const INDEXES_QUERY: &str = r#"
        SELECT DISTINCT ic.relname::text, i.indisunique, i.indisprimary
        FROM pg_index i
        JOIN ONLY pg_class c ON c.oid = i.indrelid
        JOIN ONLY pg_namespace n ON n.oid = c.relnamespace
        JOIN ONLY pg_class ic ON ic.oid = i.indexrelid
        WHERE i.indkey::text <> '0' AND n.nspname = $1 AND c.relname = $2
        ORDER BY ic.relname
    "#;

    pub const INDEX_COLUMNS_QUERY: &str = r#"
        SELECT (row_number() OVER ())::integer, a.attnum::integer, a.attname::text
        FROM pg_index i
        JOIN ONLY pg_class c ON c.oid = i.indrelid
        JOIN ONLY pg_namespace n ON n.oid = c.relnamespace
        JOIN ONLY pg_class ic ON ic.oid = i.indexrelid
        LEFT JOIN pg_attribute a ON i.indrelid = a.attrelid
            AND a.attnum = ANY(i.indkey)
            AND a.attisdropped = false
        WHERE i.indkey::text <> '0' AND n.nspname = $1 AND ic.relname = $2
    "#;

    pub const INDEX_ORDER_QUERY: &str = r#"
        SELECT i.indkey::text
        FROM pg_index i
        JOIN ONLY pg_class c ON c.oid = i.indrelid
        JOIN ONLY pg_namespace n ON n.oid = c.relnamespace
        JOIN ONLY pg_class ic ON ic.oid = i.indexrelid
        WHERE n.nspname = $1 AND ic.relname = $2
    "#;

    pub const VIEW_SCHEMA_QUERY: &str = r#"
        SELECT n.nspname::text
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE c.relname = $1
    "#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::Initialisms;
    use schemagraph_types::TypeMode;

    fn resolve(mode: TypeMode, native: &str, nullable: bool) -> ResolvedType {
        let names = Initialisms::default();
        let ctx = TypeContext {
            schema: "public",
            mode,
            int32_type: "i32",
            uint32_type: "u32",
            names: &names,
        };
        PostgresAdapter.resolve_type(&ctx, native, nullable)
    }

    #[test]
    fn integer_standard() {
        let ty = resolve(TypeMode::Standard, "integer", false);
        assert_eq!(ty.name, "i32");
        assert_eq!(ty.zero, "0");
        assert_eq!(ty.precision, None);
    }

    #[test]
    fn nullable_varchar_array_is_string_list() {
        let ty = resolve(TypeMode::Standard, "character varying[]", true);
        assert_eq!(ty.name, "StringList");
        assert_ne!(ty.name, "Vec<Option<String>>");
    }

    #[test]
    fn boolean_across_modes() {
        assert_eq!(resolve(TypeMode::Standard, "boolean", false).zero, "false");
        assert_eq!(resolve(TypeMode::Standard, "boolean", true).name, "Option<bool>");
        assert_eq!(resolve(TypeMode::Pointer, "boolean", true).name, "Option<Box<bool>>");
        assert_eq!(resolve(TypeMode::Hybrid, "boolean", true).name, "pgtype::Bool");
        assert_eq!(resolve(TypeMode::Hybrid, "boolean", false).name, "bool");
        assert_eq!(resolve(TypeMode::Full, "boolean", false).name, "pgtype::Bool");
    }

    #[test]
    fn internal_representations() {
        assert_eq!(resolve(TypeMode::Standard, "uuid", false).name, "uuid::Uuid");
        assert_eq!(resolve(TypeMode::Pointer, "uuid", false).name, "[u8; 16]");
        assert_eq!(resolve(TypeMode::Standard, "bigserial", false).name, "u64");
        assert_eq!(resolve(TypeMode::Pointer, "bigserial", false).name, "i64");
    }

    #[test]
    fn precision_and_setof() {
        let ty = resolve(TypeMode::Standard, "numeric(12,4)", false);
        assert_eq!((ty.name.as_str(), ty.precision, ty.scale), ("f64", Some(12), Some(4)));

        let ty = resolve(TypeMode::Standard, "character varying(255)", true);
        assert_eq!(ty.name, "Option<String>");
        assert_eq!(ty.precision, Some(255));

        let ty = resolve(TypeMode::Standard, "timestamp(3) with time zone", false);
        assert_eq!(ty.name, "chrono::DateTime<chrono::Utc>");

        let ty = resolve(TypeMode::Standard, "SETOF integer", true);
        assert_eq!(ty.name, "Vec<i32>");
        assert_eq!(ty.zero, "Vec::new()");

        assert_eq!(resolve(TypeMode::Standard, "bytea", false).name, "Vec<u8>");
        assert_eq!(resolve(TypeMode::Standard, "integer[]", false).name, "Vec<i32>");
    }

    #[test]
    fn user_defined_types() {
        assert_eq!(resolve(TypeMode::Standard, "public.order_status", false).name, "OrderStatus");
        assert_eq!(resolve(TypeMode::Standard, "order_status", true).name, "Option<OrderStatus>");
    }

    #[test]
    fn query_strip_moves_casts_into_comments() {
        let mut lines = vec![
            "SELECT a.id::integer AS id,".to_string(),
            "a.name".to_string(),
        ];
        let mut comments = vec![String::new(); lines.len() + 1];
        PostgresAdapter.strip_query(&mut lines, &mut comments).unwrap();
        assert_eq!(lines[0], "SELECT a.id,");
        assert_eq!(comments[1], "::integer AS id");
        assert_eq!(comments[2], "");
    }

    #[test]
    fn action_codes() {
        assert_eq!(action_code_to_string("c"), "CASCADE");
        assert_eq!(action_code_to_string("n"), "SET NULL");
        assert_eq!(action_code_to_string("x"), "x");
    }
}
