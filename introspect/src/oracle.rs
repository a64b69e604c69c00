//! Oracle catalog adapter
//!
//! Reads the `all_*` dictionary views. Oracle folds unquoted identifiers to
//! uppercase, so names are lowercased on the way out and uppercased on the
//! way back in. The dictionary already lists primary key indexes, so no
//! primary key index is ever synthesized for this engine.

use crate::adapter::{Adapter, Capabilities};
use crate::connection::{Connection, query_map, query_scalar};
use crate::error::{Error, Result, qualified};
use crate::resolve::{NativeType, Precision, ResolvedType, TypeContext, resolve_native};
use schemagraph_types::Dialect;
use schemagraph_types::catalog::{
    EscapeKind, RawColumn, RawForeignKey, RawIndex, RawIndexColumn, RawTable, RelKind,
};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct OracleAdapter;

impl Adapter for OracleAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn relkind(&self, kind: RelKind) -> &'static str {
        match kind {
            RelKind::Table => "TABLE",
            RelKind::View => "VIEW",
        }
    }

    fn nth_param(&self, index: usize) -> String {
        format!(":{}", index + 1)
    }

    fn schema_name(&self, conn: &mut dyn Connection) -> Result<String> {
        Ok(query_scalar(conn, queries::SCHEMA_QUERY, &[])?.unwrap_or_default())
    }

    fn resolve_type(&self, ctx: &TypeContext<'_>, native: &str, nullable: bool) -> ResolvedType {
        resolve_native(ctx, native, nullable, &lookup)
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

    fn auto_increment_tables(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
    ) -> Result<HashSet<String>> {
        Ok(query_map(conn, queries::IDENTITY_TABLES_QUERY, &[schema], |row| row.text(0))?
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
                default_value: None,
                is_primary_key: row.boolean(4)?,
                comment: row.opt_text(5)?,
            })
        })?)
    }

    /// Rows name only the referenced table; the builder falls back to its primary key.
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
                ref_column: None,
                on_update: None,
                on_delete: row.opt_text(3)?,
            })
        })?)
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
        query_scalar(conn, queries::INDEX_ORDER_QUERY, &[schema, index])?.ok_or_else(|| {
            Error::IndexOrder {
                relation: qualified(schema, table),
                index: index.to_string(),
            }
        })
    }

    // the dictionary stores the quoted name verbatim, while lookups uppercase it
    fn create_view_sql(&self, name: &str, statement: &str) -> String {
        format!(
            "CREATE VIEW {} AS ({statement})",
            self.escape(EscapeKind::Table, &name.to_uppercase())
        )
    }

    fn drop_view_sql(&self, name: &str) -> String {
        format!(
            "DROP VIEW {}",
            self.escape(EscapeKind::Table, &name.to_uppercase())
        )
    }
}

fn lookup(dt: &str, p: Precision, ctx: &TypeContext<'_>) -> Option<NativeType> {
    let ty = match dt {
        "char" | "nchar" | "varchar" | "varchar2" | "nvarchar2" | "long" | "clob" | "nclob"
        | "rowid" | "urowid" => NativeType::plain("String", "String::new()"),

        "number" => match (p.precision, p.scale) {
            (_, Some(scale)) if scale > 0 => NativeType::plain("f64", "0.0"),
            (Some(p), _) if p <= 4 => NativeType::plain("i16", "0"),
            (Some(p), _) if p <= 9 => NativeType::plain(ctx.int32_type, "0"),
            (Some(p), _) if p <= 18 => NativeType::plain("i64", "0"),
            _ => NativeType::plain("f64", "0.0"),
        },
        "integer" | "int" | "smallint" => NativeType::plain("i64", "0"),
        "binary_float" => NativeType::plain("f32", "0.0"),
        "float" | "binary_double" => NativeType::plain("f64", "0.0"),

        "date" | "timestamp" => NativeType::plain(
            "chrono::NaiveDateTime",
            "chrono::NaiveDateTime::default()",
        ),
        "timestamp with time zone" | "timestamp with local time zone" => NativeType::plain(
            "chrono::DateTime<chrono::Utc>",
            "chrono::DateTime::<chrono::Utc>::default()",
        ),

        "blob" | "raw" | "long raw" | "bfile" => NativeType::plain("Vec<u8>", "Vec::new()"),

        _ => return None,
    };
    Some(ty)
}

pub mod queries {
    pub const SCHEMA_QUERY: &str =
        "SELECT LOWER(SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA')) FROM dual";

    pub const TABLES_QUERY: &str = r#"
        SELECT LOWER(o.object_name), c.comments
        FROM all_objects o
        LEFT JOIN all_tab_comments c
            ON c.owner = o.owner AND c.table_name = o.object_name
        WHERE o.owner = UPPER(:1)
            AND o.object_type = :2
            AND o.object_name NOT LIKE '%$%'
            AND o.object_name NOT LIKE 'LOGMNR%\_%' ESCAPE '\'
            AND o.object_name NOT LIKE 'REDO\_%' ESCAPE '\'
            AND o.object_name NOT LIKE 'SCHEDULER\_%\_TBL' ESCAPE '\'
            AND o.object_name NOT LIKE 'SQLPLUS\_%' ESCAPE '\'
        ORDER BY o.object_name
    "#;

    pub const IDENTITY_TABLES_QUERY: &str = r#"
        SELECT LOWER(table_name)
        FROM all_tab_identity_cols
        WHERE owner = UPPER(:1)
    "#;

    pub const COLUMNS_QUERY: &str = r#"
        SELECT
            c.column_id,
            LOWER(c.column_name),
            LOWER(CASE c.data_type
                WHEN 'CHAR' THEN 'CHAR(' || c.char_length || ')'
                WHEN 'VARCHAR2' THEN 'VARCHAR2(' || c.char_length || ')'
                WHEN 'NUMBER' THEN
                    CASE
                        WHEN c.data_precision IS NULL AND c.data_scale IS NULL THEN 'NUMBER'
                        WHEN c.data_scale IS NULL OR c.data_scale = 0
                            THEN 'NUMBER(' || NVL(c.data_precision, 38) || ')'
                        ELSE 'NUMBER(' || NVL(c.data_precision, 38) || ', ' || c.data_scale || ')'
                    END
                ELSE c.data_type
            END),
            CASE WHEN c.nullable = 'N' THEN '1' ELSE '0' END,
            CASE WHEN pk.column_name IS NOT NULL THEN '1' ELSE '0' END,
            cc.comments
        FROM all_tab_columns c
        LEFT JOIN (
            SELECT acc.owner, acc.table_name, acc.column_name
            FROM all_constraints ac
            JOIN all_cons_columns acc
                ON acc.owner = ac.owner AND acc.constraint_name = ac.constraint_name
            WHERE ac.constraint_type = 'P'
        ) pk ON pk.owner = c.owner
            AND pk.table_name = c.table_name
            AND pk.column_name = c.column_name
        LEFT JOIN all_col_comments cc
            ON cc.owner = c.owner
            AND cc.table_name = c.table_name
            AND cc.column_name = c.column_name
        WHERE c.owner = UPPER(:1) AND c.table_name = UPPER(:2)
        ORDER BY c.column_id
    "#;

    pub const FOREIGN_KEYS_QUERY: &str = r#"
        SELECT
            LOWER(a.constraint_name),
            LOWER(a.column_name),
            LOWER(r.table_name),
            c.delete_rule
        FROM all_cons_columns a
        JOIN all_constraints c
            ON c.owner = a.owner AND c.constraint_name = a.constraint_name
        JOIN all_constraints r
            ON r.owner = c.r_owner AND r.constraint_name = c.r_constraint_name
        WHERE c.constraint_type = 'R' AND a.owner = UPPER(:1) AND a.table_name = UPPER(:2)
        ORDER BY a.constraint_name, a.position
    "#;

    pub const INDEXES_QUERY: &str = r#"
        SELECT
            LOWER(i.index_name),
            CASE WHEN i.uniqueness = 'UNIQUE' THEN '1' ELSE '0' END,
            CASE WHEN c.constraint_type = 'P' THEN '1' ELSE '0' END
        FROM all_indexes i
        LEFT JOIN all_constraints c
            ON c.owner = i.owner
            AND c.table_name = i.table_name
            AND c.index_name = i.index_name
            AND c.constraint_type = 'P'
        WHERE i.table_owner = UPPER(:1) AND i.table_name = UPPER(:2)
        ORDER BY i.index_name
    "#;

    pub const INDEX_COLUMNS_QUERY: &str = r#"
        SELECT ic.column_position, tc.column_id, LOWER(ic.column_name)
        FROM all_ind_columns ic
        JOIN all_tab_columns tc
            ON tc.owner = ic.table_owner
            AND tc.table_name = ic.table_name
            AND tc.column_name = ic.column_name
        WHERE ic.index_owner = UPPER(:1) AND ic.index_name = UPPER(:2)
    "#;

    pub const INDEX_ORDER_QUERY: &str = r#"
        SELECT LISTAGG(tc.column_id, ' ') WITHIN GROUP (ORDER BY ic.column_position)
        FROM all_ind_columns ic
        JOIN all_tab_columns tc
            ON tc.owner = ic.table_owner
            AND tc.table_name = ic.table_name
            AND tc.column_name = ic.column_name
        WHERE ic.index_owner = UPPER(:1) AND ic.index_name = UPPER(:2)
    "#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::Initialisms;
    use schemagraph_types::TypeMode;

    fn resolve(native: &str) -> String {
        let names = Initialisms::default();
        let ctx = TypeContext {
            schema: "app",
            mode: TypeMode::Full,
            int32_type: "i32",
            uint32_type: "u32",
            names: &names,
        };
        OracleAdapter.resolve_type(&ctx, native, false).name
    }

    #[test]
    fn number_precision_selects_width() {
        assert_eq!(resolve("number(4)"), "i16");
        assert_eq!(resolve("number(9)"), "i32");
        assert_eq!(resolve("number(18)"), "i64");
        assert_eq!(resolve("number(38)"), "f64");
        assert_eq!(resolve("number(10, 2)"), "f64");
        assert_eq!(resolve("number"), "f64");
        assert_eq!(resolve("varchar2(30)"), "String");
        assert_eq!(resolve("timestamp(6)"), "chrono::NaiveDateTime");
    }

    #[test]
    fn view_ddl_uses_dictionary_case() {
        assert_eq!(
            OracleAdapter.create_view_sql("_sg_ab", "SELECT 1 FROM dual"),
            "CREATE VIEW \"_SG_AB\" AS (SELECT 1 FROM dual)"
        );
        assert_eq!(OracleAdapter.drop_view_sql("_sg_ab"), "DROP VIEW \"_SG_AB\"");
    }
}
