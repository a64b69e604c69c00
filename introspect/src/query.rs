//! Ad-hoc query introspection
//!
//! A free-form statement has no catalog entry of its own, so its column shape
//! is read by wrapping it in a throwaway view, loading that view's columns
//! through the regular column path and dropping it again.
//!
//! Statements may carry inline parameters written `%%name type%%`, or
//! `%%name type,interpolate%%` for values spliced into the SQL text instead
//! of being bound.

use crate::adapter::Adapter;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::ir::{Field, Relation};
use crate::loader::LoaderOptions;
use crate::names::plural;
use crate::resolve::ResolvedType;
use crate::trace::trace_warn;
use regex::Regex;
use schemagraph_types::catalog::{RawColumn, RawTable, RelKind};
use serde::Serialize;

const PARAM_DELIMITER: &str = "%%";
const VIEW_PREFIX: &str = "_sg_";

/// A view that exists for as long as this guard does.
///
/// Dropping the guard drops the view, whichever way the caller leaves.
pub struct EphemeralView<'c> {
    conn: &'c mut dyn Connection,
    name: String,
    drop_sql: String,
}

impl<'c> EphemeralView<'c> {
    /// Create a uniquely named view over `statement`.
    pub fn create<A: Adapter + ?Sized>(
        adapter: &A,
        conn: &'c mut dyn Connection,
        statement: &str,
    ) -> Result<Self> {
        let name = format!("{VIEW_PREFIX}{}", uuid::Uuid::new_v4().simple());
        conn.execute(&adapter.create_view_sql(&name, statement))?;
        Ok(Self {
            drop_sql: adapter.drop_view_sql(&name),
            conn,
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection(&mut self) -> &mut dyn Connection {
        &mut *self.conn
    }
}

impl Drop for EphemeralView<'_> {
    fn drop(&mut self) {
        if let Err(_err) = self.conn.execute(&self.drop_sql) {
            trace_warn!(view = %self.name, error = %_err, "failed to drop introspection view");
        }
    }
}

/// Column shape of `statement`, read through a temporary view.
pub fn introspect_with_view<A: Adapter + ?Sized>(
    adapter: &A,
    conn: &mut dyn Connection,
    statement: &str,
) -> Result<Vec<RawColumn>> {
    let mut view = EphemeralView::create(adapter, conn, statement)?;
    let name = view.name().to_string();
    let schema = adapter.view_schema(view.connection(), &name)?;
    adapter.columns(view.connection(), &schema, &name)
}

/// Everything needed to turn one statement into a typed query.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub statement: String,
    /// Name of the generated row type.
    pub type_name: String,
    /// Function name; derived from the type and parameters when `None`.
    pub func_name: Option<String>,
    /// The query returns at most one row.
    pub only_one: bool,
    /// Honour column nullability; otherwise every field is non-null.
    pub allow_nulls: bool,
    /// `name type, name2` field list used instead of introspection.
    pub fields: Option<String>,
    /// Trim each statement line.
    pub trim: bool,
    /// Let the adapter move engine-specific annotations into comments.
    pub strip: bool,
    /// Allow `interpolate` parameters.
    pub interpolate: bool,
    pub type_comment: Option<String>,
    pub func_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParam {
    pub name: String,
    pub ty: String,
    /// Spliced into the SQL text as `{name}` instead of being bound.
    pub interpolate: bool,
}

/// A statement with its inline parameters replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Replace `%%name type%%` parameters in `statement`.
///
/// `placeholder` renders the bind marker for the n-th bound parameter. With
/// `splice` set, interpolated parameters become `{name}`; otherwise they are
/// rendered like bound ones.
pub fn parse_params(
    statement: &str,
    allow_interpolate: bool,
    splice: bool,
    placeholder: impl Fn(usize) -> String,
) -> Result<ParsedStatement> {
    let re = Regex::new(&format!("{PARAM_DELIMITER}[^%]+{PARAM_DELIMITER}"))?;

    let mut sql = String::with_capacity(statement.len());
    let mut params = Vec::new();
    let mut bound = 0;
    let mut last = 0;
    for m in re.find_iter(statement) {
        let param = parse_param(
            &statement[m.start() + PARAM_DELIMITER.len()..m.end() - PARAM_DELIMITER.len()],
            allow_interpolate,
        )?;

        sql.push_str(&statement[last..m.start()]);
        if splice && param.interpolate {
            sql.push('{');
            sql.push_str(&param.name);
            sql.push('}');
        } else {
            sql.push_str(&placeholder(bound));
            bound += 1;
        }
        params.push(param);
        last = m.end();
    }
    sql.push_str(&statement[last..]);

    Ok(ParsedStatement { sql, params })
}

fn parse_param(body: &str, allow_interpolate: bool) -> Result<QueryParam> {
    let Some((name, rest)) = body.trim().split_once(' ') else {
        return Err(Error::QueryParam(body.to_string()));
    };
    let mut options = rest.split(',').map(str::trim);
    let ty = options.next().unwrap_or_default();
    if name.is_empty() || ty.is_empty() {
        return Err(Error::QueryParam(body.to_string()));
    }

    let mut interpolate = false;
    for option in options {
        match option {
            "interpolate" if allow_interpolate => interpolate = true,
            _ => return Err(Error::QueryParam(body.to_string())),
        }
    }

    Ok(QueryParam {
        name: name.to_string(),
        ty: ty.to_string(),
        interpolate,
    })
}

/// A typed ad-hoc query, ready for a template backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    /// Function name, e.g. `GetAuthors` or `AuthorByID`.
    pub name: String,
    pub statement: Vec<String>,
    /// `comments[i + 1]` annotates `statement[i]`.
    pub comments: Vec<String>,
    pub params: Vec<QueryParam>,
    pub only_one: bool,
    pub interpolate: bool,
    /// Row type; its table name is `[custom <type>]`.
    pub ty: Relation,
    pub comment: Option<String>,
}

/// Resolve `spec` into a [`Query`], introspecting the statement unless an
/// explicit field list is given.
pub fn introspect_query(
    adapter: &dyn Adapter,
    conn: &mut dyn Connection,
    options: &LoaderOptions,
    spec: &QuerySpec,
) -> Result<Query> {
    let names = &options.initialisms;

    let executable = parse_params(&spec.statement, spec.interpolate, true, |i| {
        adapter.nth_param(i)
    })?;
    let inspect = parse_params(&spec.statement, spec.interpolate, false, |_| {
        "NULL".to_string()
    })?;

    let mut statement = split_lines(&executable.sql, spec.trim);
    let inspect = split_lines(&inspect.sql, spec.trim).join("\n");
    let mut comments = vec![String::new(); statement.len() + 1];
    if spec.strip {
        adapter.strip_query(&mut statement, &mut comments)?;
    }

    let schema = match &options.schema {
        Some(schema) => schema.clone(),
        None => adapter.schema_name(conn)?,
    };
    let table = RawTable {
        name: format!("[custom {}]", names.to_snake(&spec.type_name).to_lowercase()),
        kind: String::new(),
        comment: spec.type_comment.clone(),
    };
    let mut ty = Relation::new(spec.type_name.clone(), &schema, RelKind::Table, table);
    ty.manual_primary_key = true;

    match &spec.fields {
        Some(fields) => {
            for field in fields.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                let (name, target) = field
                    .split_once(' ')
                    .map(|(n, t)| (n, t.trim()))
                    .unwrap_or((field, "String"));
                ty.push_field(Field {
                    name: name.to_string(),
                    ty: ResolvedType::new(target, "Default::default()"),
                    column: RawColumn {
                        name: names.to_snake(name),
                        data_type: target.to_string(),
                        ..RawColumn::default()
                    },
                });
            }
        }
        None => {
            let ctx = options.type_context(&schema);
            for column in adapter.query_columns(conn, &inspect)? {
                let nullable = spec.allow_nulls && column.nullable();
                ty.push_field(Field {
                    name: names.to_camel(&column.name),
                    ty: adapter.resolve_type(&ctx, &column.data_type, nullable),
                    column,
                });
            }
        }
    }

    let name = match &spec.func_name {
        Some(name) => name.clone(),
        None => func_name(&spec.type_name, spec.only_one, &executable.params),
    };

    Ok(Query {
        name,
        statement,
        comments,
        params: executable.params,
        only_one: spec.only_one,
        interpolate: spec.interpolate,
        ty,
        comment: spec.func_comment.clone(),
    })
}

/// `Get<Types>` without parameters, `<Types>By<Param>...` with them; the
/// singular type is used for single-row queries.
pub fn func_name(type_name: &str, only_one: bool, params: &[QueryParam]) -> String {
    let mut name = if only_one {
        type_name.to_string()
    } else {
        plural(type_name)
    };
    if params.is_empty() {
        return format!("Get{name}");
    }
    name.push_str("By");
    for param in params {
        let mut chars = param.name.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

fn split_lines(sql: &str, trim: bool) -> Vec<String> {
    let lines: Vec<&str> = sql.split('\n').collect();
    if !trim {
        return lines.into_iter().map(str::to_string).collect();
    }
    let last = lines.len().saturating_sub(1);
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let line = line.trim();
            if i < last {
                format!("{line} ")
            } else {
                line.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = "SELECT * FROM books\nWHERE author_id = %%authorID i64%%\n  AND %%col String,interpolate%% = %%title String%%";

    #[test]
    fn bound_and_inspected_forms() {
        let parsed = parse_params(STATEMENT, true, true, |i| format!("${}", i + 1)).unwrap();
        assert_eq!(
            parsed.sql,
            "SELECT * FROM books\nWHERE author_id = $1\n  AND {col} = $2"
        );
        assert_eq!(parsed.params.len(), 3);
        assert_eq!(parsed.params[0].name, "authorID");
        assert_eq!(parsed.params[0].ty, "i64");
        assert!(parsed.params[1].interpolate);

        let inspect = parse_params(STATEMENT, true, false, |_| "NULL".to_string()).unwrap();
        assert_eq!(
            inspect.sql,
            "SELECT * FROM books\nWHERE author_id = NULL\n  AND NULL = NULL"
        );
    }

    #[test]
    fn malformed_params() {
        let placeholder = |_| "?".to_string();
        assert!(matches!(
            parse_params("SELECT %%id%%", false, true, placeholder),
            Err(Error::QueryParam(p)) if p == "id"
        ));
        assert!(parse_params("SELECT %%id i64,cached%%", true, true, placeholder).is_err());
        // interpolation must be switched on
        assert!(parse_params("SELECT %%id i64,interpolate%%", false, true, placeholder).is_err());
    }

    #[test]
    fn derived_function_names() {
        let param = |name: &str| QueryParam {
            name: name.to_string(),
            ty: "i64".to_string(),
            interpolate: false,
        };
        assert_eq!(func_name("Author", false, &[]), "GetAuthors");
        assert_eq!(func_name("Author", true, &[]), "GetAuthor");
        assert_eq!(
            func_name("Book", false, &[param("authorID"), param("year")]),
            "BooksByAuthorIDYear"
        );
    }

    #[test]
    fn trimmed_lines_keep_separating_space() {
        assert_eq!(
            split_lines("  SELECT a\n   FROM t  ", true),
            vec!["SELECT a ".to_string(), "FROM t".to_string()]
        );
        assert_eq!(split_lines("a\n b", false), vec!["a", " b"]);
    }
}
