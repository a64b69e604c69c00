//! Schema graph builder
//!
//! Drives an [`Adapter`] through a fixed sequence of phases and assembles a
//! [`SchemaGraph`]. The graph under construction is local to [`GraphBuilder::build`]:
//! any failure returns the originating error and nothing partial escapes.

use crate::adapter::{Adapter, AdapterRegistry};
use crate::connection::Connection;
use crate::error::Result;
use crate::ir::{Enum, EnumValue, Field, Proc, ProcParam, Relation, SchemaGraph};
use crate::names::Initialisms;
use crate::resolve::TypeContext;
use crate::trace::{trace_phase, trace_warn};
use crate::{foreign_keys, indexes};
use schemagraph_types::catalog::{RawTable, RelKind};
use schemagraph_types::{Dialect, ForeignKeyMode, TypeMode};
use std::collections::{BTreeMap, HashSet};

/// Runtime options for one build, usually produced by
/// [`Config::loader_options`](crate::Config::loader_options).
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Schema to load; discovered through the adapter when `None`.
    pub schema: Option<String>,
    pub mode: TypeMode,
    pub initialisms: Initialisms,
    /// Relations never loaded, matched case-insensitively.
    pub ignore_tables: Vec<String>,
    /// Columns never loaded, matched case-insensitively.
    pub ignore_fields: Vec<String>,
    pub foreign_key_mode: ForeignKeyMode,
    pub use_index_names: bool,
    pub int32_type: String,
    pub uint32_type: String,
    /// Resolve PostgreSQL `json`/`jsonb` columns to a type named after the column.
    pub json_column_types: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            schema: None,
            mode: TypeMode::default(),
            initialisms: Initialisms::default(),
            ignore_tables: Vec::new(),
            ignore_fields: Vec::new(),
            foreign_key_mode: ForeignKeyMode::default(),
            use_index_names: false,
            int32_type: "i32".to_string(),
            uint32_type: "u32".to_string(),
            json_column_types: false,
        }
    }
}

impl LoaderOptions {
    pub fn type_context<'a>(&'a self, schema: &'a str) -> TypeContext<'a> {
        TypeContext {
            schema,
            mode: self.mode,
            int32_type: &self.int32_type,
            uint32_type: &self.uint32_type,
            names: &self.initialisms,
        }
    }

    pub fn ignores_table(&self, name: &str) -> bool {
        contains_folded(&self.ignore_tables, name)
    }

    pub fn ignores_field(&self, name: &str) -> bool {
        contains_folded(&self.ignore_fields, name)
    }
}

/// Unicode-aware case-insensitive membership.
fn contains_folded(list: &[String], name: &str) -> bool {
    let name = name.to_lowercase();
    list.iter().any(|entry| entry.to_lowercase() == name)
}

/// Build progress. Phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Phase {
    #[default]
    Init,
    EnumsLoaded,
    ProcsLoaded,
    TablesLoaded,
    ViewsLoaded,
    Merged,
    ForeignKeysResolved,
    IndexesResolved,
    Done,
}

impl Phase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::EnumsLoaded => "enums_loaded",
            Self::ProcsLoaded => "procs_loaded",
            Self::TablesLoaded => "tables_loaded",
            Self::ViewsLoaded => "views_loaded",
            Self::Merged => "merged",
            Self::ForeignKeysResolved => "foreign_keys_resolved",
            Self::IndexesResolved => "indexes_resolved",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct GraphBuilder<'a> {
    adapter: &'a dyn Adapter,
    options: &'a LoaderOptions,
    phase: Phase,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(adapter: &'a dyn Adapter, options: &'a LoaderOptions) -> Self {
        Self {
            adapter,
            options,
            phase: Phase::Init,
        }
    }

    /// Last phase reached; stays put when a build fails.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn build(&mut self, conn: &mut dyn Connection) -> Result<SchemaGraph> {
        self.phase = Phase::Init;

        let schema = match &self.options.schema {
            Some(schema) => schema.clone(),
            None => self.adapter.schema_name(conn)?,
        };
        let mut graph = SchemaGraph::new(schema.clone(), self.adapter.dialect());

        graph.enums = self.load_enums(conn, &schema)?;
        self.advance(Phase::EnumsLoaded, &schema);

        graph.procs = self.load_procs(conn, &schema)?;
        self.advance(Phase::ProcsLoaded, &schema);

        let backed = self.backed_tables(conn, &schema);
        let mut relations = self.load_relations(conn, &schema, RelKind::Table, &backed)?;
        self.advance(Phase::TablesLoaded, &schema);

        let views = self.load_relations(conn, &schema, RelKind::View, &backed)?;
        self.advance(Phase::ViewsLoaded, &schema);

        // views win over same-named tables
        for (name, view) in views {
            if relations.contains_key(&name) {
                trace_warn!(relation = %name, "view replaces table of the same name");
            }
            relations.insert(name, view);
        }
        graph.relations = relations;
        self.advance(Phase::Merged, &schema);

        foreign_keys::resolve(self.adapter, conn, self.options, &mut graph)?;
        self.advance(Phase::ForeignKeysResolved, &schema);

        indexes::resolve(self.adapter, conn, self.options, &mut graph)?;
        self.advance(Phase::IndexesResolved, &schema);

        self.advance(Phase::Done, &schema);
        Ok(graph)
    }

    fn advance(&mut self, next: Phase, schema: &str) {
        debug_assert!(next > self.phase, "phase {next} after {}", self.phase);
        self.phase = next;
        trace_phase!(next, schema);
    }

    fn load_enums(&self, conn: &mut dyn Connection, schema: &str) -> Result<Vec<Enum>> {
        if !self.adapter.capabilities().enums {
            return Ok(Vec::new());
        }
        let names = &self.options.initialisms;

        let mut enums = Vec::new();
        for raw in self.adapter.enums(conn, schema)? {
            let name = names.singularize(&raw.name);
            let values = self
                .adapter
                .enum_values(conn, schema, &raw.name)?
                .into_iter()
                .map(|value| EnumValue {
                    name: enum_value_name(names, &name, &value.value),
                    raw: value,
                })
                .collect();
            enums.push(Enum {
                name,
                native_name: raw.name,
                values,
            });
        }
        Ok(enums)
    }

    fn load_procs(&self, conn: &mut dyn Connection, schema: &str) -> Result<Vec<Proc>> {
        if !self.adapter.capabilities().procedures {
            return Ok(Vec::new());
        }
        let ctx = self.options.type_context(schema);

        let mut procs = Vec::new();
        for raw in self.adapter.procedures(conn, schema)? {
            let params = self
                .adapter
                .procedure_params(conn, schema, &raw.name)?
                .into_iter()
                .enumerate()
                .map(|(i, param)| {
                    let native_type = param.param_type.trim().to_string();
                    ProcParam {
                        name: format!("v{i}"),
                        ty: self.adapter.resolve_type(&ctx, &native_type, false),
                        native_type,
                    }
                })
                .collect();
            procs.push(Proc {
                name: self
                    .options
                    .initialisms
                    .to_camel(raw.name.trim_start_matches('_')),
                params,
                return_type: self.adapter.resolve_type(&ctx, &raw.return_type, false),
                raw,
            });
        }
        Ok(procs)
    }

    /// Tables whose primary key is filled in by the engine. Both probes are
    /// optional: a failing probe only means fewer tables count as backed.
    fn backed_tables(&self, conn: &mut dyn Connection, schema: &str) -> HashSet<String> {
        let mut backed = HashSet::new();
        match self.adapter.sequence_tables(conn, schema) {
            Ok(tables) => backed.extend(tables),
            Err(_err) => {
                trace_warn!(error = %_err, schema, "sequence probe failed");
            }
        }
        match self.adapter.auto_increment_tables(conn, schema) {
            Ok(tables) => backed.extend(tables),
            Err(_err) => {
                trace_warn!(error = %_err, schema, "auto-increment probe failed");
            }
        }
        backed
    }

    fn load_relations(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        kind: RelKind,
        backed: &HashSet<String>,
    ) -> Result<BTreeMap<String, Relation>> {
        let relkind = self.adapter.relkind(kind);

        let mut relations = BTreeMap::new();
        for table in self.adapter.tables(conn, schema, relkind)? {
            if self.options.ignores_table(&table.name) {
                continue;
            }
            let mut relation = self.load_relation(conn, schema, kind, table)?;
            relation.manual_primary_key = !backed.contains(relation.native_name());
            relations.insert(relation.native_name().to_string(), relation);
        }
        Ok(relations)
    }

    fn load_relation(
        &self,
        conn: &mut dyn Connection,
        schema: &str,
        kind: RelKind,
        table: RawTable,
    ) -> Result<Relation> {
        let names = &self.options.initialisms;
        let ctx = self.options.type_context(schema);
        let json_columns = self.options.json_column_types
            && matches!(
                self.adapter.dialect(),
                Dialect::PostgreSQL | Dialect::CockroachDB
            );

        let columns = self.adapter.columns(conn, schema, &table.name)?;
        let mut relation = Relation::new(names.singularize(&table.name), schema, kind, table);
        for column in columns {
            if self.options.ignores_field(&column.name) {
                continue;
            }
            let descriptor = if json_columns && is_json(&column.data_type) {
                column.name.as_str()
            } else {
                column.data_type.as_str()
            };
            let ty = self
                .adapter
                .resolve_type(&ctx, descriptor, column.nullable());
            relation.push_field(Field {
                name: names.to_camel(&column.name),
                ty,
                column,
            });
        }
        Ok(relation)
    }
}

fn is_json(data_type: &str) -> bool {
    matches!(data_type, "json" | "jsonb")
}

/// Camel-cased constant name with a redundant enum-name suffix removed:
/// `fiction_book_type` in `BookType` becomes `Fiction`.
pub fn enum_value_name(names: &Initialisms, enum_name: &str, value: &str) -> String {
    let name = names.to_camel(value);
    if name.len() > enum_name.len()
        && name.to_lowercase().ends_with(&enum_name.to_lowercase())
        && name.is_char_boundary(name.len() - enum_name.len())
    {
        return name[..name.len() - enum_name.len()].to_string();
    }
    name
}

/// Build the graph for `dialect` using the adapter registered for it.
pub fn load_schema(
    registry: &AdapterRegistry,
    dialect: Dialect,
    conn: &mut dyn Connection,
    options: &LoaderOptions,
) -> Result<SchemaGraph> {
    let adapter = registry.get(dialect)?;
    GraphBuilder::new(adapter, options).build(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_value_suffix_is_stripped() {
        let names = Initialisms::default();
        assert_eq!(enum_value_name(&names, "BookType", "fiction_book_type"), "Fiction");
        assert_eq!(enum_value_name(&names, "BookType", "FICTION"), "Fiction");
        // nothing would be left
        assert_eq!(enum_value_name(&names, "BookType", "book_type"), "BookType");
    }

    #[test]
    fn ignore_lists_are_case_insensitive() {
        let options = LoaderOptions {
            ignore_tables: vec!["Schema_Migrations".to_string()],
            ignore_fields: vec!["UPDATED_AT".to_string()],
            ..LoaderOptions::default()
        };
        assert!(options.ignores_table("schema_migrations"));
        assert!(options.ignores_field("updated_at"));
        assert!(!options.ignores_field("created_at"));
    }

    #[test]
    fn ignore_lists_fold_non_ascii() {
        let options = LoaderOptions {
            ignore_tables: vec!["ÉVÉNEMENTS".to_string()],
            ignore_fields: vec!["größe".to_string()],
            ..LoaderOptions::default()
        };
        assert!(options.ignores_table("événements"));
        assert!(options.ignores_field("GRÖßE"));
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Init < Phase::EnumsLoaded);
        assert!(Phase::Merged < Phase::ForeignKeysResolved);
        assert!(Phase::IndexesResolved < Phase::Done);
        assert_eq!(Phase::ForeignKeysResolved.to_string(), "foreign_keys_resolved");
    }
}
