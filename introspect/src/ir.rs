//! Resolved schema graph
//!
//! The output of a build: every relation owns its fields, and foreign keys and
//! indexes point at fields through [`FieldRef`] positions instead of sharing
//! them. The graph is only handed out once fully resolved and is read-only
//! from then on.

use crate::resolve::ResolvedType;
use schemagraph_types::Dialect;
use schemagraph_types::catalog::{
    RawColumn, RawEnumValue, RawForeignKey, RawIndex, RawProc, RawTable, RelKind,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// A column of a relation, with its resolved target type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Normalized field name (`author_id` → `AuthorID`).
    pub name: String,
    pub ty: ResolvedType,
    pub column: RawColumn,
}

impl Field {
    /// Native column name.
    pub fn column_name(&self) -> &str {
        &self.column.name
    }
}

/// Position of a field inside a relation, keyed by the relation's native name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldRef {
    pub relation: String,
    pub position: usize,
}

/// Position of a foreign key or index inside its relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Locator {
    pub relation: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKey {
    /// Constraint name, generated as `<table>_<column>_fkey` when the catalog has none.
    pub name: String,
    /// Accessor name derived from the configured [`ForeignKeyMode`](schemagraph_types::ForeignKeyMode).
    pub accessor: String,
    pub field: FieldRef,
    pub ref_field: FieldRef,
    /// Normalized name of the referenced relation.
    pub ref_type: String,
    pub raw: RawForeignKey,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Index {
    pub name: String,
    /// Lookup function name, e.g. `BookByISBN` or `BooksByAuthorID`.
    pub accessor: String,
    /// Field positions in index order.
    pub fields: Vec<usize>,
    pub unique: bool,
    pub primary: bool,
    /// Added by the builder because the catalog did not report a primary key index.
    pub synthesized: bool,
    pub raw: RawIndex,
}

/// A table, a view, or a query-derived type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    /// Normalized type name (`book_tags` → `BookTag`).
    pub name: String,
    pub schema: String,
    pub kind: RelKind,
    pub table: RawTable,
    pub fields: Vec<Field>,
    /// Last field flagged as primary key.
    pub primary_key: Option<usize>,
    /// Every field flagged as primary key, in column order.
    pub primary_key_fields: Vec<usize>,
    /// No sequence or auto-increment backs the primary key.
    pub manual_primary_key: bool,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
    pub comment: Option<String>,
}

impl Relation {
    pub(crate) fn new(name: String, schema: &str, kind: RelKind, table: RawTable) -> Self {
        Self {
            name,
            schema: schema.to_string(),
            kind,
            comment: table.comment.clone(),
            table,
            fields: Vec::new(),
            primary_key: None,
            primary_key_fields: Vec::new(),
            manual_primary_key: false,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Native relation name.
    pub fn native_name(&self) -> &str {
        &self.table.name
    }

    pub(crate) fn push_field(&mut self, field: Field) {
        let position = self.fields.len();
        if field.column.is_primary_key {
            self.primary_key_fields.push(position);
            self.primary_key = Some(position);
        }
        self.fields.push(field);
    }

    /// Position of the field for native column `column`.
    pub fn position_of(&self, column: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.column.name == column)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.column.name == column)
    }

    pub fn primary_key_field(&self) -> Option<&Field> {
        self.primary_key.and_then(|i| self.fields.get(i))
    }

    /// Fields of `index`, in index order.
    pub fn index_fields<'a>(&'a self, index: &'a Index) -> impl Iterator<Item = &'a Field> + 'a {
        index.fields.iter().filter_map(|&i| self.fields.get(i))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    /// Constant name, with a redundant enum-name suffix removed.
    pub name: String,
    pub raw: RawEnumValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enum {
    pub name: String,
    pub native_name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcParam {
    /// Positional name: `v0`, `v1`, ...
    pub name: String,
    pub ty: ResolvedType,
    pub native_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proc {
    pub name: String,
    pub params: Vec<ProcParam>,
    pub return_type: ResolvedType,
    pub raw: RawProc,
}

impl Proc {
    /// Native parameter types joined as in a SQL signature: `integer, text`.
    pub fn native_signature(&self) -> String {
        self.params
            .iter()
            .map(|p| p.native_type.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The fully resolved entity graph of one schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaGraph {
    pub(crate) schema: String,
    pub(crate) dialect: Dialect,
    pub(crate) enums: Vec<Enum>,
    pub(crate) procs: Vec<Proc>,
    pub(crate) relations: BTreeMap<String, Relation>,
    pub(crate) foreign_keys: BTreeMap<String, Locator>,
    pub(crate) indexes: BTreeMap<String, Locator>,
}

impl SchemaGraph {
    pub(crate) fn new(schema: String, dialect: Dialect) -> Self {
        Self {
            schema,
            dialect,
            enums: Vec::new(),
            procs: Vec::new(),
            relations: BTreeMap::new(),
            foreign_keys: BTreeMap::new(),
            indexes: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn enums(&self) -> &[Enum] {
        &self.enums
    }

    pub fn procs(&self) -> &[Proc] {
        &self.procs
    }

    /// Relations keyed by native name, in name order.
    pub fn relations(&self) -> &BTreeMap<String, Relation> {
        &self.relations
    }

    pub fn relation(&self, native_name: &str) -> Option<&Relation> {
        self.relations.get(native_name)
    }

    pub fn field(&self, field: &FieldRef) -> Option<&Field> {
        self.relations.get(&field.relation)?.fields.get(field.position)
    }

    /// Every foreign key of the schema.
    ///
    /// Keys are constraint names with a random suffix so that identically
    /// named constraints on different relations do not overwrite each other;
    /// the suffix never appears in [`ForeignKey::name`].
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&str, &ForeignKey)> {
        self.foreign_keys
            .iter()
            .filter_map(|(key, loc)| Some((key.as_str(), self.locate_foreign_key(loc)?)))
    }

    /// Every index of the schema, keyed `<table>_<index>`.
    pub fn indexes(&self) -> impl Iterator<Item = (&str, &Index)> {
        self.indexes
            .iter()
            .filter_map(|(key, loc)| Some((key.as_str(), self.locate_index(loc)?)))
    }

    pub fn index(&self, key: &str) -> Option<&Index> {
        self.locate_index(self.indexes.get(key)?)
    }

    fn locate_foreign_key(&self, loc: &Locator) -> Option<&ForeignKey> {
        self.relations.get(&loc.relation)?.foreign_keys.get(loc.position)
    }

    fn locate_index(&self, loc: &Locator) -> Option<&Index> {
        self.relations.get(&loc.relation)?.indexes.get(loc.position)
    }
}
