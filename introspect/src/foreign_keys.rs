//! Foreign-key resolution
//!
//! Cross-references raw foreign-key rows against the merged relation map.
//! Every row must land on an existing owning field and referenced field; a
//! miss means the catalog and the graph disagree and fails the build.

use crate::adapter::Adapter;
use crate::connection::Connection;
use crate::error::{Error, ForeignKeyMiss, Result, qualified};
use crate::ir::{FieldRef, ForeignKey, Locator, Relation, SchemaGraph};
use crate::loader::LoaderOptions;
use crate::names::Initialisms;
use schemagraph_types::ForeignKeyMode;
use schemagraph_types::catalog::RawForeignKey;
use std::collections::{BTreeMap, HashMap};

pub(crate) fn resolve(
    adapter: &dyn Adapter,
    conn: &mut dyn Connection,
    options: &LoaderOptions,
    graph: &mut SchemaGraph,
) -> Result<()> {
    let correct = adapter.capabilities().foreign_key_correction;

    let mut resolved: Vec<(String, Vec<ForeignKey>)> = Vec::with_capacity(graph.relations.len());
    for relation in graph.relations.values() {
        let mut rows = adapter.foreign_keys(conn, &graph.schema, relation.native_name())?;
        if correct {
            rows = adapter.correct_foreign_keys(rows);
        }
        let fks = rows
            .into_iter()
            .map(|raw| resolve_row(&graph.schema, &graph.relations, relation, raw))
            .collect::<Result<Vec<_>>>()?;
        resolved.push((relation.native_name().to_string(), fks));
    }

    name_accessors(
        &options.initialisms,
        options.foreign_key_mode,
        &graph.relations,
        &mut resolved,
    );

    for (relation_name, fks) in resolved {
        for (position, fk) in fks.iter().enumerate() {
            let key = unique_key(&graph.foreign_keys, &fk.name);
            graph.foreign_keys.insert(
                key,
                Locator {
                    relation: relation_name.clone(),
                    position,
                },
            );
        }
        if let Some(relation) = graph.relations.get_mut(&relation_name) {
            relation.foreign_keys = fks;
        }
    }
    Ok(())
}

fn resolve_row(
    schema: &str,
    relations: &BTreeMap<String, Relation>,
    relation: &Relation,
    mut raw: RawForeignKey,
) -> Result<ForeignKey> {
    if raw.name.is_empty() {
        raw.name = format!("{}_{}_fkey", relation.native_name(), raw.column);
    }
    let fail = |reason| Error::ForeignKey {
        relation: qualified(schema, relation.native_name()),
        constraint: raw.name.clone(),
        reason,
    };

    let position = relation
        .position_of(&raw.column)
        .ok_or_else(|| fail(ForeignKeyMiss::Column(raw.column.clone())))?;

    let referenced = relations
        .get(&raw.ref_table)
        .ok_or_else(|| fail(ForeignKeyMiss::RefRelation(raw.ref_table.clone())))?;

    let ref_position = match raw.ref_column.as_deref().filter(|c| !c.is_empty()) {
        Some(column) => referenced.position_of(column).ok_or_else(|| {
            fail(ForeignKeyMiss::RefColumn {
                relation: raw.ref_table.clone(),
                column: column.to_string(),
            })
        })?,
        None => referenced
            .primary_key
            .ok_or_else(|| fail(ForeignKeyMiss::NoPrimaryKey(raw.ref_table.clone())))?,
    };

    Ok(ForeignKey {
        name: raw.name.clone(),
        accessor: String::new(),
        field: FieldRef {
            relation: relation.native_name().to_string(),
            position,
        },
        ref_field: FieldRef {
            relation: referenced.native_name().to_string(),
            position: ref_position,
        },
        ref_type: referenced.name.clone(),
        raw,
    })
}

/// Fill in [`ForeignKey::accessor`] for every resolved key.
///
/// `Smart` needs the full set: it switches to `Field` naming for any owning
/// type that references the same type more than once.
fn name_accessors(
    names: &Initialisms,
    mode: ForeignKeyMode,
    relations: &BTreeMap<String, Relation>,
    resolved: &mut [(String, Vec<ForeignKey>)],
) {
    let owner_type = |relation: &str| relations.get(relation).map(|r| r.name.clone());

    let mut pairs: HashMap<(Option<String>, String), usize> = HashMap::new();
    for (relation, fks) in resolved.iter() {
        for fk in fks {
            *pairs
                .entry((owner_type(relation), fk.ref_type.clone()))
                .or_default() += 1;
        }
    }

    for (relation, fks) in resolved.iter_mut() {
        let owner = owner_type(relation);
        for fk in fks.iter_mut() {
            let effective = match mode {
                ForeignKeyMode::Smart => {
                    let shared = pairs
                        .get(&(owner.clone(), fk.ref_type.clone()))
                        .is_some_and(|&n| n > 1);
                    if shared {
                        ForeignKeyMode::Field
                    } else {
                        ForeignKeyMode::Parent
                    }
                }
                other => other,
            };
            let field_name = relations
                .get(relation.as_str())
                .and_then(|r| r.fields.get(fk.field.position))
                .map(|f| f.name.as_str())
                .unwrap_or_default();
            fk.accessor = accessor(names, effective, fk, field_name);
        }
    }
}

fn accessor(
    names: &Initialisms,
    mode: ForeignKeyMode,
    fk: &ForeignKey,
    field_name: &str,
) -> String {
    match mode {
        ForeignKeyMode::Parent | ForeignKeyMode::Smart => fk.ref_type.clone(),
        ForeignKeyMode::Field => format!("{}By{field_name}", fk.ref_type),
        ForeignKeyMode::Key => format!("{}By{}", fk.ref_type, names.to_camel(&fk.name)),
    }
}

/// `name` plus a random suffix, retried until it is not already a key.
fn unique_key<V>(map: &BTreeMap<String, V>, name: &str) -> String {
    loop {
        let key = format!("{name}_{}", rand::random::<u32>());
        if !map.contains_key(&key) {
            return key;
        }
    }
}
