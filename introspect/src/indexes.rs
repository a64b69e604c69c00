//! Index resolution
//!
//! Index fields are ordered by the adapter's ordinal string (`"3 1"`), never by
//! the order the catalog happens to list index columns in.

use crate::adapter::Adapter;
use crate::connection::Connection;
use crate::error::{Error, Result, qualified};
use crate::ir::{Index, Locator, Relation, SchemaGraph};
use crate::loader::LoaderOptions;
use crate::names::{Initialisms, plural};
use schemagraph_types::catalog::{RawIndex, RawIndexColumn};

pub(crate) fn resolve(
    adapter: &dyn Adapter,
    conn: &mut dyn Connection,
    options: &LoaderOptions,
    graph: &mut SchemaGraph,
) -> Result<()> {
    let synthesize = adapter.capabilities().primary_key_index_synthesis;
    let schema = graph.schema.as_str();

    let mut resolved: Vec<(String, Vec<Index>)> = Vec::with_capacity(graph.relations.len());
    for relation in graph.relations.values() {
        let table = relation.native_name();
        let mut indexes = Vec::new();
        let mut primary_loaded = false;

        for raw in adapter.indexes(conn, schema, table)? {
            primary_loaded |= raw.backs_primary_key();

            let columns = adapter.index_columns(conn, schema, table, &raw.name)?;
            let order = adapter.index_column_order(conn, schema, table, &raw.name)?;
            let fields = order_fields(schema, relation, &raw.name, &columns, &order)?;
            let index_accessor = accessor(
                &options.initialisms,
                options.use_index_names,
                relation,
                &raw,
                &fields,
            );

            indexes.push(Index {
                name: raw.name.clone(),
                accessor: index_accessor,
                fields,
                unique: raw.is_unique,
                primary: raw.backs_primary_key(),
                synthesized: false,
                raw,
            });
        }

        if synthesize && !primary_loaded {
            indexes.extend(primary_key_index(relation));
        }
        resolved.push((table.to_string(), indexes));
    }

    for (relation_name, indexes) in resolved {
        for (position, index) in indexes.iter().enumerate() {
            let key = if index.synthesized {
                index.name.clone()
            } else {
                format!("{relation_name}_{}", index.name)
            };
            graph.indexes.insert(
                key,
                Locator {
                    relation: relation_name.clone(),
                    position,
                },
            );
        }
        if let Some(relation) = graph.relations.get_mut(&relation_name) {
            relation.indexes = indexes;
        }
    }
    Ok(())
}

/// Field positions of an index in ordinal order.
///
/// Each ordinal is a column id that must match one of `columns`, whose native
/// name must in turn match a loaded field. An order naming no columns at all
/// is rejected.
pub fn order_fields(
    schema: &str,
    relation: &Relation,
    index: &str,
    columns: &[RawIndexColumn],
    order: &str,
) -> Result<Vec<usize>> {
    let relation_name = || qualified(schema, relation.native_name());

    if order.trim().is_empty() {
        return Err(Error::IndexOrdinal {
            relation: relation_name(),
            index: index.to_string(),
            ordinal: order.to_string(),
        });
    }

    order
        .split_whitespace()
        .map(|ordinal| {
            let cid: i64 = ordinal.parse().map_err(|_| Error::IndexOrdinal {
                relation: relation_name(),
                index: index.to_string(),
                ordinal: ordinal.to_string(),
            })?;
            let column = columns.iter().find(|c| c.cid == cid).ok_or_else(|| Error::IndexColumn {
                relation: relation_name(),
                index: index.to_string(),
                cid,
            })?;
            relation.position_of(&column.name).ok_or_else(|| Error::IndexField {
                relation: relation_name(),
                index: index.to_string(),
                column: column.name.clone(),
            })
        })
        .collect()
}

/// Implicit unique primary index for engines that never list one, named
/// `<table>_<pkcolumn>_pkey`.
fn primary_key_index(relation: &Relation) -> Option<Index> {
    let position = relation.primary_key?;
    let pk = relation.fields.get(position)?;
    let name = format!("{}_{}_pkey", relation.native_name(), pk.column.name);
    Some(Index {
        accessor: format!("{}By{}", relation.name, pk.name),
        fields: vec![position],
        unique: true,
        primary: true,
        synthesized: true,
        raw: RawIndex {
            name: name.clone(),
            is_unique: true,
            is_primary: true,
            origin: None,
        },
        name,
    })
}

/// `<Type>By<Fields>` for unique indexes, `<Types>By<Fields>` otherwise.
fn accessor(
    names: &Initialisms,
    use_index_names: bool,
    relation: &Relation,
    raw: &RawIndex,
    fields: &[usize],
) -> String {
    let mut accessor = if raw.is_unique {
        relation.name.clone()
    } else {
        plural(&relation.name)
    };
    accessor.push_str("By");

    let index_name = raw.name.to_lowercase();
    if use_index_names && !index_name.is_empty() && index_name != "primary" {
        accessor.push_str(&names.to_camel(&index_name));
    } else {
        for field in fields.iter().filter_map(|&i| relation.fields.get(i)) {
            accessor.push_str(&field.name);
        }
    }
    accessor
}
