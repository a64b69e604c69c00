//! Error types for introspection and graph resolution

use schemagraph_types::{Dialect, ParseModeError};
use std::path::PathBuf;

/// Errors raised by a [`Connection`](crate::Connection) implementation.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[cfg(feature = "rusqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "postgres-sync")]
    #[error(transparent)]
    Postgres(#[from] postgres::Error),

    #[error("column {index} out of range for row of width {width}")]
    MissingColumn { index: usize, width: usize },

    #[error("column {index}: cannot read {found} as {expected}")]
    Decode {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Message(String),
}

/// Why a foreign key could not be cross-referenced against the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForeignKeyMiss {
    #[error("owning column '{0}' not found")]
    Column(String),

    #[error("referenced relation '{0}' not found")]
    RefRelation(String),

    #[error("referenced column '{column}' not found in '{relation}'")]
    RefColumn { relation: String, column: String },

    #[error("referenced relation '{0}' has no primary key to fall back to")]
    NoPrimaryKey(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // configuration
    #[error(transparent)]
    Mode(#[from] ParseModeError),

    #[error("invalid initialism {0:?}: must be at least 2 characters")]
    InvalidInitialism(String),

    #[error("unknown engine '{0}'")]
    UnknownEngine(String),

    #[error("no adapter registered for {0}")]
    NoAdapter(Dialect),

    #[error("config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    ConfigIo(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    ConfigParse(PathBuf, #[source] toml::de::Error),

    // catalog access
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("{dialect} adapter does not support {capability}")]
    Unsupported {
        dialect: Dialect,
        capability: &'static str,
    },

    // consistency
    #[error("could not resolve foreign key {constraint} on {relation}: {reason}")]
    ForeignKey {
        relation: String,
        constraint: String,
        #[source]
        reason: ForeignKeyMiss,
    },

    #[error("could not convert {relation} index {index} column {ordinal} to int")]
    IndexOrdinal {
        relation: String,
        index: String,
        ordinal: String,
    },

    #[error("no column order found for {relation} index {index}")]
    IndexOrder { relation: String, index: String },

    #[error("could not find {relation} index {index} column id {cid}")]
    IndexColumn {
        relation: String,
        index: String,
        cid: i64,
    },

    #[error("{relation} index {index} references unknown field {column}")]
    IndexField {
        relation: String,
        index: String,
        column: String,
    },

    // ad-hoc queries
    #[error("could not find the schema of view {view}")]
    ViewSchema { view: String },

    #[error("invalid query parameter {0:?}")]
    QueryParam(String),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// Schema-qualified relation name as used in error messages (`public.users`).
pub(crate) fn qualified(schema: &str, relation: &str) -> String {
    if schema.is_empty() {
        relation.to_string()
    } else {
        format!("{schema}.{relation}")
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_errors_identify_relation_and_index() {
        let err = Error::IndexColumn {
            relation: qualified("public", "users"),
            index: "users_email_idx".to_string(),
            cid: 7,
        };
        assert_eq!(
            err.to_string(),
            "could not find public.users index users_email_idx column id 7"
        );

        let err = Error::IndexOrdinal {
            relation: qualified("", "users"),
            index: "ix".to_string(),
            ordinal: "x".to_string(),
        };
        assert_eq!(err.to_string(), "could not convert users index ix column x to int");
    }

    #[test]
    fn foreign_key_error_carries_reason() {
        let err = Error::ForeignKey {
            relation: qualified("public", "books"),
            constraint: "books_author_id_fkey".to_string(),
            reason: ForeignKeyMiss::Column("author_id".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "could not resolve foreign key books_author_id_fkey on public.books: owning column 'author_id' not found"
        );
    }
}
