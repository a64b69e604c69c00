//! Raw catalog rows
//!
//! These are the engine-neutral shapes that backend adapters decode their
//! catalog queries into. Names are native (unnormalized) identifiers; the
//! graph builder is responsible for normalization and cross-referencing.

#[allow(unused_imports)]
use crate::alloc_prelude::*;

/// Relation kind, encoded per engine by the adapter (`"r"`, `"table"`, `"BASE TABLE"`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RelKind {
    #[default]
    Table,
    View,
}

impl RelKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
        }
    }
}

impl core::fmt::Display for RelKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an identifier being quoted refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeKind {
    Schema,
    Table,
    Column,
}

/// Enum type row
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawEnum {
    pub name: String,
}

/// Enum label row, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawEnumValue {
    pub value: String,
    pub const_value: i64,
}

/// Stored procedure / function row
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawProc {
    pub name: String,
    pub return_type: String,
}

/// Procedure parameter row; only the native type is portable across engines
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawProcParam {
    pub param_type: String,
}

/// Table or view row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawTable {
    pub name: String,
    /// Native relation-kind string the row was listed under
    pub kind: String,
    pub comment: Option<String>,
}

/// Column row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawColumn {
    /// 1-based source ordinal
    pub ordinal: i64,
    pub name: String,
    /// Native type descriptor, e.g. `character varying(255)` or `integer[]`
    pub data_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
    pub comment: Option<String>,
}

impl RawColumn {
    #[inline]
    #[must_use]
    pub const fn nullable(&self) -> bool {
        !self.not_null
    }
}

/// Foreign key row, one per referencing column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawForeignKey {
    /// Constraint name; empty when the engine does not name constraints
    pub name: String,
    pub column: String,
    pub ref_table: String,
    /// `None` when the catalog does not report the referenced column
    pub ref_column: Option<String>,
    pub on_update: Option<String>,
    pub on_delete: Option<String>,
}

/// Index row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawIndex {
    pub name: String,
    pub is_unique: bool,
    pub is_primary: bool,
    /// Creation origin where the engine reports one (SQLite: `c`, `u`, `pk`)
    pub origin: Option<String>,
}

impl RawIndex {
    /// Whether this index backs the primary key
    #[must_use]
    pub fn backs_primary_key(&self) -> bool {
        self.is_primary || self.origin.as_deref() == Some("pk")
    }
}

/// Index column row; unordered, matched against the ordinal string by `cid`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawIndexColumn {
    pub seq_no: i64,
    pub cid: i64,
    pub name: String,
}
