//! Unified database engine enum
//!
//! Single source of truth for engine identification, shared by the adapter
//! registry, the configuration loader and the resolved graph.

/// Database engine whose catalog is being introspected
///
/// Each engine has its own placeholder syntax, relation-kind encoding and
/// native type vocabulary; the matching backend adapter knows the details.
///
/// # Examples
///
/// ```
/// use schemagraph_types::Dialect;
///
/// let dialect = Dialect::PostgreSQL;
/// assert!(dialect.uses_numbered_placeholders());
///
/// let sqlite = Dialect::SQLite;
/// assert!(!sqlite.uses_numbered_placeholders());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// SQLite - uses `?` positional placeholders
    ///
    /// Compatible with: rusqlite
    #[default]
    SQLite,

    /// PostgreSQL - uses `$1, $2, ...` numbered placeholders
    ///
    /// Compatible with: postgres
    PostgreSQL,

    /// CockroachDB - PostgreSQL wire protocol and catalog, with its own quirks
    ///
    /// Compatible with: postgres
    CockroachDB,

    /// MySQL - uses `?` positional placeholders
    MySQL,

    /// Oracle - uses `:1, :2, ...` numbered placeholders
    Oracle,
}

impl Dialect {
    /// All engines, in registry order.
    pub const ALL: [Dialect; 5] = [
        Dialect::SQLite,
        Dialect::PostgreSQL,
        Dialect::CockroachDB,
        Dialect::MySQL,
        Dialect::Oracle,
    ];

    /// Returns `true` if this dialect uses numbered placeholders
    /// (`$1, $2, ...` or `:1, :2, ...`)
    #[inline]
    #[must_use]
    pub const fn uses_numbered_placeholders(&self) -> bool {
        matches!(
            self,
            Dialect::PostgreSQL | Dialect::CockroachDB | Dialect::Oracle
        )
    }

    /// Parse a dialect from a string (case-insensitive)
    ///
    /// Supports various common aliases:
    /// - SQLite: `"sqlite"`, `"sqlite3"`, `"file"`
    /// - PostgreSQL: `"postgresql"`, `"postgres"`, `"pg"`, `"pgsql"`
    /// - CockroachDB: `"cockroachdb"`, `"cockroach"`, `"crdb"`
    /// - MySQL: `"mysql"`, `"mariadb"`, `"maria"`
    /// - Oracle: `"oracle"`, `"ora"`, `"oci8"`
    ///
    /// # Examples
    ///
    /// ```
    /// use schemagraph_types::Dialect;
    ///
    /// assert_eq!(Dialect::parse("sqlite3"), Some(Dialect::SQLite));
    /// assert_eq!(Dialect::parse("crdb"), Some(Dialect::CockroachDB));
    /// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let is = |names: &[&str]| names.iter().any(|n| s.eq_ignore_ascii_case(n));

        if is(&["sqlite", "sqlite3", "file"]) {
            Some(Dialect::SQLite)
        } else if is(&["postgresql", "postgres", "pg", "pgsql"]) {
            Some(Dialect::PostgreSQL)
        } else if is(&["cockroachdb", "cockroach", "crdb"]) {
            Some(Dialect::CockroachDB)
        } else if is(&["mysql", "mariadb", "maria"]) {
            Some(Dialect::MySQL)
        } else if is(&["oracle", "ora", "oci8"]) {
            Some(Dialect::Oracle)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::CockroachDB => "cockroachdb",
            Dialect::MySQL => "mysql",
            Dialect::Oracle => "oracle",
        }
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectParseError;

impl core::fmt::Display for DialectParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown dialect")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DialectParseError {}
