//! Configuration for schemagraph
//!
//! Loaded from `schemagraph.toml`:
//!
//! ```toml
//! engine = "postgres"
//! schema = "public"
//! typeMode = "pgtype"
//! ignoreTables = ["schema_migrations"]
//! initialisms = ["ISBN"]
//! foreignKeyMode = "smart"
//! ```

use crate::error::{Error, Result};
use crate::loader::LoaderOptions;
use crate::names::Initialisms;
use schemagraph_types::{Dialect, ForeignKeyMode, TypeMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name
pub const CONFIG_FILE: &str = "schemagraph.toml";

// ============================================================================
// Config
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Engine name or alias (`pg`, `crdb`, `sqlite3`, ...).
    pub engine: String,

    #[serde(default)]
    pub schema: Option<String>,

    #[serde(default)]
    type_mode: Option<String>,

    #[serde(default)]
    pub ignore_tables: Vec<String>,

    #[serde(default)]
    pub ignore_fields: Vec<String>,

    /// Added to the common initialism set.
    #[serde(default)]
    pub initialisms: Vec<String>,

    #[serde(default)]
    foreign_key_mode: Option<String>,

    #[serde(default)]
    pub use_index_names: bool,

    #[serde(default = "default_int32")]
    pub int32_type: String,

    #[serde(default = "default_uint32")]
    pub uint32_type: String,

    #[serde(default)]
    pub json_column_types: bool,
}

fn default_int32() -> String { "i32".into() }
fn default_uint32() -> String { "u32".into() }

// ============================================================================
// Config implementation
// ============================================================================

impl Config {
    /// Load from default config file
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ConfigNotFound(path.into())
            } else {
                Error::ConfigIo(path.into(), e)
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parse config text that did not come from a file
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(PathBuf::from(path), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Everything a bad value could break is checked here, so that a loaded
    /// config always converts into [`LoaderOptions`].
    fn validate(&self) -> Result<()> {
        self.dialect()?;
        self.type_mode()?;
        self.foreign_key_mode()?;
        self.initialism_set()?;
        Ok(())
    }

    pub fn dialect(&self) -> Result<Dialect> {
        Dialect::parse(&self.engine).ok_or_else(|| Error::UnknownEngine(self.engine.clone()))
    }

    pub fn type_mode(&self) -> Result<TypeMode> {
        Ok(match &self.type_mode {
            Some(mode) => mode.parse()?,
            None => TypeMode::default(),
        })
    }

    pub fn foreign_key_mode(&self) -> Result<ForeignKeyMode> {
        Ok(match &self.foreign_key_mode {
            Some(mode) => mode.parse()?,
            None => ForeignKeyMode::default(),
        })
    }

    fn initialism_set(&self) -> Result<Initialisms> {
        let mut set = Initialisms::default();
        set.extend(&self.initialisms)?;
        Ok(set)
    }

    /// Runtime options for [`GraphBuilder`](crate::GraphBuilder).
    pub fn loader_options(&self) -> Result<LoaderOptions> {
        Ok(LoaderOptions {
            schema: self.schema.clone(),
            mode: self.type_mode()?,
            initialisms: self.initialism_set()?,
            ignore_tables: self.ignore_tables.clone(),
            ignore_fields: self.ignore_fields.clone(),
            foreign_key_mode: self.foreign_key_mode()?,
            use_index_names: self.use_index_names,
            int32_type: self.int32_type.clone(),
            uint32_type: self.uint32_type.clone(),
            json_column_types: self.json_column_types,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal() {
        let cfg = Config::from_toml_str(r#"engine = "sqlite3""#).unwrap();
        assert_eq!(cfg.dialect().unwrap(), Dialect::SQLite);

        let opts = cfg.loader_options().unwrap();
        assert_eq!(opts.schema, None);
        assert_eq!(opts.mode, TypeMode::Standard);
        assert_eq!(opts.foreign_key_mode, ForeignKeyMode::Smart);
        assert_eq!(opts.int32_type, "i32");
        assert_eq!(opts.uint32_type, "u32");
    }

    #[test]
    fn full() {
        let cfg = Config::from_toml_str(
            r#"
            engine = "crdb"
            schema = "app"
            typeMode = "pgtype"
            ignoreTables = ["schema_migrations"]
            ignoreFields = ["updated_at"]
            initialisms = ["ISBN"]
            foreignKeyMode = "key"
            useIndexNames = true
            int32Type = "i64"
            jsonColumnTypes = true
        "#,
        )
        .unwrap();
        assert_eq!(cfg.dialect().unwrap(), Dialect::CockroachDB);

        let opts = cfg.loader_options().unwrap();
        assert_eq!(opts.schema.as_deref(), Some("app"));
        assert_eq!(opts.mode, TypeMode::Hybrid);
        assert_eq!(opts.foreign_key_mode, ForeignKeyMode::Key);
        assert!(opts.use_index_names && opts.json_column_types);
        assert_eq!(opts.int32_type, "i64");
        assert!(opts.ignores_table("SCHEMA_MIGRATIONS"));
        assert_eq!(opts.initialisms.to_camel("book_isbn"), "BookISBN");
        // common set is kept
        assert_eq!(opts.initialisms.to_camel("author_id"), "AuthorID");
    }

    #[test]
    fn bad_values_fail_at_load() {
        assert!(matches!(
            Config::from_toml_str(r#"engine = "db2""#),
            Err(Error::UnknownEngine(e)) if e == "db2"
        ));
        assert!(matches!(
            Config::from_toml_str("engine = \"pg\"\ntypeMode = \"nullable\""),
            Err(Error::Mode(_))
        ));
        assert!(matches!(
            Config::from_toml_str("engine = \"pg\"\nforeignKeyMode = \"fk\""),
            Err(Error::Mode(_))
        ));
        assert!(matches!(
            Config::from_toml_str("engine = \"pg\"\ninitialisms = [\"X\"]"),
            Err(Error::InvalidInitialism(i)) if i == "X"
        ));
        assert!(matches!(
            Config::from_toml_str("schema = \"public\""),
            Err(Error::ConfigParse(path, _)) if path == Path::new("<inline>")
        ));
    }

    #[test]
    fn missing_file() {
        let path = Path::new("does/not/exist/schemagraph.toml");
        assert!(matches!(
            Config::load_from(path),
            Err(Error::ConfigNotFound(p)) if p == path
        ));
    }
}
