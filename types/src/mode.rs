//! Presentation and naming modes
//!
//! Both modes are single enumerated configuration values. Unrecognized mode
//! strings are rejected with [`ParseModeError`].

#[allow(unused_imports)]
use crate::alloc_prelude::*;

/// Target type family produced by the type mapping resolver
///
/// | Mode       | Non-null column      | Nullable column            |
/// |------------|----------------------|----------------------------|
/// | `Standard` | plain type           | `Option<T>`                |
/// | `Full`     | driver wrapper       | driver wrapper             |
/// | `Pointer`  | internal repr        | `Option<Box<internal>>`    |
/// | `Hybrid`   | internal repr        | driver wrapper             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "lowercase", try_from = "String")
)]
pub enum TypeMode {
    #[default]
    Standard,
    Full,
    Pointer,
    Hybrid,
}

impl TypeMode {
    /// Parse a mode string (case-insensitive)
    ///
    /// Accepted spellings:
    /// - Standard: `"std"`, `"default"`, `"standard"`
    /// - Full: `"full"`, `"pgtype-full"`
    /// - Pointer: `"pointer"`
    /// - Hybrid: `"hybrid"`, `"pgtype"`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let is = |names: &[&str]| names.iter().any(|n| s.eq_ignore_ascii_case(n));

        if is(&["std", "default", "standard"]) {
            Some(Self::Standard)
        } else if is(&["full", "pgtype-full"]) {
            Some(Self::Full)
        } else if is(&["pointer"]) {
            Some(Self::Pointer)
        } else if is(&["hybrid", "pgtype"]) {
            Some(Self::Hybrid)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "std",
            Self::Full => "full",
            Self::Pointer => "pointer",
            Self::Hybrid => "hybrid",
        }
    }
}

impl core::fmt::Display for TypeMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for TypeMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseModeError::new("type mode", s))
    }
}

impl TryFrom<String> for TypeMode {
    type Error = ParseModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How foreign key accessors are named
///
/// - `Parent`: the referenced type name (`Author`)
/// - `Field`: referenced type + `By` + owning field (`AuthorByAuthorID`)
/// - `Key`: referenced type + `By` + constraint name (`AuthorByBooksAuthorIDFkey`)
/// - `Smart`: `Parent`, unless another key on the same type targets the same
///   referenced type, then `Field`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "lowercase", try_from = "String")
)]
pub enum ForeignKeyMode {
    #[default]
    Smart,
    Parent,
    Field,
    Key,
}

impl ForeignKeyMode {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("smart") || s.eq_ignore_ascii_case("default") {
            Some(Self::Smart)
        } else if s.eq_ignore_ascii_case("parent") {
            Some(Self::Parent)
        } else if s.eq_ignore_ascii_case("field") {
            Some(Self::Field)
        } else if s.eq_ignore_ascii_case("key") {
            Some(Self::Key)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Parent => "parent",
            Self::Field => "field",
            Self::Key => "key",
        }
    }
}

impl core::fmt::Display for ForeignKeyMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ForeignKeyMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseModeError::new("foreign key mode", s))
    }
}

impl TryFrom<String> for ForeignKeyMode {
    type Error = ParseModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error returned when a mode string is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

impl ParseModeError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }

    /// Which setting was being parsed (`"type mode"`, `"foreign key mode"`)
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected input
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl core::fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid {} '{}'", self.kind, self.value)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseModeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mode_aliases() {
        assert_eq!(TypeMode::parse("std"), Some(TypeMode::Standard));
        assert_eq!(TypeMode::parse("DEFAULT"), Some(TypeMode::Standard));
        assert_eq!(TypeMode::parse("pgtype-full"), Some(TypeMode::Full));
        assert_eq!(TypeMode::parse("pointer"), Some(TypeMode::Pointer));
        assert_eq!(TypeMode::parse("pgtype"), Some(TypeMode::Hybrid));
        assert_eq!(TypeMode::parse("hybrid"), Some(TypeMode::Hybrid));
    }

    #[test]
    fn unknown_type_mode_is_rejected() {
        let err = "nullable".parse::<TypeMode>().unwrap_err();
        assert_eq!(err.kind(), "type mode");
        assert_eq!(err.value(), "nullable");
        assert_eq!(err.to_string(), "invalid type mode 'nullable'");
    }

    #[test]
    fn foreign_key_mode_parse() {
        assert_eq!("smart".parse(), Ok(ForeignKeyMode::Smart));
        assert_eq!("Parent".parse(), Ok(ForeignKeyMode::Parent));
        assert_eq!("field".parse(), Ok(ForeignKeyMode::Field));
        assert_eq!("key".parse(), Ok(ForeignKeyMode::Key));
        assert!("fk".parse::<ForeignKeyMode>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn modes_deserialize_through_aliases() {
        let mode: TypeMode = serde_json::from_str("\"pgtype\"").unwrap();
        assert_eq!(mode, TypeMode::Hybrid);
        assert!(serde_json::from_str::<TypeMode>("\"bogus\"").is_err());
        assert_eq!(serde_json::to_string(&TypeMode::Pointer).unwrap(), "\"pointer\"");
    }
}
