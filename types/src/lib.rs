//! Shared type definitions for schemagraph
//!
//! This crate provides the vocabulary shared by the introspection engine and
//! anything that consumes its output:
//!
//! - [`Dialect`] - Database engine enum (SQLite, PostgreSQL, CockroachDB, MySQL, Oracle)
//! - [`RelKind`] / [`EscapeKind`] - Relation kinds and identifier quoting targets
//! - [`TypeMode`] / [`ForeignKeyMode`] - Presentation and accessor naming modes
//! - Raw catalog rows in the [`catalog`] module, as returned by backend adapters
//!
//! # Features
//!
//! - `std` - Standard library support (enabled by default)
//! - `alloc` - Allocator support for no_std environments
//! - `serde` - Enable serde serialization/deserialization

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(feature = "alloc", not(feature = "std")))]
extern crate alloc;

// Internal prelude for std/alloc compatibility
#[allow(unused_imports)]
pub(crate) mod alloc_prelude {
    #[cfg(feature = "std")]
    pub use std::{
        format,
        string::{String, ToString},
        vec::Vec,
    };

    #[cfg(all(feature = "alloc", not(feature = "std")))]
    pub use alloc::{
        format,
        string::{String, ToString},
        vec::Vec,
    };
}

pub mod catalog;
mod dialect;
mod mode;

pub use catalog::{EscapeKind, RelKind};
pub use dialect::{Dialect, DialectParseError};
pub use mode::{ForeignKeyMode, ParseModeError, TypeMode};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::catalog::{
        RawColumn, RawEnum, RawEnumValue, RawForeignKey, RawIndex, RawIndexColumn, RawProc,
        RawProcParam, RawTable,
    };
    pub use crate::{Dialect, EscapeKind, ForeignKeyMode, RelKind, TypeMode};
}
