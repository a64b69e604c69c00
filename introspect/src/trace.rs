//! Tracing utilities for catalog queries and builder phases.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// trace_query!(queries::TABLES_QUERY, params.len());
/// ```
macro_rules! trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, params = $param_count, "schemagraph.query");
    };
}

/// Emit an info-level tracing event when the graph builder enters a phase.
///
/// ```ignore
/// trace_phase!(Phase::TablesLoaded, schema);
/// ```
macro_rules! trace_phase {
    ($phase:expr, $schema:expr) => {
        #[cfg(feature = "tracing")]
        tracing::info!(phase = %$phase, schema = %$schema, "schemagraph.phase");
    };
}

/// Emit a warn-level event for a failure that is logged and then ignored.
macro_rules! trace_warn {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)+);
    };
}

pub(crate) use {trace_phase, trace_query, trace_warn};
