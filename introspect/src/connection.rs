//! Driver seam
//!
//! Adapters never talk to a driver directly: they issue catalog SQL through
//! [`Connection`] and decode the loosely typed [`Row`]s it returns. Catalog
//! columns come back in whatever shape the engine prefers (`t`/`f`, `0`/`1`,
//! `YES`/`NO`, native booleans), so the typed getters are deliberately lenient.

use crate::error::DriverError;
use crate::trace::trace_query;

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row, addressed by column position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value, DriverError> {
        self.values.get(index).ok_or(DriverError::MissingColumn {
            index,
            width: self.values.len(),
        })
    }

    /// Text value; numbers and booleans are rendered, `NULL` is an error.
    pub fn text(&self, index: usize) -> Result<String, DriverError> {
        self.opt_text(index)?.ok_or(DriverError::Decode {
            index,
            expected: "text",
            found: "null",
        })
    }

    pub fn opt_text(&self, index: usize) -> Result<Option<String>, DriverError> {
        Ok(match self.get(index)? {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        })
    }

    pub fn int(&self, index: usize) -> Result<i64, DriverError> {
        let value = self.get(index)?;
        let err = || DriverError::Decode {
            index,
            expected: "integer",
            found: value.kind(),
        };
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Text(s) => s.trim().parse().map_err(|_| err()),
            _ => Err(err()),
        }
    }

    /// Boolean value; `NULL` reads as `false`.
    pub fn boolean(&self, index: usize) -> Result<bool, DriverError> {
        let value = self.get(index)?;
        match value {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "t" | "true" | "1" | "y" | "yes" => Ok(true),
                "f" | "false" | "0" | "n" | "no" | "" => Ok(false),
                _ => Err(DriverError::Decode {
                    index,
                    expected: "bool",
                    found: "text",
                }),
            },
            _ => Err(DriverError::Decode {
                index,
                expected: "bool",
                found: value.kind(),
            }),
        }
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// A live handle used for catalog reads and the transient view DDL.
///
/// Parameters are always bound as text; catalog SQL casts where the engine
/// needs another type.
pub trait Connection {
    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>, DriverError>;

    fn execute(&mut self, sql: &str) -> Result<(), DriverError>;
}

/// Run a catalog query and decode every row with `f`.
pub(crate) fn query_map<T>(
    conn: &mut dyn Connection,
    sql: &str,
    params: &[&str],
    f: impl Fn(&Row) -> Result<T, DriverError>,
) -> Result<Vec<T>, DriverError> {
    trace_query!(sql, params.len());
    conn.query(sql, params)?.iter().map(f).collect()
}

/// Run a catalog query expected to yield at most one row, returning its first column.
pub(crate) fn query_scalar(
    conn: &mut dyn Connection,
    sql: &str,
    params: &[&str],
) -> Result<Option<String>, DriverError> {
    trace_query!(sql, params.len());
    match conn.query(sql, params)?.first() {
        Some(row) => row.opt_text(0),
        None => Ok(None),
    }
}

// =============================================================================
// SQLite (rusqlite)
// =============================================================================

#[cfg(feature = "rusqlite")]
impl Connection for rusqlite::Connection {
    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>, DriverError> {
        use rusqlite::types::ValueRef;

        let mut stmt = self.prepare(sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(match row.get_ref(index)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(i) => Value::Int(i),
                    ValueRef::Real(f) => Value::Float(f),
                    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
                });
            }
            out.push(Row::new(values));
        }
        Ok(out)
    }

    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.execute_batch(sql)?;
        Ok(())
    }
}

// =============================================================================
// PostgreSQL / CockroachDB (postgres)
// =============================================================================

#[cfg(feature = "postgres-sync")]
impl Connection for postgres::Client {
    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>, DriverError> {
        use postgres::types::{ToSql, Type};

        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = postgres::Client::query(self, sql, &params)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut values = Vec::with_capacity(row.len());
            for (index, column) in row.columns().iter().enumerate() {
                let ty = column.type_();
                let value = if *ty == Type::BOOL {
                    row.try_get::<_, Option<bool>>(index)?.into()
                } else if *ty == Type::INT2 {
                    row.try_get::<_, Option<i16>>(index)?
                        .map_or(Value::Null, |v| Value::Int(v.into()))
                } else if *ty == Type::INT4 {
                    row.try_get::<_, Option<i32>>(index)?.into()
                } else if *ty == Type::INT8 {
                    row.try_get::<_, Option<i64>>(index)?.into()
                } else if *ty == Type::OID {
                    row.try_get::<_, Option<u32>>(index)?
                        .map_or(Value::Null, |v| Value::Int(v.into()))
                } else if *ty == Type::FLOAT4 {
                    row.try_get::<_, Option<f32>>(index)?
                        .map_or(Value::Null, |v| Value::Float(v.into()))
                } else if *ty == Type::FLOAT8 {
                    row.try_get::<_, Option<f64>>(index)?
                        .map_or(Value::Null, Value::Float)
                } else if *ty == Type::BYTEA {
                    row.try_get::<_, Option<Vec<u8>>>(index)?
                        .map_or(Value::Null, Value::Bytes)
                } else {
                    row.try_get::<_, Option<String>>(index)?.into()
                };
                values.push(value);
            }
            out.push(Row::new(values));
        }
        Ok(out)
    }

    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        postgres::Client::batch_execute(self, sql)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::from(vec![
            Value::from("users"),
            Value::from(3),
            Value::from("t"),
            Value::Null,
            Value::from("YES"),
            Value::from(0),
        ])
    }

    #[test]
    fn lenient_getters() {
        let row = row();
        assert_eq!(row.text(0).unwrap(), "users");
        assert_eq!(row.text(1).unwrap(), "3");
        assert_eq!(row.int(1).unwrap(), 3);
        assert!(row.boolean(2).unwrap());
        assert!(!row.boolean(3).unwrap());
        assert!(row.boolean(4).unwrap());
        assert!(!row.boolean(5).unwrap());
        assert_eq!(row.opt_text(3).unwrap(), None);
    }

    #[test]
    fn null_text_and_out_of_range_are_errors() {
        let row = row();
        assert!(matches!(
            row.text(3),
            Err(DriverError::Decode { index: 3, .. })
        ));
        assert!(matches!(
            row.get(9),
            Err(DriverError::MissingColumn { index: 9, width: 6 })
        ));
        assert!(matches!(row.int(0), Err(DriverError::Decode { .. })));
    }
}
