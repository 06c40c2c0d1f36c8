//! # Insert Payloads
//!
//! A `Payload` is an ordered mapping from column name to bound value. Column
//! order is insertion order and decides both the column list and the
//! placeholder order of the rendered statement.
//!
//! Shape rules are enforced where values are constructed:
//! - `ColumnName::new` rejects empty names
//! - `Value` can only hold scalars and null
//! - emptiness is checked by `Payload::ensure_not_empty` right before use
//!
//! Payloads arriving from an untyped boundary (`serde_json::Value`) go through
//! `Payload::try_from_json`, which applies the same rules at runtime.

use crate::error::{DbError, DbResult};
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

/// A validated, non-empty column name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ColumnName(String);

impl ColumnName {
    pub fn new(name: impl Into<String>) -> DbResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DbError::invalid_argument(
                "column names must be of type non-empty-string, got an empty string",
            ));
        }
        Ok(ColumnName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ColumnName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ColumnName {
    type Error = DbError;

    fn try_from(name: &str) -> DbResult<Self> {
        ColumnName::new(name)
    }
}

impl TryFrom<String> for ColumnName {
    type Error = DbError;

    fn try_from(name: String) -> DbResult<Self> {
        ColumnName::new(name)
    }
}

/// Ordered column -> value mapping for a single row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload {
    columns: IndexMap<ColumnName, Value>,
}

impl Payload {
    /// Create an empty payload. It must be filled before it can be inserted.
    pub fn new() -> Self {
        Payload {
            columns: IndexMap::new(),
        }
    }

    /// Build a payload from `(column, value)` pairs, validating every column name.
    ///
    /// A repeated column keeps its first position and takes the last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut payload = Payload::new();
        for (column, value) in pairs {
            payload.set(column, value)?;
        }
        Ok(payload)
    }

    /// Set a column, returning the previous value if it was already present
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> DbResult<Option<Value>> {
        let column = ColumnName::new(column)?;
        Ok(self.columns.insert(column, value.into()))
    }

    /// Builder-style `set`
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> DbResult<Self> {
        self.set(column, value)?;
        Ok(self)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Fail with an invalid-argument error if there is nothing to insert
    pub fn ensure_not_empty(&self) -> DbResult<()> {
        if self.columns.is_empty() {
            return Err(empty_payload_error());
        }
        Ok(())
    }

    /// Column names in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(ColumnName::as_str)
    }

    /// Values in the same order as `columns()`
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnName, &Value)> {
        self.columns.iter()
    }

    /// Validate a dynamically shaped payload.
    ///
    /// Only a non-empty JSON object whose keys are non-empty and whose values
    /// are scalars or null is accepted. Arrays are list-style payloads: their
    /// keys are integer indexes, so they are rejected as non-string keys.
    pub fn try_from_json(data: &serde_json::Value) -> DbResult<Self> {
        let object = match data {
            serde_json::Value::Object(object) => object,
            serde_json::Value::Array(items) if items.is_empty() => {
                return Err(empty_payload_error());
            }
            serde_json::Value::Array(_) => {
                return Err(DbError::invalid_argument(
                    "column names must be of type non-empty-string, got integer index",
                ));
            }
            other => {
                return Err(DbError::invalid_argument(format!(
                    "insert data must be a map keyed by non-empty-string column names, got {}",
                    json_type_name(other)
                )));
            }
        };

        if object.is_empty() {
            return Err(empty_payload_error());
        }

        let mut payload = Payload::new();
        for (column, raw) in object {
            let value = scalar_from_json(column, raw)?;
            payload.set(column.as_str(), value)?;
        }
        Ok(payload)
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a ColumnName, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, ColumnName, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl TryFrom<&serde_json::Value> for Payload {
    type Error = DbError;

    fn try_from(data: &serde_json::Value) -> DbResult<Self> {
        Payload::try_from_json(data)
    }
}

fn empty_payload_error() -> DbError {
    DbError::invalid_argument("insert data must not be an empty array")
}

fn scalar_from_json(column: &str, raw: &serde_json::Value) -> DbResult<Value> {
    match raw {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            None => n.as_f64().map(Value::Float).ok_or_else(|| {
                DbError::invalid_argument(format!(
                    "value for column `{column}` is not a representable scalar number"
                ))
            }),
        },
        other => Err(DbError::invalid_argument(format!(
            "values must be scalar or null, got {} for column `{column}`",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
