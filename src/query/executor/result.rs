// Query Result Implementation
//
// This module defines the value and result types for query execution.

use std::cmp::Ordering;
use std::fmt;

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::executor::source::{Row, SourceError};
use crate::query::parser::ast::FilterValue;
use crate::query::parser::ParseError;

/// Possible data types for values in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "NULL"),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Text(s) => write!(f, "\"{}\"", s),
            DataValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl PartialOrd for DataValue {
    /// Numbers compare with numbers and text with text; every other pairing
    /// is unordered
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (DataValue::Integer(a), DataValue::Integer(b)) => a.partial_cmp(b),
            (DataValue::Float(a), DataValue::Float(b)) => a.partial_cmp(b),
            (DataValue::Integer(a), DataValue::Float(b)) => (*a as f64).partial_cmp(b),
            (DataValue::Float(a), DataValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (DataValue::Text(a), DataValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<&FilterValue> for DataValue {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Integer(i) => DataValue::Integer(*i),
            FilterValue::Float(f) => DataValue::Float(*f),
            FilterValue::String(s) => DataValue::Text(s.clone()),
        }
    }
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataValue::Integer(_) | DataValue::Float(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A materialized result row: field values in the order they were copied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRow {
    values: LinkedHashMap<String, DataValue>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(field, value)` pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<DataValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = ResultRow::new();
        for (field, value) in pairs {
            row.set(field, value);
        }
        row
    }

    /// Copy every field of a source row into an independent row.
    ///
    /// A field the row lists but cannot produce is copied as NULL.
    pub fn copy_of(row: &dyn Row) -> Self {
        let mut copy = ResultRow::new();
        for field in row.fields() {
            let value = row.get(field).cloned().unwrap_or(DataValue::Null);
            copy.set(field, value);
        }
        copy
    }

    /// Set a field's value. An existing field keeps its position.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<DataValue>) {
        let field = field.into();
        let value = value.into();
        match self.values.get_mut(&field) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(field, value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Field names with their values, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DataValue)> {
        self.values.iter()
    }
}

impl Row for ResultRow {
    fn fields(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    fn get(&self, field: &str) -> Option<&DataValue> {
        self.values.get(field)
    }
}

/// Represents query execution error
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query text does not match the grammar
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The query asks for a feature the executor does not run
    #[error("unsupported query: {0}")]
    Unsupported(String),
    /// A `matches` pattern the active policy cannot use
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    /// Error from the table or cursor, unchanged
    #[error("row source error: {0}")]
    RowSource(#[source] SourceError),
}

impl QueryError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, QueryError::Unsupported(_))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Rows produced by one execution, in cursor order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryResultSet {
    rows: Vec<ResultRow>,
}

impl QueryResultSet {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        QueryResultSet { rows }
    }

    /// Get the rows in the resultset
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    /// Format the resultset as a string table over the fields of the first row
    pub fn to_string_table(&self) -> String {
        let columns: Vec<&str> = match self.rows.first() {
            Some(row) => row.fields(),
            None => return "Empty result".to_string(),
        };

        let mut result = String::new();

        result.push_str("| ");
        for col in &columns {
            result.push_str(&format!("{} | ", col));
        }
        result.push('\n');

        result.push('|');
        for col in &columns {
            result.push_str(&format!("{}|", "-".repeat(col.len() + 2)));
        }
        result.push('\n');

        for row in &self.rows {
            result.push_str("| ");
            for col in &columns {
                match row.get(col) {
                    Some(value) => result.push_str(&format!("{} | ", value)),
                    None => result.push_str("NULL | "),
                }
            }
            result.push('\n');
        }

        result
    }
}

impl IntoIterator for QueryResultSet {
    type Item = ResultRow;
    type IntoIter = std::vec::IntoIter<ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
