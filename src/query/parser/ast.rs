// Query Description
//
// This module defines the structured form a query is parsed into. A
// `QueryDescription` is produced by one parse and consumed by one execution;
// it owns no resources.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Parsed query: projection, filters and the clauses around them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescription {
    /// Projected columns (SELECT)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDesc>,
    /// GROUP BY columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<ColumnDesc>,
    /// Conjunctive filters (WHERE), in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDesc>,
    /// ORDER BY columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<ColumnDesc>,
    /// Whether ORDER BY ... DESC was given
    #[serde(default)]
    pub descending: bool,
    /// Maximum number of rows, 0 for no limit
    #[serde(default, skip_serializing_if = "is_zero")]
    pub limit: usize,
}

fn is_zero(limit: &usize) -> bool {
    *limit == 0
}

impl QueryDescription {
    /// True for the only executable projection: a bare `SELECT *`
    pub fn is_select_all(&self) -> bool {
        matches!(self.columns.as_slice(), [column] if column.is_wildcard() && !column.is_aggregate())
    }

    pub fn has_aggregates(&self) -> bool {
        self.columns.iter().any(ColumnDesc::is_aggregate)
    }

    /// Compact JSON form, used for logging
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for QueryDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

/// A column reference, optionally wrapped in an aggregate function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDesc {
    pub name: String,
    /// Aggregate function name, empty when none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aggregate: String,
}

impl ColumnDesc {
    pub fn new(name: impl Into<String>) -> Self {
        ColumnDesc {
            name: name.into(),
            aggregate: String::new(),
        }
    }

    pub fn aggregated(aggregate: impl Into<String>, name: impl Into<String>) -> Self {
        ColumnDesc {
            name: name.into(),
            aggregate: aggregate.into(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }

    pub fn is_aggregate(&self) -> bool {
        !self.aggregate.is_empty()
    }
}

/// Comparison operators allowed in a filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[default]
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "matches")]
    Matches,
}

impl FilterOperator {
    /// Map operator text captured by the grammar; `matches` is case-insensitive
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "=" => Some(FilterOperator::Equal),
            "!=" => Some(FilterOperator::NotEqual),
            "<" => Some(FilterOperator::LessThan),
            "<=" => Some(FilterOperator::LessEqual),
            ">" => Some(FilterOperator::GreaterThan),
            ">=" => Some(FilterOperator::GreaterEqual),
            _ if text.eq_ignore_ascii_case("matches") => Some(FilterOperator::Matches),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "=",
            FilterOperator::NotEqual => "!=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessEqual => "<=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterEqual => ">=",
            FilterOperator::Matches => "matches",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed literal on the right-hand side of a filter.
///
/// The type is fixed by the literal's syntax: a fraction or exponent makes a
/// float, plain signed digits an integer, and a quoted literal a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    #[serde(serialize_with = "serialize_float")]
    Float(f64),
    String(String),
}

// JSON has no infinities or NaN; write those as text ("inf", "-inf", "NaN")
fn serialize_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(&value.to_string())
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Integer(0)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Integer(i) => write!(f, "{}", i),
            FilterValue::Float(fl) => write!(f, "{}", fl),
            FilterValue::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A single `column operator value` predicate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterDesc {
    pub column: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterDesc {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        FilterDesc {
            column: column.into(),
            operator,
            value,
        }
    }
}

impl fmt::Display for FilterDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.operator, self.value)
    }
}
