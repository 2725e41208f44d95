// Filter Evaluation
//
// This module evaluates `FilterDesc` predicates against rows. Filters are
// compiled once per execution; evaluating a compiled filter is a pure
// function of the row.

use std::cmp::Ordering;
use std::fmt;

use regex_lite::Regex;

use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::executor::source::Row;
use crate::query::parser::ast::{FilterDesc, FilterOperator, FilterValue};

/// Built-in policies for the `matches` operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-sensitive substring containment
    #[default]
    Substring,
    /// The filter value is a regular expression
    Pattern,
}

impl MatchMode {
    pub fn policy(&self) -> Box<dyn MatchPolicy> {
        match self {
            MatchMode::Substring => Box::new(SubstringPolicy),
            MatchMode::Pattern => Box::new(PatternPolicy),
        }
    }
}

/// Decides what `column matches "value"` means
pub trait MatchPolicy: Send + Sync {
    /// Prepare a matcher for one filter value
    fn compile(&self, pattern: &str) -> QueryResult<Box<dyn TextMatcher>>;
}

/// A prepared `matches` test
pub trait TextMatcher: Send + Sync {
    fn is_match(&self, text: &str) -> bool;
}

pub struct SubstringPolicy;

struct SubstringMatcher(String);

impl MatchPolicy for SubstringPolicy {
    fn compile(&self, pattern: &str) -> QueryResult<Box<dyn TextMatcher>> {
        Ok(Box::new(SubstringMatcher(pattern.to_string())))
    }
}

impl TextMatcher for SubstringMatcher {
    fn is_match(&self, text: &str) -> bool {
        text.contains(self.0.as_str())
    }
}

pub struct PatternPolicy;

impl MatchPolicy for PatternPolicy {
    fn compile(&self, pattern: &str) -> QueryResult<Box<dyn TextMatcher>> {
        let re = Regex::new(pattern).map_err(|e| {
            QueryError::InvalidFilter(format!("invalid pattern {:?}: {}", pattern, e))
        })?;
        Ok(Box::new(re))
    }
}

impl TextMatcher for Regex {
    fn is_match(&self, text: &str) -> bool {
        Regex::is_match(self, text)
    }
}

/// A filter ready to be evaluated against rows
pub struct RowFilter {
    column: String,
    operator: FilterOperator,
    value: DataValue,
    matcher: Option<Box<dyn TextMatcher>>,
}

impl fmt::Debug for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowFilter")
            .field("column", &self.column)
            .field("operator", &self.operator)
            .field("value", &self.value)
            .finish()
    }
}

impl RowFilter {
    /// Compile a filter description, preparing its matcher when the
    /// operator is `matches` and the value is a string
    pub fn compile(desc: &FilterDesc, policy: &dyn MatchPolicy) -> QueryResult<Self> {
        let matcher = match (&desc.operator, &desc.value) {
            (FilterOperator::Matches, FilterValue::String(pattern)) => Some(policy.compile(pattern)?),
            _ => None,
        };

        Ok(RowFilter {
            column: desc.column.clone(),
            operator: desc.operator,
            value: DataValue::from(&desc.value),
            matcher,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Whether `row` satisfies this filter.
    ///
    /// A missing column or a value of an incomparable type never matches.
    pub fn matches(&self, row: &dyn Row) -> bool {
        match row.get(&self.column) {
            Some(actual) => self.test(actual),
            None => false,
        }
    }

    fn test(&self, actual: &DataValue) -> bool {
        if self.operator == FilterOperator::Matches {
            return match (actual.as_text(), &self.matcher) {
                (Some(text), Some(matcher)) => matcher.is_match(text),
                _ => false,
            };
        }

        // Unordered numbers (NaN) differ from everything but satisfy nothing else
        let ordering = match actual.partial_cmp(&self.value) {
            Some(ordering) => ordering,
            None => {
                return self.operator == FilterOperator::NotEqual
                    && actual.is_numeric()
                    && self.value.is_numeric();
            }
        };

        match self.operator {
            FilterOperator::Equal => ordering == Ordering::Equal,
            FilterOperator::NotEqual => ordering != Ordering::Equal,
            FilterOperator::LessThan => ordering == Ordering::Less,
            FilterOperator::LessEqual => ordering != Ordering::Greater,
            FilterOperator::GreaterThan => ordering == Ordering::Greater,
            FilterOperator::GreaterEqual => ordering != Ordering::Less,
            FilterOperator::Matches => false,
        }
    }
}

/// Compile every filter of a query, in order
pub fn build_filters(filters: &[FilterDesc], policy: &dyn MatchPolicy) -> QueryResult<Vec<RowFilter>> {
    filters.iter().map(|desc| RowFilter::compile(desc, policy)).collect()
}

/// True when `row` passes every filter; stops at the first failure
pub fn matches_all(filters: &[RowFilter], row: &dyn Row) -> bool {
    filters.iter().all(|filter| filter.matches(row))
}
