// Query Execution Engine Implementation
//
// This module runs a `QueryDescription` against a `Table`: it validates the
// query shape, walks a fresh cursor, keeps the rows that pass every filter
// and stops early once the limit is reached.

use log::{debug, warn};

use crate::query::executor::filter::{build_filters, matches_all, MatchMode, MatchPolicy};
use crate::query::executor::result::{QueryError, QueryResult, QueryResultSet, ResultRow};
use crate::query::executor::source::{Cursor, Table};
use crate::query::parser::ast::QueryDescription;
use crate::query::parser::Parser;

/// Configuration for the executor
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Policy used for the `matches` operator
    pub match_mode: MatchMode,
}

/// Executes queries against one table
pub struct Executor<T: Table> {
    table: T,
    match_policy: Box<dyn MatchPolicy>,
}

impl<T: Table> Executor<T> {
    pub fn new(table: T) -> Self {
        Self::with_config(table, ExecutorConfig::default())
    }

    pub fn with_config(table: T, config: ExecutorConfig) -> Self {
        Executor {
            table,
            match_policy: config.match_mode.policy(),
        }
    }

    /// Replace the `matches` policy with a caller-supplied one
    pub fn with_match_policy(mut self, policy: Box<dyn MatchPolicy>) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Parse query text and execute it
    pub fn execute_str(&self, query: &str) -> QueryResult<QueryResultSet> {
        let query = Parser::new().parse(query)?;
        self.execute(&query)
    }

    /// Execute a parsed query and return the matching rows in cursor order.
    ///
    /// Only `SELECT *` scans, optionally filtered and limited, are executed.
    /// Any error from the cursor discards the rows gathered so far.
    pub fn execute(&self, query: &QueryDescription) -> QueryResult<QueryResultSet> {
        Self::validate(query)?;
        let filters = build_filters(&query.filters, self.match_policy.as_ref())?;

        let mut cursor = self.table.new_cursor().map_err(QueryError::RowSource)?;
        debug!("executing {}", query);

        let mut rows = Vec::new();
        let mut scanned = 0usize;
        let mut limited = false;

        while cursor.next() {
            scanned += 1;
            let row = cursor.row();
            if !matches_all(&filters, row) {
                continue;
            }

            rows.push(ResultRow::copy_of(row));
            if query.limit > 0 && rows.len() >= query.limit {
                limited = true;
                break;
            }
        }

        if let Some(err) = cursor.err() {
            warn!("row source failed after {} rows, discarding {} matches: {}", scanned, rows.len(), err);
            return Err(QueryError::RowSource(err));
        }

        debug!(
            "scan finished: {} rows scanned, {} matched{}",
            scanned,
            rows.len(),
            if limited { " (limit reached)" } else { "" }
        );
        Ok(QueryResultSet::new(rows))
    }

    /// Reject everything but an unaggregated `SELECT *` without GROUP BY or ORDER BY
    fn validate(query: &QueryDescription) -> QueryResult<()> {
        let reason = if !query.group_by.is_empty() {
            Some("GROUP BY is not supported")
        } else if !query.order_by.is_empty() {
            Some("ORDER BY is not supported")
        } else if query.has_aggregates() {
            Some("aggregate functions are not supported")
        } else if !query.is_select_all() {
            Some("only SELECT * is supported")
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!("rejecting {}: {}", query, reason);
                Err(QueryError::Unsupported(reason.to_string()))
            }
            None => Ok(()),
        }
    }
}
