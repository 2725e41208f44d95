// Query Executor Module
//
// This module is responsible for running parsed queries against a caller's
// row source and producing results.

// Re-export public components
pub mod source;
pub mod result;
pub mod filter;
pub mod engine;

// Export key types
pub use self::engine::{Executor, ExecutorConfig};
pub use self::filter::{MatchMode, MatchPolicy, TextMatcher};
pub use self::result::{DataValue, QueryError, QueryResult, QueryResultSet, ResultRow};
pub use self::source::{Cursor, MemoryTable, Row, SourceError, Table};
