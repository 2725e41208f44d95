// Rowql Query Engine
//
// Parses a small SQL-like language into a `QueryDescription` and runs it as
// a filtered, limited scan over a caller-supplied row source.

pub mod query;

// Re-export key items for convenient access
pub use query::parser::{parse, ParseError, Parser, ParserConfig, QueryDescription};
pub use query::executor::{Cursor, DataValue, Executor, ExecutorConfig, QueryError, QueryResultSet, Row, Table};
