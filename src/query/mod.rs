// Rowql Query Processing Module
//
// This module contains components for query parsing and execution.

// Re-export key components
pub mod parser;
pub mod executor;

// Export key public interfaces
pub use parser::{parse, Parser, QueryDescription};
pub use executor::{Executor, QueryResultSet};
