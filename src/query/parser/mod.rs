// Query Parser Module
//
// This module is responsible for parsing query text and converting it
// into a `QueryDescription`.

// Re-export public components
pub mod lexer;
pub mod grammar;
pub mod tree;
pub mod ast;
pub mod builder;
pub mod parser;

// Export key types
pub use self::ast::{ColumnDesc, FilterDesc, FilterOperator, FilterValue, QueryDescription};
pub use self::grammar::{Action, Rule, Token, TokenBuffer};
pub use self::parser::{parse, ParseError, ParseResult, Parser, ParserConfig, TextPosition};
pub use self::tree::SyntaxTree;
