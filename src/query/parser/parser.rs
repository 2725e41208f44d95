// Query Parser
//
// Entry point for turning query text into a `QueryDescription`: runs the
// grammar engine over the input, then replays the recorded actions through
// the builder. Syntax errors point at the furthest span the engine reached.

use std::fmt;

use log::{debug, trace};
use thiserror::Error;

use crate::query::parser::ast::QueryDescription;
use crate::query::parser::builder::QueryBuilder;
use crate::query::parser::grammar::{GrammarEngine, Rule, Token, TokenBuffer};
use crate::query::parser::tree::SyntaxTree;

/// Configuration for the parser
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Initial capacity of the token buffer; it doubles when exceeded
    pub token_capacity: usize,
    /// Maximum depth of parenthesized filters
    pub max_nesting: usize,
    /// Highlight rule names in error messages with ANSI colors
    pub pretty_errors: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            token_capacity: 1024,
            max_nesting: 64,
            pretty_errors: false,
        }
    }
}

/// Line and column of a character offset.
///
/// Lines start at 1; columns count characters from the start of the line
/// and start at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    /// Map a set of character offsets to positions in a single pass over `input`.
    ///
    /// Offsets at or past the end of the input map to the position just
    /// after the last character.
    pub fn translate(input: &[char], offsets: &[usize]) -> Vec<TextPosition> {
        let mut order: Vec<usize> = (0..offsets.len()).collect();
        order.sort_by_key(|&i| offsets[i]);

        let mut positions = vec![TextPosition::default(); offsets.len()];
        let mut current = TextPosition { line: 1, column: 0 };
        let mut pending = order.into_iter().peekable();

        for (index, &ch) in input.iter().enumerate() {
            while let Some(&i) = pending.peek() {
                if offsets[i] != index {
                    break;
                }
                positions[i] = current;
                pending.next();
            }
            if pending.peek().is_none() {
                return positions;
            }
            if ch == '\n' {
                current.line += 1;
                current.column = 0;
            } else {
                current.column += 1;
            }
        }

        for i in pending {
            positions[i] = current;
        }
        positions
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} symbol {}", self.line, self.column)
    }
}

/// Syntax error: the input does not match the grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error near {} ({} - {}): {:?}", rule_label(.rule, .pretty), .begin, .end, .near)]
pub struct ParseError {
    /// Rule of the furthest non-empty span the parser reached
    pub rule: Rule,
    pub begin: TextPosition,
    pub end: TextPosition,
    /// Source text of that span
    pub near: String,
    pretty: bool,
}

impl ParseError {
    fn from_furthest(furthest: Token, input: &[char], pretty: bool) -> Self {
        let positions = TextPosition::translate(input, &[furthest.begin, furthest.end]);
        ParseError {
            rule: furthest.rule,
            begin: positions[0],
            end: positions[1],
            near: furthest.text(input),
            pretty,
        }
    }
}

fn rule_label(rule: &Rule, pretty: &bool) -> String {
    if *pretty {
        format!("\x1B[34m{}\x1B[m", rule)
    } else {
        rule.to_string()
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Reusable query parser.
///
/// Each call to [`parse`] starts from a clean state, so one value can parse
/// many queries in sequence. The token buffer is reused between calls, and
/// the tokens and text of the last successful parse stay available until
/// another parse succeeds. Concurrent parsing needs one parser per thread.
///
/// [`parse`]: Parser::parse
#[derive(Debug)]
pub struct Parser {
    config: ParserConfig,
    input: Vec<char>,
    tokens: TokenBuffer,
    scratch: TokenBuffer,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let tokens = TokenBuffer::with_capacity(config.token_capacity);
        let scratch = TokenBuffer::with_capacity(config.token_capacity);
        Parser {
            config,
            input: Vec::new(),
            tokens,
            scratch,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse query text into a description
    pub fn parse(&mut self, query: &str) -> ParseResult<QueryDescription> {
        let input: Vec<char> = query.chars().collect();

        let outcome = GrammarEngine::new(&input, &mut self.scratch, self.config.max_nesting).run();
        match outcome {
            Ok(()) => {
                trace!("parsed {:?} into {} tokens", query, self.scratch.len());
                std::mem::swap(&mut self.tokens, &mut self.scratch);
                self.input = input;
                Ok(QueryBuilder::build(&self.tokens, &self.input))
            }
            Err(furthest) => {
                let err = ParseError::from_furthest(furthest, &input, self.config.pretty_errors);
                debug!("failed to parse {:?}: {}", query, err);
                Err(err)
            }
        }
    }

    /// Tokens recorded by the last successful parse
    pub fn tokens(&self) -> &TokenBuffer {
        &self.tokens
    }

    /// Tree view of the last successful parse
    pub fn syntax_tree(&self) -> SyntaxTree {
        self.tokens.syntax_tree()
    }

    /// Rendered tree of the last successful parse, one node per line
    pub fn render_syntax_tree(&self) -> String {
        self.syntax_tree().render(&self.input, self.config.pretty_errors)
    }
}

/// Parse a query with the default configuration
pub fn parse(query: &str) -> ParseResult<QueryDescription> {
    Parser::new().parse(query)
}
