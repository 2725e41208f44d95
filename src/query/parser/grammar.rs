// Query Grammar Engine
//
// This module implements a backtracking recursive-descent recognizer for the
// query language. Every rule is a method over a shared scan position; ordered
// choice tries alternatives in turn and rewinds the position (and the token
// buffer) whenever an alternative fails.
//
// Grammar (keywords are case-insensitive, `_` is optional whitespace):
//
//   Query       <- _ ColumnExpr? _ WhereExpr? _ GroupExpr? _ OrderByExpr? _ LimitExpr? _ !.
//   ColumnExpr  <- SELECT _ Columns
//   GroupExpr   <- GROUP BY _ Columns
//   WhereExpr   <- WHERE _ LogicExpr (_ COMMA? LogicExpr)*
//   OrderByExpr <- ORDER BY _ Columns Descending?
//   LimitExpr   <- LIMIT _ Unsigned
//   Columns     <- Column (COMMA Column)*
//   Column      <- ColumnAggregation / Identifier _ / '*' _
//   ColumnAggregation <- Identifier LPAR Identifier RPAR
//   LogicExpr   <- LPAR LogicExpr RPAR / FilterKey _ Operator _ FilterValue
//   FilterValue <- Float / Integer / String

use std::fmt;

use crate::query::parser::lexer;

/// Grammar rules recorded in the token buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Unknown,
    Query,
    ColumnExpr,
    GroupExpr,
    WhereExpr,
    OrderByExpr,
    LimitExpr,
    Columns,
    Column,
    ColumnAggregation,
    LogicExpr,
    Operator,
    FilterKey,
    FilterCondition,
    FilterValue,
    Value,
    Descending,
    String,
    StringChar,
    Escape,
    SimpleEscape,
    OctalEscape,
    HexEscape,
    UniversalCharacter,
    HexQuad,
    HexDigit,
    Unsigned,
    Sign,
    Integer,
    Float,
    Identifier,
    IdChar,
    Keyword,
    Whitespace,
    LeftParen,
    RightParen,
    Comma,
    /// Captured text span consumed by the next action
    Text,
    /// Zero-length semantic action marker
    Action(Action),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Unknown => "Unknown",
            Rule::Query => "Query",
            Rule::ColumnExpr => "ColumnExpr",
            Rule::GroupExpr => "GroupExpr",
            Rule::WhereExpr => "WhereExpr",
            Rule::OrderByExpr => "OrderByExpr",
            Rule::LimitExpr => "LimitExpr",
            Rule::Columns => "Columns",
            Rule::Column => "Column",
            Rule::ColumnAggregation => "ColumnAggregation",
            Rule::LogicExpr => "LogicExpr",
            Rule::Operator => "OPERATOR",
            Rule::FilterKey => "FilterKey",
            Rule::FilterCondition => "FilterCondition",
            Rule::FilterValue => "FilterValue",
            Rule::Value => "Value",
            Rule::Descending => "Descending",
            Rule::String => "String",
            Rule::StringChar => "StringChar",
            Rule::Escape => "Escape",
            Rule::SimpleEscape => "SimpleEscape",
            Rule::OctalEscape => "OctalEscape",
            Rule::HexEscape => "HexEscape",
            Rule::UniversalCharacter => "UniversalCharacter",
            Rule::HexQuad => "HexQuad",
            Rule::HexDigit => "HexDigit",
            Rule::Unsigned => "Unsigned",
            Rule::Sign => "Sign",
            Rule::Integer => "Integer",
            Rule::Float => "Float",
            Rule::Identifier => "Identifier",
            Rule::IdChar => "IdChar",
            Rule::Keyword => "Keyword",
            Rule::Whitespace => "_",
            Rule::LeftParen => "LPAR",
            Rule::RightParen => "RPAR",
            Rule::Comma => "COMMA",
            Rule::Text => "Text",
            Rule::Action(action) => action.name(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic actions emitted while recognizing a query.
///
/// Actions carry no text of their own; the builder pairs each one with the
/// most recent `Rule::Text` capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    EnterColumns,
    EnterGroupBy,
    EnterOrderBy,
    AddColumn,
    SetColumnName,
    SetColumnAggregate,
    AddFilter,
    SetFilterColumn,
    SetFilterOperator,
    SetFilterFloat,
    SetFilterInteger,
    SetFilterString,
    SetDescending,
    SetLimit,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::EnterColumns => "EnterColumns",
            Action::EnterGroupBy => "EnterGroupBy",
            Action::EnterOrderBy => "EnterOrderBy",
            Action::AddColumn => "AddColumn",
            Action::SetColumnName => "SetColumnName",
            Action::SetColumnAggregate => "SetColumnAggregate",
            Action::AddFilter => "AddFilter",
            Action::SetFilterColumn => "SetFilterColumn",
            Action::SetFilterOperator => "SetFilterOperator",
            Action::SetFilterFloat => "SetFilterFloat",
            Action::SetFilterInteger => "SetFilterInteger",
            Action::SetFilterString => "SetFilterString",
            Action::SetDescending => "SetDescending",
            Action::SetLimit => "SetLimit",
        }
    }
}

/// A recognized span `[begin, end)` of the input, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub rule: Rule,
    pub begin: usize,
    pub end: usize,
}

impl Token {
    pub fn new(rule: Rule, begin: usize, end: usize) -> Self {
        Token { rule, begin, end }
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Source text covered by this token
    pub fn text(&self, input: &[char]) -> String {
        input[self.begin..self.end].iter().collect()
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::new(Rule::Unknown, 0, 0)
    }
}

/// Flat list of tokens in the order their rules completed.
///
/// A rule is recorded after everything it contains, so a parent always
/// follows its children. Tokens from abandoned alternatives are truncated
/// away when the engine backtracks.
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
}

impl TokenBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        TokenBuffer {
            tokens: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn truncate(&mut self, len: usize) {
        self.tokens.truncate(len);
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tokens.capacity()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

/// Scan state saved before an alternative is attempted
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    position: usize,
    token_count: usize,
}

/// Recognizer for one input.
///
/// The engine is single-use: construct it over the input and a token buffer
/// it clears and fills, then call [`run`]. The buffer outlives the engine so
/// its allocation can serve the next input.
///
/// [`run`]: GrammarEngine::run
pub struct GrammarEngine<'a> {
    input: &'a [char],
    position: usize,
    tokens: &'a mut TokenBuffer,
    furthest: Token,
    depth: usize,
    max_depth: usize,
}

impl<'a> GrammarEngine<'a> {
    pub fn new(input: &'a [char], tokens: &'a mut TokenBuffer, max_depth: usize) -> Self {
        tokens.clear();
        GrammarEngine {
            input,
            position: 0,
            tokens,
            furthest: Token::default(),
            depth: 0,
            max_depth,
        }
    }

    /// Match `Query` against the whole input, leaving the recorded tokens in
    /// the buffer.
    ///
    /// On failure the error is the non-empty span that reached furthest into
    /// the input during the attempt.
    pub fn run(mut self) -> Result<(), Token> {
        if self.query() {
            Ok(())
        } else {
            Err(self.furthest)
        }
    }

    // ---------------------------------------------------------------
    // Scanning primitives
    // ---------------------------------------------------------------

    /// Current character, `None` at the end-of-input sentinel
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            token_count: self.tokens.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.tokens.truncate(checkpoint.token_count);
    }

    fn record(&mut self, rule: Rule, begin: usize) {
        let token = Token::new(rule, begin, self.position);
        if !token.is_empty() && token.end > self.furthest.end {
            self.furthest = token;
        }
        self.tokens.push(token);
    }

    /// Run `body` as `rule`, recording its span on success and rewinding on failure
    fn rule<F>(&mut self, rule: Rule, body: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let checkpoint = self.checkpoint();
        if body(self) {
            self.record(rule, checkpoint.position);
            true
        } else {
            self.restore(checkpoint);
            false
        }
    }

    /// Try a sequence without recording a token, rewinding on failure
    fn attempt<F>(&mut self, body: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let checkpoint = self.checkpoint();
        if body(self) {
            true
        } else {
            self.restore(checkpoint);
            false
        }
    }

    fn optional<F>(&mut self, body: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        self.attempt(body);
        true
    }

    fn zero_or_more<F>(&mut self, mut body: F) -> bool
    where
        F: FnMut(&mut Self) -> bool,
    {
        loop {
            let before = self.position;
            if !self.attempt(&mut body) || self.position == before {
                return true;
            }
        }
    }

    fn one_or_more<F>(&mut self, mut body: F) -> bool
    where
        F: FnMut(&mut Self) -> bool,
    {
        if !self.attempt(&mut body) {
            return false;
        }
        self.zero_or_more(body)
    }

    /// Negative look-ahead: succeeds without consuming when `body` fails
    fn not_ahead<F>(&mut self, body: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let checkpoint = self.checkpoint();
        let matched = body(self);
        self.restore(checkpoint);
        !matched
    }

    fn capture<F>(&mut self, body: F) -> bool
    where
        F: FnOnce(&mut Self) -> bool,
    {
        self.rule(Rule::Text, body)
    }

    fn action(&mut self, action: Action) -> bool {
        self.record(Rule::Action(action), self.position);
        true
    }

    fn match_char(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn match_class(&mut self, class: fn(char) -> bool) -> bool {
        match self.peek() {
            Some(ch) if class(ch) => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn match_any(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.position += 1;
        true
    }

    fn match_literal(&mut self, literal: &str) -> bool {
        self.attempt(|p| literal.chars().all(|expected| p.match_char(expected)))
    }

    /// Case-insensitive literal; spaces inside the literal must match exactly one space
    fn match_literal_ignore_case(&mut self, literal: &str) -> bool {
        self.attempt(|p| {
            literal.chars().all(|expected| match p.peek() {
                Some(ch) if lexer::eq_ignore_case(ch, expected) => {
                    p.position += 1;
                    true
                }
                _ => false,
            })
        })
    }

    // ---------------------------------------------------------------
    // Clauses
    // ---------------------------------------------------------------

    fn query(&mut self) -> bool {
        self.rule(Rule::Query, |p| {
            p.whitespace()
                && p.optional(Self::column_expr)
                && p.whitespace()
                && p.optional(Self::where_expr)
                && p.whitespace()
                && p.optional(Self::group_expr)
                && p.whitespace()
                && p.optional(Self::order_by_expr)
                && p.whitespace()
                && p.optional(Self::limit_expr)
                && p.whitespace()
                && p.at_end()
        })
    }

    fn column_expr(&mut self) -> bool {
        self.rule(Rule::ColumnExpr, |p| {
            p.match_literal_ignore_case("select")
                && p.whitespace()
                && p.action(Action::EnterColumns)
                && p.columns()
        })
    }

    fn group_expr(&mut self) -> bool {
        self.rule(Rule::GroupExpr, |p| {
            p.match_literal_ignore_case("group by")
                && p.whitespace()
                && p.action(Action::EnterGroupBy)
                && p.columns()
        })
    }

    fn where_expr(&mut self) -> bool {
        self.rule(Rule::WhereExpr, |p| {
            p.match_literal_ignore_case("where")
                && p.whitespace()
                && p.logic_expr()
                && p.zero_or_more(|p| {
                    p.whitespace() && p.optional(Self::comma) && p.logic_expr()
                })
        })
    }

    fn order_by_expr(&mut self) -> bool {
        self.rule(Rule::OrderByExpr, |p| {
            p.match_literal_ignore_case("order by")
                && p.whitespace()
                && p.action(Action::EnterOrderBy)
                && p.columns()
                && p.optional(Self::descending)
        })
    }

    fn limit_expr(&mut self) -> bool {
        self.rule(Rule::LimitExpr, |p| {
            p.match_literal_ignore_case("limit")
                && p.whitespace()
                && p.capture(Self::unsigned)
                && p.action(Action::SetLimit)
        })
    }

    // ---------------------------------------------------------------
    // Columns
    // ---------------------------------------------------------------

    fn columns(&mut self) -> bool {
        self.rule(Rule::Columns, |p| {
            p.column() && p.zero_or_more(|p| p.comma() && p.column())
        })
    }

    fn column(&mut self) -> bool {
        self.rule(Rule::Column, |p| {
            p.action(Action::AddColumn)
                && (p.column_aggregation()
                    || p.attempt(|p| {
                        p.capture(Self::identifier)
                            && p.whitespace()
                            && p.action(Action::SetColumnName)
                    })
                    || p.attempt(|p| {
                        p.capture(|p| p.match_char('*'))
                            && p.whitespace()
                            && p.action(Action::SetColumnName)
                    }))
        })
    }

    fn column_aggregation(&mut self) -> bool {
        self.rule(Rule::ColumnAggregation, |p| {
            p.capture(Self::identifier)
                && p.action(Action::SetColumnAggregate)
                && p.left_paren()
                && p.capture(Self::identifier)
                && p.right_paren()
                && p.action(Action::SetColumnName)
        })
    }

    fn descending(&mut self) -> bool {
        self.rule(Rule::Descending, |p| {
            p.match_literal_ignore_case("desc") && p.action(Action::SetDescending)
        })
    }

    // ---------------------------------------------------------------
    // Filters
    // ---------------------------------------------------------------

    fn logic_expr(&mut self) -> bool {
        if self.depth >= self.max_depth {
            return false;
        }
        self.depth += 1;
        let matched = self.rule(Rule::LogicExpr, |p| {
            p.attempt(|p| p.left_paren() && p.logic_expr() && p.right_paren())
                || p.attempt(|p| {
                    p.action(Action::AddFilter)
                        && p.filter_key()
                        && p.whitespace()
                        && p.filter_condition()
                        && p.whitespace()
                        && p.filter_value()
                })
        });
        self.depth -= 1;
        matched
    }

    fn operator(&mut self) -> bool {
        self.rule(Rule::Operator, |p| {
            p.match_literal("=")
                || p.match_literal("!=")
                || p.match_literal("<=")
                || p.match_literal(">=")
                || p.match_literal("<")
                || p.match_literal(">")
                || p.match_literal_ignore_case("matches")
        })
    }

    fn filter_key(&mut self) -> bool {
        self.rule(Rule::FilterKey, |p| {
            p.capture(Self::identifier) && p.action(Action::SetFilterColumn)
        })
    }

    fn filter_condition(&mut self) -> bool {
        self.rule(Rule::FilterCondition, |p| {
            p.capture(Self::operator) && p.action(Action::SetFilterOperator)
        })
    }

    fn filter_value(&mut self) -> bool {
        self.rule(Rule::FilterValue, Self::value)
    }

    /// Float before Integer before String, so a literal with a fraction or
    /// exponent is always typed as a float
    fn value(&mut self) -> bool {
        self.rule(Rule::Value, |p| {
            p.attempt(|p| p.capture(Self::float) && p.action(Action::SetFilterFloat))
                || p.attempt(|p| p.capture(Self::integer) && p.action(Action::SetFilterInteger))
                || p.attempt(|p| p.capture(Self::string) && p.action(Action::SetFilterString))
        })
    }

    // ---------------------------------------------------------------
    // Strings
    // ---------------------------------------------------------------

    fn string(&mut self) -> bool {
        self.rule(Rule::String, |p| {
            p.one_or_more(|p| {
                p.match_char('"') && p.zero_or_more(Self::string_char) && p.match_char('"')
            })
        })
    }

    fn string_char(&mut self) -> bool {
        self.rule(Rule::StringChar, |p| {
            p.escape()
                || p.attempt(|p| {
                    p.not_ahead(|p| p.match_class(|ch| matches!(ch, '"' | '\n' | '\\')))
                        && p.match_any()
                })
        })
    }

    fn escape(&mut self) -> bool {
        self.rule(Rule::Escape, |p| {
            p.simple_escape() || p.octal_escape() || p.hex_escape() || p.universal_character()
        })
    }

    fn simple_escape(&mut self) -> bool {
        self.rule(Rule::SimpleEscape, |p| {
            p.match_char('\\') && p.match_class(lexer::is_simple_escape)
        })
    }

    fn octal_escape(&mut self) -> bool {
        self.rule(Rule::OctalEscape, |p| {
            p.match_char('\\')
                && p.match_class(lexer::is_octal_digit)
                && p.optional(|p| p.match_class(lexer::is_octal_digit))
                && p.optional(|p| p.match_class(lexer::is_octal_digit))
        })
    }

    fn hex_escape(&mut self) -> bool {
        self.rule(Rule::HexEscape, |p| {
            p.match_char('\\') && p.match_char('x') && p.one_or_more(Self::hex_digit)
        })
    }

    fn universal_character(&mut self) -> bool {
        self.rule(Rule::UniversalCharacter, |p| {
            p.attempt(|p| p.match_char('\\') && p.match_char('u') && p.hex_quad())
                || p.attempt(|p| {
                    p.match_char('\\') && p.match_char('U') && p.hex_quad() && p.hex_quad()
                })
        })
    }

    fn hex_quad(&mut self) -> bool {
        self.rule(Rule::HexQuad, |p| (0..4).all(|_| p.hex_digit()))
    }

    fn hex_digit(&mut self) -> bool {
        self.rule(Rule::HexDigit, |p| p.match_class(lexer::is_hex_digit))
    }

    // ---------------------------------------------------------------
    // Numbers
    // ---------------------------------------------------------------

    fn unsigned(&mut self) -> bool {
        self.rule(Rule::Unsigned, |p| p.one_or_more(|p| p.match_class(lexer::is_digit)))
    }

    fn sign(&mut self) -> bool {
        self.rule(Rule::Sign, |p| p.match_class(lexer::is_sign))
    }

    fn integer(&mut self) -> bool {
        self.rule(Rule::Integer, |p| p.optional(Self::sign) && p.unsigned())
    }

    fn float(&mut self) -> bool {
        self.rule(Rule::Float, |p| {
            if !p.integer() {
                return false;
            }
            let fraction = p.attempt(|p| p.match_char('.') && p.unsigned());
            let exponent = p.attempt(|p| p.match_class(|ch| ch == 'e' || ch == 'E') && p.integer());
            fraction || exponent
        })
    }

    // ---------------------------------------------------------------
    // Identifiers and punctuation
    // ---------------------------------------------------------------

    fn identifier(&mut self) -> bool {
        self.rule(Rule::Identifier, |p| {
            p.not_ahead(Self::keyword)
                && p.match_class(lexer::is_identifier_start)
                && p.zero_or_more(Self::id_char)
        })
    }

    fn id_char(&mut self) -> bool {
        self.rule(Rule::IdChar, |p| p.match_class(lexer::is_identifier_char))
    }

    fn keyword(&mut self) -> bool {
        self.rule(Rule::Keyword, |p| {
            lexer::KEYWORDS
                .iter()
                .any(|word| p.match_literal_ignore_case(word))
                && p.not_ahead(Self::id_char)
        })
    }

    fn whitespace(&mut self) -> bool {
        self.rule(Rule::Whitespace, |p| {
            p.zero_or_more(|p| p.match_class(lexer::is_whitespace))
        })
    }

    fn left_paren(&mut self) -> bool {
        self.rule(Rule::LeftParen, |p| {
            p.whitespace() && p.match_char('(') && p.whitespace()
        })
    }

    fn right_paren(&mut self) -> bool {
        self.rule(Rule::RightParen, |p| {
            p.whitespace() && p.match_char(')') && p.whitespace()
        })
    }

    fn comma(&mut self) -> bool {
        self.rule(Rule::Comma, |p| {
            p.whitespace() && p.match_char(',') && p.whitespace()
        })
    }
}
