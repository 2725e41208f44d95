// Query Builder
//
// Replays the semantic actions recorded by the grammar engine, in order,
// to assemble a `QueryDescription`. Column actions go to the list selected by
// the current section; filter actions always go to the filter list.

use crate::query::parser::ast::{ColumnDesc, FilterDesc, FilterOperator, FilterValue, QueryDescription};
use crate::query::parser::grammar::{Action, Rule, TokenBuffer};
use crate::query::parser::lexer;

/// Clause that column actions currently target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    /// No column clause seen yet
    #[default]
    None,
    Columns,
    GroupBy,
    OrderBy,
}

/// Accumulates a `QueryDescription` from actions and captured text.
///
/// Builder operations never fail. A capture that cannot be converted (which
/// the grammar already rules out) leaves a zero value behind.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    query: QueryDescription,
    section: Section,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a query from a recognized token buffer over `input`
    pub fn build(tokens: &TokenBuffer, input: &[char]) -> QueryDescription {
        let mut builder = QueryBuilder::new();
        let mut text = String::new();

        for token in tokens.iter() {
            match token.rule {
                Rule::Text => text = token.text(input),
                Rule::Action(action) => builder.apply(action, &text),
                _ => {}
            }
        }

        builder.finish()
    }

    /// Apply one action, using `text` as its most recent capture
    pub fn apply(&mut self, action: Action, text: &str) {
        match action {
            Action::EnterColumns => self.section = Section::Columns,
            Action::EnterGroupBy => self.section = Section::GroupBy,
            Action::EnterOrderBy => self.section = Section::OrderBy,
            Action::AddColumn => self.add_column(),
            Action::SetColumnName => self.set_column_name(text),
            Action::SetColumnAggregate => self.set_column_aggregate(text),
            Action::AddFilter => self.add_filter(),
            Action::SetFilterColumn => self.set_filter_column(text),
            Action::SetFilterOperator => self.set_filter_operator(text),
            Action::SetFilterFloat => self.set_filter_float(text),
            Action::SetFilterInteger => self.set_filter_integer(text),
            Action::SetFilterString => self.set_filter_string(text),
            Action::SetDescending => self.set_descending(),
            Action::SetLimit => self.set_limit(text),
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn finish(self) -> QueryDescription {
        self.query
    }

    fn section_columns(&mut self) -> Option<&mut Vec<ColumnDesc>> {
        match self.section {
            Section::None => None,
            Section::Columns => Some(&mut self.query.columns),
            Section::GroupBy => Some(&mut self.query.group_by),
            Section::OrderBy => Some(&mut self.query.order_by),
        }
    }

    fn last_column(&mut self) -> Option<&mut ColumnDesc> {
        self.section_columns().and_then(|columns| columns.last_mut())
    }

    fn last_filter(&mut self) -> Option<&mut FilterDesc> {
        self.query.filters.last_mut()
    }

    pub fn add_column(&mut self) {
        if let Some(columns) = self.section_columns() {
            columns.push(ColumnDesc::default());
        }
    }

    pub fn set_column_name(&mut self, name: &str) {
        if let Some(column) = self.last_column() {
            column.name = name.to_string();
        }
    }

    pub fn set_column_aggregate(&mut self, aggregate: &str) {
        if let Some(column) = self.last_column() {
            column.aggregate = aggregate.to_string();
        }
    }

    pub fn add_filter(&mut self) {
        self.query.filters.push(FilterDesc::default());
    }

    pub fn set_filter_column(&mut self, column: &str) {
        if let Some(filter) = self.last_filter() {
            filter.column = column.to_string();
        }
    }

    pub fn set_filter_operator(&mut self, operator: &str) {
        if let Some(filter) = self.last_filter() {
            filter.operator = FilterOperator::from_text(operator).unwrap_or_default();
        }
    }

    pub fn set_filter_float(&mut self, value: &str) {
        if let Some(filter) = self.last_filter() {
            filter.value = FilterValue::Float(value.parse().unwrap_or(0.0));
        }
    }

    pub fn set_filter_integer(&mut self, value: &str) {
        if let Some(filter) = self.last_filter() {
            filter.value = FilterValue::Integer(value.parse().unwrap_or(0));
        }
    }

    pub fn set_filter_string(&mut self, value: &str) {
        if let Some(filter) = self.last_filter() {
            filter.value = FilterValue::String(lexer::unquote_segments(value));
        }
    }

    pub fn set_descending(&mut self) {
        self.query.descending = true;
    }

    pub fn set_limit(&mut self, value: &str) {
        self.query.limit = value.parse().unwrap_or(0);
    }
}
