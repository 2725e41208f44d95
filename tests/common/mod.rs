#![allow(dead_code)]

use std::fmt;

use rowql::query::executor::{Cursor, DataValue, MemoryTable, ResultRow, Row, SourceError, Table};

// The four rows used throughout the executor tests: id 1..=4, a = 1, b = 2
pub fn sample_rows() -> Vec<ResultRow> {
    (1..=4)
        .map(|id| {
            ResultRow::from_pairs([
                ("id", DataValue::Integer(id)),
                ("a", DataValue::Integer(1)),
                ("b", DataValue::Integer(2)),
            ])
        })
        .collect()
}

pub fn sample_table() -> MemoryTable {
    MemoryTable::new(sample_rows())
}

// A small table with mixed value types
pub fn people_table() -> MemoryTable {
    let people = [
        (1, "Alice", 25.5, true),
        (2, "Bob", 30.0, false),
        (3, "Charlie", 35.25, true),
        (4, "Dave", 40.0, true),
        (5, "Eve", 19.75, false),
    ];
    people
        .into_iter()
        .map(|(id, name, score, active)| {
            ResultRow::from_pairs([
                ("id", DataValue::Integer(id)),
                ("name", DataValue::Text(name.to_string())),
                ("score", DataValue::Float(score)),
                ("active", DataValue::Boolean(active)),
            ])
        })
        .collect()
}

// Extract the integer `id` of each result row
pub fn ids(rows: &[ResultRow]) -> Vec<i64> {
    rows.iter()
        .filter_map(|row| match row.get("id") {
            Some(DataValue::Integer(id)) => Some(*id),
            _ => None,
        })
        .collect()
}

#[derive(Debug)]
pub struct SourceFailure(pub &'static str);

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source failure: {}", self.0)
    }
}

impl std::error::Error for SourceFailure {}

// Table whose cursor yields `rows` and then fails, or fails to open at all
pub struct FailingTable {
    pub rows: Vec<ResultRow>,
    pub fail_open: bool,
}

pub struct FailingCursor {
    rows: Vec<ResultRow>,
    index: Option<usize>,
    failed: bool,
}

impl Table for FailingTable {
    type Cursor = FailingCursor;

    fn new_cursor(&self) -> Result<FailingCursor, SourceError> {
        if self.fail_open {
            return Err(Box::new(SourceFailure("cannot open")));
        }
        Ok(FailingCursor {
            rows: self.rows.clone(),
            index: None,
            failed: false,
        })
    }
}

impl Cursor for FailingCursor {
    fn next(&mut self) -> bool {
        let next = self.index.map_or(0, |i| i + 1);
        if next < self.rows.len() {
            self.index = Some(next);
            true
        } else {
            self.failed = true;
            false
        }
    }

    fn row(&self) -> &dyn Row {
        &self.rows[self.index.unwrap_or(0)]
    }

    fn err(&mut self) -> Option<SourceError> {
        if self.failed {
            Some(Box::new(SourceFailure("read past end")))
        } else {
            None
        }
    }
}
