// Row Source Contracts
//
// The executor reads rows through these traits; the storage behind them is
// supplied by the caller. `MemoryTable` is a small in-memory source for
// embedding and testing.

use std::error::Error;

use crate::query::executor::result::{DataValue, ResultRow};

/// Error reported by a row source, passed through to the caller unchanged
pub type SourceError = Box<dyn Error + Send + Sync + 'static>;

/// A single row as seen through a cursor
pub trait Row {
    /// Names of the fields present in this row
    fn fields(&self) -> Vec<&str>;

    /// Value of a field, `None` when the row does not have it
    fn get(&self, field: &str) -> Option<&DataValue>;
}

/// Stateful iterator over the rows of a table
pub trait Cursor {
    /// Advance to the next row; false once the cursor is exhausted or failed
    fn next(&mut self) -> bool;

    /// Current row, valid after `next` returned true
    fn row(&self) -> &dyn Row;

    /// Terminal error, checked after `next` returned false. `None` means the
    /// rows ran out cleanly.
    fn err(&mut self) -> Option<SourceError>;
}

/// Factory of fresh cursors
pub trait Table {
    type Cursor: Cursor;

    fn new_cursor(&self) -> Result<Self::Cursor, SourceError>;
}

/// Table over a vector of rows held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    rows: Vec<ResultRow>,
}

impl MemoryTable {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        MemoryTable { rows }
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<ResultRow> for MemoryTable {
    fn from_iter<I: IntoIterator<Item = ResultRow>>(iter: I) -> Self {
        MemoryTable::new(iter.into_iter().collect())
    }
}

impl Table for MemoryTable {
    type Cursor = MemoryCursor;

    fn new_cursor(&self) -> Result<MemoryCursor, SourceError> {
        Ok(MemoryCursor {
            rows: self.rows.clone(),
            index: None,
        })
    }
}

/// Cursor over a snapshot of a `MemoryTable`
#[derive(Debug)]
pub struct MemoryCursor {
    rows: Vec<ResultRow>,
    index: Option<usize>,
}

impl Cursor for MemoryCursor {
    fn next(&mut self) -> bool {
        let next = self.index.map_or(0, |i| i + 1);
        self.index = Some(next.min(self.rows.len()));
        next < self.rows.len()
    }

    fn row(&self) -> &dyn Row {
        match self.index.and_then(|i| self.rows.get(i)) {
            Some(row) => row,
            None => &EmptyRow,
        }
    }

    fn err(&mut self) -> Option<SourceError> {
        None
    }
}

/// Stand-in returned before the first `next` or after exhaustion
struct EmptyRow;

impl Row for EmptyRow {
    fn fields(&self) -> Vec<&str> {
        Vec::new()
    }

    fn get(&self, _field: &str) -> Option<&DataValue> {
        None
    }
}
