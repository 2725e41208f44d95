use anyhow::{anyhow, Result};
use rowql::query::executor::{DataValue, Executor, QueryError, Row};
use rowql::query::parser::parse;

#[path = "../common/mod.rs"]
mod common;

use common::{ids, sample_rows, sample_table, FailingTable, SourceFailure};

#[test]
fn test_filter_returns_rows_in_cursor_order() -> Result<()> {
    let executor = Executor::new(sample_table());
    let result = executor.execute(&parse("SELECT * WHERE id > 2")?)?;
    assert_eq!(ids(result.rows()), vec![3, 4]);

    let row = &result.rows()[0];
    assert_eq!(row.get("a"), Some(&DataValue::Integer(1)));
    assert_eq!(row.get("b"), Some(&DataValue::Integer(2)));
    Ok(())
}

#[test]
fn test_filters_are_conjunctive() -> Result<()> {
    let executor = Executor::new(sample_table());

    let result = executor.execute_str("SELECT * WHERE a = 1, b = 2, id <= 2")?;
    assert_eq!(ids(result.rows()), vec![1, 2]);

    let result = executor.execute_str("SELECT * WHERE a = 1, b = 3")?;
    assert!(result.is_empty());
    Ok(())
}

#[test]
fn test_no_filters_returns_everything() -> Result<()> {
    let executor = Executor::new(sample_table());
    let result = executor.execute_str("SELECT *")?;
    assert_eq!(ids(result.rows()), vec![1, 2, 3, 4]);
    Ok(())
}

#[test]
fn test_limit() -> Result<()> {
    let executor = Executor::new(sample_table());

    // Zero means no limit
    let result = executor.execute_str("SELECT * LIMIT 0")?;
    assert_eq!(result.row_count(), 4);

    let result = executor.execute_str("SELECT * LIMIT 3")?;
    assert_eq!(ids(result.rows()), vec![1, 2, 3]);

    let result = executor.execute_str("SELECT * WHERE id >= 2 LIMIT 1")?;
    assert_eq!(ids(result.rows()), vec![2]);

    let result = executor.execute_str("SELECT * LIMIT 100")?;
    assert_eq!(result.row_count(), 4);
    Ok(())
}

#[test]
fn test_unsupported_queries() -> Result<()> {
    let executor = Executor::new(sample_table());
    let unsupported = [
        "SELECT * GROUP BY a",
        "SELECT * ORDER BY id",
        "SELECT * ORDER BY id DESC",
        "SELECT sum(id)",
        "SELECT id, a",
        "SELECT a WHERE id > 2",
    ];

    for query in unsupported {
        match executor.execute_str(query) {
            Err(QueryError::Unsupported(_)) => {}
            other => return Err(anyhow!("{:?} gave {:?}", query, other.map(|r| r.row_count()))),
        }
    }

    Ok(())
}

#[test]
fn test_cursor_error_discards_rows() -> Result<()> {
    let table = FailingTable {
        rows: sample_rows(),
        fail_open: false,
    };
    let executor = Executor::new(table);

    let err = executor
        .execute_str("SELECT *")
        .err()
        .ok_or_else(|| anyhow!("expected a row source error"))?;
    match err {
        QueryError::RowSource(source) => {
            let failure = source
                .downcast_ref::<SourceFailure>()
                .ok_or_else(|| anyhow!("unexpected source error {}", source))?;
            assert_eq!(failure.0, "read past end");
        }
        other => return Err(anyhow!("unexpected error {}", other)),
    }

    // Stopping on the limit never reaches the failing read
    let result = executor.execute_str("SELECT * LIMIT 2")?;
    assert_eq!(ids(result.rows()), vec![1, 2]);
    Ok(())
}

#[test]
fn test_cursor_open_error() -> Result<()> {
    let executor = Executor::new(FailingTable {
        rows: Vec::new(),
        fail_open: true,
    });

    match executor.execute_str("SELECT *") {
        Err(QueryError::RowSource(source)) => {
            assert_eq!(source.to_string(), "source failure: cannot open");
        }
        other => return Err(anyhow!("unexpected outcome {:?}", other.map(|r| r.row_count()))),
    }

    // Unsupported queries are rejected before a cursor is requested
    assert!(matches!(
        executor.execute_str("SELECT * ORDER BY id"),
        Err(QueryError::Unsupported(_))
    ));
    Ok(())
}

#[test]
fn test_rows_are_copies() -> Result<()> {
    let executor = Executor::new(sample_table());
    let mut rows = executor.execute_str("SELECT * WHERE id = 1")?.into_rows();
    rows[0].set("id", DataValue::Integer(99));

    let again = executor.execute_str("SELECT * WHERE id = 1")?;
    assert_eq!(ids(again.rows()), vec![1]);
    Ok(())
}
