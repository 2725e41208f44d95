use anyhow::{anyhow, Result};
use rowql::query::executor::{
    DataValue, Executor, ExecutorConfig, MatchMode, MemoryTable, QueryError, ResultRow, Row,
};
use rowql::query::parser::{Parser, ParserConfig};

#[path = "../common/mod.rs"]
mod common;

use common::{ids, people_table};

#[test]
fn test_string_filters() -> Result<()> {
    let executor = Executor::new(people_table());

    let result = executor.execute_str(r#"SELECT * WHERE name = "Bob""#)?;
    assert_eq!(ids(result.rows()), vec![2]);

    let result = executor.execute_str(r#"SELECT * WHERE name != "Bob", id < 4"#)?;
    assert_eq!(ids(result.rows()), vec![1, 3]);

    let result = executor.execute_str(r#"SELECT * WHERE name >= "D""#)?;
    assert_eq!(ids(result.rows()), vec![4, 5]);
    Ok(())
}

#[test]
fn test_numeric_filters_across_types() -> Result<()> {
    let executor = Executor::new(people_table());

    let result = executor.execute_str("SELECT * WHERE score > 30")?;
    assert_eq!(ids(result.rows()), vec![3, 4]);

    let result = executor.execute_str("SELECT * WHERE score = 30.0, id = 2.0")?;
    assert_eq!(ids(result.rows()), vec![2]);

    // A string never equals a number
    let result = executor.execute_str(r#"SELECT * WHERE id = "2""#)?;
    assert!(result.is_empty());

    // Booleans are not comparable with filter values
    let result = executor.execute_str("SELECT * WHERE active = 1")?;
    assert!(result.is_empty());
    Ok(())
}

#[test]
fn test_nan_values_differ_from_every_number() -> Result<()> {
    let table: MemoryTable = [(1, f64::NAN), (2, 1.0), (3, f64::NAN)]
        .into_iter()
        .map(|(id, x)| ResultRow::from_pairs([("id", DataValue::Integer(id)), ("x", DataValue::Float(x))]))
        .collect();
    let executor = Executor::new(table);

    let result = executor.execute_str("SELECT * WHERE x != 1")?;
    assert_eq!(ids(result.rows()), vec![1, 3]);

    let result = executor.execute_str("SELECT * WHERE x <= 1")?;
    assert_eq!(ids(result.rows()), vec![2]);
    Ok(())
}

#[test]
fn test_substring_matches() -> Result<()> {
    let executor = Executor::new(people_table());

    let result = executor.execute_str(r#"SELECT * WHERE name matches "li""#)?;
    assert_eq!(ids(result.rows()), vec![1, 3]);

    let result = executor.execute_str(r#"SELECT * WHERE name MATCHES "e", id > 3"#)?;
    assert_eq!(ids(result.rows()), vec![4, 5]);

    // Case-sensitive
    let result = executor.execute_str(r#"SELECT * WHERE name matches "alice""#)?;
    assert!(result.is_empty());

    // Non-text columns never match
    let result = executor.execute_str(r#"SELECT * WHERE id matches "1""#)?;
    assert!(result.is_empty());
    Ok(())
}

#[test]
fn test_pattern_matches() -> Result<()> {
    let executor = Executor::with_config(
        people_table(),
        ExecutorConfig {
            match_mode: MatchMode::Pattern,
        },
    );

    let result = executor.execute_str(r#"SELECT * WHERE name matches "^[A-C]""#)?;
    assert_eq!(ids(result.rows()), vec![1, 2, 3]);

    match executor.execute_str(r#"SELECT * WHERE name matches "(""#) {
        Err(QueryError::InvalidFilter(message)) => assert!(message.contains("(")),
        other => return Err(anyhow!("unexpected outcome {:?}", other.map(|r| r.row_count()))),
    }
    Ok(())
}

#[test]
fn test_parse_once_execute_many() -> Result<()> {
    let mut parser = Parser::with_config(ParserConfig {
        pretty_errors: true,
        ..ParserConfig::default()
    });
    let query = parser.parse("SELECT * WHERE active = \"yes\" LIMIT 2")?;

    let first = Executor::new(people_table());
    let second = Executor::new(common::sample_table());
    assert!(first.execute(&query)?.is_empty());
    assert!(second.execute(&query)?.is_empty());

    let query = parser.parse("SELECT * WHERE id > 1 LIMIT 2")?;
    assert_eq!(ids(first.execute(&query)?.rows()), vec![2, 3]);
    assert_eq!(ids(second.execute(&query)?.rows()), vec![2, 3]);
    Ok(())
}

#[test]
fn test_result_serialization() -> Result<()> {
    let executor = Executor::new(people_table());
    let result = executor.execute_str("SELECT * WHERE id = 3")?;

    let json = serde_json::to_value(&result)?;
    assert_eq!(
        json,
        serde_json::json!([
            {"id": 3, "name": "Charlie", "score": 35.25, "active": true}
        ])
    );

    // Field order follows the source row
    let row = &result.rows()[0];
    assert_eq!(row.fields(), vec!["id", "name", "score", "active"]);
    assert_eq!(row.get("score"), Some(&DataValue::Float(35.25)));
    Ok(())
}

#[test]
fn test_string_table() -> Result<()> {
    let executor = Executor::new(people_table());
    let table = executor.execute_str("SELECT * WHERE id <= 2")?.to_string_table();

    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "| id | name | score | active | ");
    assert!(lines[2].contains("\"Alice\""));
    assert!(lines[3].contains("\"Bob\""));

    let empty = executor.execute_str("SELECT * WHERE id > 100")?;
    assert_eq!(empty.to_string_table(), "Empty result");
    Ok(())
}

#[test]
fn test_errors_are_reported_through_query_error() -> Result<()> {
    let executor = Executor::new(people_table());

    let err = executor
        .execute_str("SELECT * WHERE name =")
        .err()
        .ok_or_else(|| anyhow!("expected a parse error"))?;
    assert!(matches!(err, QueryError::Parse(_)));
    assert!(err.to_string().starts_with("parse error near"));

    let err = executor
        .execute_str("SELECT * ORDER BY name")
        .err()
        .ok_or_else(|| anyhow!("expected an unsupported query"))?;
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("ORDER BY"));
    Ok(())
}
