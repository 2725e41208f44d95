use rowql::query::executor::{DataValue, Executor, ExecutorConfig, MatchMode, MemoryTable, ResultRow};
use rowql::query::parser::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build an in-memory table
    println!("Creating table...");
    let table: MemoryTable = [
        (1, "alice", "engineering", 120.5),
        (2, "bob", "sales", 80.0),
        (3, "carol", "engineering", 99.25),
        (4, "dave", "support", 60.0),
        (5, "erin", "engineering", 150.0),
    ]
    .into_iter()
    .map(|(id, name, team, salary)| {
        ResultRow::from_pairs([
            ("id", DataValue::Integer(id)),
            ("name", DataValue::Text(name.to_string())),
            ("team", DataValue::Text(team.to_string())),
            ("salary", DataValue::Float(salary)),
        ])
    })
    .collect();
    println!("Table has {} rows", table.len());

    let mut parser = Parser::new();
    let executor = Executor::with_config(
        table,
        ExecutorConfig {
            match_mode: MatchMode::Pattern,
        },
    );

    let queries = [
        "SELECT *",
        "SELECT * WHERE team = \"engineering\", salary > 100",
        "SELECT * WHERE name matches \"^[a-c]\" LIMIT 2",
        "SELECT * ORDER BY salary DESC",
        "SELECT * WHERE salary >",
    ];

    for query in queries {
        println!("\n--- {} ---", query);

        let description = match parser.parse(query) {
            Ok(description) => description,
            Err(e) => {
                println!("Parse failed: {}", e);
                continue;
            }
        };
        println!("Parsed: {}", description);
        println!("Syntax tree:\n{}", parser.render_syntax_tree());

        match executor.execute(&description) {
            Ok(result) => {
                println!("{} row(s)", result.row_count());
                println!("{}", result.to_string_table().trim_end());
            }
            Err(e) => println!("Execution failed: {}", e),
        }
    }

    Ok(())
}
