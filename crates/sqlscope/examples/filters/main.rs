//! Example showing how one filtered query renders across dialects.
//!
//! Run with:
//!   cargo run --example filters -p sqlscope
//!
//! No database is needed; statements are only built and printed.

use sqlscope::prelude::*;

/// Search form where every field is optional.
#[derive(Debug, Default)]
struct EmployeeSearch {
    name_prefix: Option<String>,
    min_salary: Option<i32>,
    max_salary: Option<i32>,
    departments: Vec<i32>,
}

fn main() -> SqlResult<()> {
    let employee = TableDef::builder("employee")
        .identity("id", SqlType::Int)
        .column("name", SqlType::Text)
        .column("salary", SqlType::Int)
        .nullable("department_id", SqlType::Int)
        .nullable("manager_id", SqlType::Int)
        .build()?;
    let id = employee.column::<i32>("id")?;
    let name = employee.column::<String>("name")?;
    let salary = employee.column::<i32>("salary")?;
    let department_id = employee.column::<i32>("department_id")?;
    let manager_id = employee.column::<i32>("manager_id")?;

    let search = EmployeeSearch {
        name_prefix: Some("A_".into()),
        min_salary: Some(1000),
        ..Default::default()
    };

    // Absent fields drop out on their own.
    let active = Filter::new(|w| {
        w.is_not_null(&department_id);
    });
    let query = dsl::from(&employee)
        .filter_by(&active)
        .filter(|w| {
            w.starts_with(&name, search.name_prefix.as_deref());
            w.greater_eq(&salary, search.min_salary);
            w.less_eq(&salary, search.max_salary);
            if !search.departments.is_empty() {
                w.in_list(&department_id, search.departments.iter().copied());
            }
        })
        .order_by(name.asc())
        .limit(20);

    let config = DatabaseConfig::new(DialectKind::Postgres);
    println!("configured: {}", config.build(&query)?);

    for dialect in [
        DialectKind::Postgres,
        DialectKind::MySql,
        DialectKind::Sqlite,
        DialectKind::SqlServer,
    ] {
        let dialect = dialect.dialect();
        let statement = query.build(&*dialect)?;
        println!("{:>10}: {}", dialect.name(), statement.sql());
        println!("{:>10}  {:?}", "", statement.values());
    }

    // Self-join: each reference to the same table gets its own alias.
    let manager = employee.alias();
    let manager_id_col = manager.column::<i32>("id")?;
    let manager_salary = manager.column::<i32>("salary")?;
    let underpaid_bosses = dsl::from(&employee)
        .inner_join(&manager, |on| {
            on.eq(&manager_id, &manager_id_col);
        })
        .filter(|w| {
            w.greater(&salary, &manager_salary);
        })
        .dry_run(&PostgresDialect)?;
    println!("self join: {underpaid_bosses}");

    // Correlated sub-query using the outer reference explicitly.
    let top_earners = dsl::from(&employee)
        .filter(|w| {
            w.not_exists(dsl::from(&employee).filter(|w| {
                w.greater(&salary, outer(&salary));
            }));
        })
        .build(&MySqlDialect)?;
    println!("top earners: {top_earners}");

    // Mutations refuse to touch every row unless told to.
    match dsl::delete(&employee).build(&PostgresDialect) {
        Err(SqlError::MissingWhereClause(msg)) => println!("rejected: {msg}"),
        other => println!("unexpected: {other:?}"),
    }
    let cleanup = dsl::delete(&employee)
        .filter(|w| {
            w.eq(&id, 42);
        })
        .build(&SqliteDialect)?;
    println!("delete: {cleanup}");

    Ok(())
}
