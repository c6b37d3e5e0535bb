use super::*;
use crate::config::{DatabaseConfig, DialectKind};
use crate::dialect::{
    DryRunDialect, H2Dialect, MySqlDialect, PostgresDialect, SqlServerDialect, SqliteDialect,
};
use crate::dsl::{self, Filter, LockWait, outer};
use crate::error::SqlError;
use crate::meta::{Column, Table, TableDef};
use crate::value::{Bound, SqlType, Value};

struct Employee {
    table: Table,
    id: Column<i32>,
    name: Column<String>,
    salary: Column<i32>,
    manager_id: Column<i32>,
}

impl Employee {
    fn new() -> Self {
        let table = TableDef::builder("employee")
            .identity("id", SqlType::Int)
            .column("name", SqlType::Text)
            .column("salary", SqlType::Int)
            .nullable("manager_id", SqlType::Int)
            .build()
            .unwrap();
        Self::of(table)
    }

    fn of(table: Table) -> Self {
        Self {
            id: table.column("id").unwrap(),
            name: table.column("name").unwrap(),
            salary: table.column("salary").unwrap(),
            manager_id: table.column("manager_id").unwrap(),
            table,
        }
    }

    fn alias(&self) -> Self {
        Self::of(self.table.alias())
    }

    fn row(name: &str, salary: i32, manager: Option<i32>) -> Vec<Value> {
        vec![Value::Null, Value::from(name), Value::Int(salary), manager.into()]
    }
}

struct Address {
    table: Table,
    id: Column<i32>,
    employee_id: Column<i32>,
    street: Column<String>,
}

impl Address {
    fn new() -> Self {
        let table = TableDef::builder("address")
            .id("id", SqlType::Int)
            .column("employee_id", SqlType::Int)
            .column("street", SqlType::Text)
            .build()
            .unwrap();
        Self {
            id: table.column("id").unwrap(),
            employee_id: table.column("employee_id").unwrap(),
            street: table.column("street").unwrap(),
            table,
        }
    }

    fn row(id: i32, employee_id: i32, street: &str) -> Vec<Value> {
        vec![Value::Int(id), Value::Int(employee_id), Value::from(street)]
    }
}

const EMPLOYEE_COLUMNS: &str =
    "select employee.id, employee.name, employee.salary, employee.manager_id from employee";

fn sql<Q: BuildStatement<Output = Statement>>(query: &Q, dialect: &dyn Dialect) -> String {
    query.build(dialect).unwrap().sql().to_string()
}

fn int(v: i32) -> Bound {
    Bound::new(v, SqlType::Int)
}

// ==================== select ====================

#[test]
fn select_all_columns() {
    let e = Employee::new();
    assert_eq!(sql(&dsl::from(&e.table), &PostgresDialect), EMPLOYEE_COLUMNS);
}

#[test]
fn select_eq_binds_value() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.eq(&e.name, "SMITH");
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!("{EMPLOYEE_COLUMNS} where employee.name = $1")
    );
    assert_eq!(stmt.values(), &[Bound::text("SMITH")]);
}

#[test]
fn placeholders_per_dialect() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.eq(&e.salary, 10);
        w.less(&e.id, 5);
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} where employee.salary = $1 and employee.id < $2")
    );
    assert_eq!(
        sql(&query, &MySqlDialect),
        format!("{EMPLOYEE_COLUMNS} where employee.salary = ? and employee.id < ?")
    );
}

#[test]
fn absent_optional_literal_skips_criterion() {
    let e = Employee::new();
    let name: Option<&str> = None;
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.eq(&e.name, name);
            w.greater_eq(&e.salary, None::<i32>);
            w.like(&e.name, name);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(stmt.sql(), EMPLOYEE_COLUMNS);
    assert!(stmt.values().is_empty());
}

#[test]
fn comparison_operators() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.not_eq(&e.salary, 1);
        w.less_eq(&e.salary, 2);
        w.greater(&e.salary, 3);
        w.greater_eq(&e.salary, 4);
    });
    assert_eq!(
        sql(&query, &MySqlDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where employee.salary <> ? and employee.salary <= ? \
             and employee.salary > ? and employee.salary >= ?"
        )
    );
}

#[test]
fn greater_with_literal_on_left_is_strict() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.greater(1000, &e.salary);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!("{EMPLOYEE_COLUMNS} where $1 > employee.salary")
    );
    assert_eq!(stmt.values(), &[int(1000)]);
}

#[test]
fn null_checks() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.is_null(&e.manager_id);
        w.is_not_null(&e.name);
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} where employee.manager_id is null and employee.name is not null")
    );
}

#[test]
fn or_group_is_parenthesized() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.eq(&e.salary, 100);
            w.or(|w| {
                w.is_null(&e.manager_id);
                w.eq(&e.manager_id, 1);
            });
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!(
            "{EMPLOYEE_COLUMNS} where employee.salary = $1 and \
             (employee.manager_id is null or employee.manager_id = $2)"
        )
    );
    assert_eq!(stmt.values(), &[int(100), int(1)]);
}

#[test]
fn single_child_group_is_not_parenthesized() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.or(|w| {
            w.is_null(&e.manager_id);
        });
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} where employee.manager_id is null")
    );
}

#[test]
fn empty_groups_add_nothing() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.or(|_| {});
        w.and(|w| {
            w.eq(&e.salary, None::<i32>);
        });
        w.not(|_| {});
    });
    assert_eq!(sql(&query, &PostgresDialect), EMPLOYEE_COLUMNS);
}

#[test]
fn not_group() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.not(|w| {
            w.eq(&e.salary, 1);
            w.eq(&e.name, "a");
        });
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} where not (employee.salary = $1 and employee.name = $2)")
    );
}

#[test]
fn nested_and_inside_or() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.or(|w| {
            w.and(|w| {
                w.eq(&e.salary, 1);
                w.eq(&e.name, "a");
            });
            w.eq(&e.salary, 2);
        });
    });
    assert_eq!(
        sql(&query, &MySqlDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where ((employee.salary = ? and employee.name = ?) \
             or employee.salary = ?)"
        )
    );
}

#[test]
fn repeated_filter_calls_are_conjoined() {
    let e = Employee::new();
    let query = dsl::from(&e.table)
        .filter(|w| {
            w.eq(&e.salary, 1);
        })
        .filter(|w| {
            w.eq(&e.name, "a");
        });
    assert_eq!(
        sql(&query, &MySqlDialect),
        format!("{EMPLOYEE_COLUMNS} where employee.salary = ? and employee.name = ?")
    );
}

#[test]
fn reusable_filters_compose() {
    let e = Employee::new();
    let rich = Filter::new(|w| {
        w.greater(&e.salary, 1000);
    });
    let named = Filter::new(|w| {
        w.eq(&e.name, "a");
    });
    let query = dsl::from(&e.table).filter_by(&(rich + named));
    assert_eq!(
        sql(&query, &MySqlDialect),
        format!("{EMPLOYEE_COLUMNS} where employee.salary > ? and employee.name = ?")
    );
}

// ==================== like ====================

#[test]
fn like_plain_pattern_is_verbatim() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.like(&e.name, "S%");
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(stmt.sql(), format!("{EMPLOYEE_COLUMNS} where employee.name like $1"));
    assert_eq!(stmt.values(), &[Bound::text("S%")]);
}

#[test]
fn starts_with_escapes_and_binds_escape() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.starts_with(&e.name, "a_b");
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!("{EMPLOYEE_COLUMNS} where employee.name like $1 escape $2")
    );
    assert_eq!(stmt.values(), &[Bound::text("a\\_b%"), Bound::text("\\")]);
}

#[test]
fn like_options_wrap_wildcards() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.contains(&e.name, "50%");
            w.not_ends_with(&e.name, "x");
            w.like(&e.name, dsl::escape("a\\b"));
        })
        .build(&MySqlDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!(
            "{EMPLOYEE_COLUMNS} where employee.name like ? escape ? \
             and employee.name not like ? escape ? and employee.name like ? escape ?"
        )
    );
    let patterns: Vec<_> = stmt.values().iter().step_by(2).cloned().collect();
    assert_eq!(
        patterns,
        vec![
            Bound::text("%50\\%%"),
            Bound::text("%x"),
            Bound::text("a\\\\b")
        ]
    );
}

#[test]
fn escape_sequence_from_options() {
    let e = Employee::new();
    let query = dsl::from(&e.table)
        .filter(|w| {
            w.starts_with(&e.name, "a_b!");
        })
        .options(QueryOptions::new().escape_sequence("!"));
    let stmt = query.build(&PostgresDialect).unwrap();
    assert_eq!(stmt.values(), &[Bound::text("a!_b!!%"), Bound::text("!")]);
}

#[test]
fn empty_escape_sequence_disables_escaping() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.starts_with(&e.name, "a_b");
        })
        .options(QueryOptions::new().escape_sequence(""))
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(stmt.sql(), format!("{EMPLOYEE_COLUMNS} where employee.name like $1"));
    assert_eq!(stmt.values(), &[Bound::text("a_b%")]);
}

#[test]
fn sqlserver_escapes_brackets() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.contains(&e.name, "[x]");
        })
        .build(&SqlServerDialect)
        .unwrap();
    assert_eq!(stmt.values()[0], Bound::text("%\\[x]%"));
}

#[test]
fn composite_pattern_escapes_each_fragment() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.like(
                &e.name,
                dsl::escape("\\S") + dsl::text("%") + dsl::escape("T _16%"),
            );
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!("{EMPLOYEE_COLUMNS} where employee.name like $1 escape $2")
    );
    assert_eq!(
        stmt.values(),
        &[Bound::text("\\\\S%T \\_16\\%"), Bound::text("\\")]
    );
}

#[test]
fn composite_pattern_of_plain_fragments_has_no_escape_clause() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.not_like(&e.name, dsl::text("A") + dsl::text("%"));
        })
        .build(&MySqlDialect)
        .unwrap();
    assert_eq!(stmt.sql(), format!("{EMPLOYEE_COLUMNS} where employee.name not like ?"));
    assert_eq!(stmt.values(), &[Bound::text("A%")]);
}

#[test]
fn composite_pattern_with_absent_fragment_is_skipped() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.like(&e.name, dsl::text("%") + dsl::escape(None::<&str>));
    });
    assert_eq!(sql(&query, &PostgresDialect), EMPLOYEE_COLUMNS);
}

// ==================== ranges and membership ====================

#[test]
fn between_binds_both_ends() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.between(&e.salary, 1..=10);
            w.not_between(&e.id, 5..=6);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!(
            "{EMPLOYEE_COLUMNS} where employee.salary between $1 and $2 \
             and employee.id not between $3 and $4"
        )
    );
    assert_eq!(stmt.values(), &[int(1), int(10), int(5), int(6)]);
}

#[test]
fn in_list() {
    let e = Employee::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.in_list(&e.salary, [1, 2, 3]);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!("{EMPLOYEE_COLUMNS} where employee.salary in ($1, $2, $3)")
    );
    assert_eq!(stmt.values().len(), 3);
}

#[test]
fn empty_in_list_is_always_false() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.in_list(&e.salary, Vec::<i32>::new());
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} where 1 = 0")
    );
}

#[test]
fn empty_not_in_list_is_always_true() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.not_in_list(&e.salary, Vec::<i32>::new());
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} where 1 = 1")
    );
}

#[test]
fn in_list2_uses_row_values() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.in_list2(
            (&e.salary, &e.name),
            [(1, "a".to_string()), (2, "b".to_string())],
        );
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where (employee.salary, employee.name) in (($1, $2), ($3, $4))"
        )
    );
}

#[test]
fn in_list2_expands_without_row_values() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.not_in_list2(
            (&e.salary, &e.name),
            [(1, "a".to_string()), (2, "b".to_string())],
        );
    });
    assert_eq!(
        sql(&query, &SqliteDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where not ((employee.salary = ? and employee.name = ?) \
             or (employee.salary = ? and employee.name = ?))"
        )
    );
}

#[test]
fn empty_in_list2() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.in_list2((&e.salary, &e.name), Vec::<(i32, String)>::new());
    });
    assert_eq!(
        sql(&query, &SqliteDialect),
        format!("{EMPLOYEE_COLUMNS} where 1 = 0")
    );
}

// ==================== sub-queries ====================

#[test]
fn in_subquery_shares_the_parameter_sequence() {
    let e = Employee::new();
    let a = Address::new();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.eq(&e.name, "a");
            w.in_subquery(
                &e.id,
                dsl::from(&a.table)
                    .filter(|w| {
                        w.eq(&a.street, "x");
                    })
                    .select(&a.employee_id),
            );
            w.eq(&e.salary, 3);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!(
            "{EMPLOYEE_COLUMNS} where employee.name = $1 and employee.id in \
             (select address.employee_id from address where address.street = $2) \
             and employee.salary = $3"
        )
    );
    assert_eq!(
        stmt.values(),
        &[Bound::text("a"), Bound::text("x"), int(3)]
    );
}

#[test]
fn correlated_exists_resolves_outer_table() {
    let e = Employee::new();
    let a = Address::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.exists(dsl::from(&a.table).filter(|w| {
            w.eq(&a.employee_id, &e.id);
        }));
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where exists (select address.id, address.employee_id, \
             address.street from address where address.employee_id = employee.id)"
        )
    );
}

#[test]
fn same_table_in_sub_query_gets_its_own_alias() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.not_exists(dsl::from(&e.table).filter(|w| {
            w.greater(&e.salary, outer(&e.salary));
        }));
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where not exists (select employee_1.id, employee_1.name, \
             employee_1.salary, employee_1.manager_id from employee employee_1 \
             where employee_1.salary > employee.salary)"
        )
    );
}

#[test]
fn in_subquery2() {
    let e = Employee::new();
    let a = Address::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.in_subquery2(
            (&e.id, &e.salary),
            dsl::from(&a.table).select_pair(&a.employee_id, &a.id),
        );
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where (employee.id, employee.salary) in \
             (select address.employee_id, address.id from address)"
        )
    );
    let err = query.build(&SqlServerDialect).unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn column_of_unknown_table_is_rejected() {
    let e = Employee::new();
    let a = Address::new();
    let err = dsl::from(&e.table)
        .filter(|w| {
            w.eq(&a.street, "x");
        })
        .build(&PostgresDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::UnknownTable { ref table, ref column }
        if table == "address" && column == "street"));
}

#[test]
fn reusable_filter_with_sub_query_at_two_levels() {
    let e = Employee::new();
    let inner = e.alias();
    let a = Address::new();
    let has_address = Filter::new(|w| {
        w.exists(dsl::from(&a.table).filter(|w| {
            w.eq(&a.employee_id, &e.id);
        }));
    });
    let query = dsl::from(&e.table).filter_by(&has_address).filter(|w| {
        w.in_subquery(
            &e.id,
            dsl::from(&inner.table)
                .filter_by(&has_address)
                .select(&inner.id),
        );
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where exists (select address.id, address.employee_id, \
             address.street from address where address.employee_id = employee.id) \
             and employee.id in (select employee_1.id from employee employee_1 where exists \
             (select address_1.id, address_1.employee_id, address_1.street from address \
             address_1 where address_1.employee_id = employee.id))"
        )
    );
}

#[test]
fn scalar_sub_query_in_comparison() {
    let e = Employee::new();
    let m = e.alias();
    let stmt = dsl::from(&e.table)
        .filter(|w| {
            w.eq(
                &e.manager_id,
                dsl::from(&m.table)
                    .filter(|w| {
                        w.less(&m.salary, 100);
                    })
                    .select(dsl::max(&m.id)),
            );
            w.eq(&e.name, "a");
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        format!(
            "{EMPLOYEE_COLUMNS} where employee.manager_id = (select max(employee_1.id) \
             from employee employee_1 where employee_1.salary < $1) and employee.name = $2"
        )
    );
    assert_eq!(stmt.values(), &[int(100), Bound::text("a")]);
}

#[test]
fn scalar_sub_query_on_the_left() {
    let e = Employee::new();
    let a = Address::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.greater(
            dsl::from(&a.table)
                .filter(|w| {
                    w.eq(&a.employee_id, &e.id);
                })
                .select(dsl::count_all()),
            1i64,
        );
    });
    assert_eq!(
        sql(&query, &MySqlDialect),
        format!(
            "{EMPLOYEE_COLUMNS} where (select count(*) from address \
             where address.employee_id = employee.id) > ?"
        )
    );
}

#[test]
fn sub_query_in_select_list() {
    let e = Employee::new();
    let a = Address::new();
    let stmt = dsl::from(&e.table)
        .add_column(&e.name)
        .add_column(
            dsl::from(&a.table)
                .filter(|w| {
                    w.eq(&a.employee_id, &e.id);
                    w.starts_with(&a.street, "Main");
                })
                .select(dsl::count_all()),
        )
        .filter(|w| {
            w.greater(&e.salary, 10);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "select employee.name, (select count(*) from address \
         where address.employee_id = employee.id and address.street like $1 escape $2) \
         from employee where employee.salary > $3"
    );
    assert_eq!(
        stmt.values(),
        &[Bound::text("Main%"), Bound::text("\\"), int(10)]
    );
}

#[test]
fn aggregates_in_select_list() {
    let e = Employee::new();
    let query = dsl::from(&e.table)
        .add_column(dsl::count(&e.manager_id))
        .add_column(dsl::max(&e.salary))
        .add_column(dsl::min(&e.salary));
    assert_eq!(
        sql(&query, &PostgresDialect),
        "select count(employee.manager_id), max(employee.salary), min(employee.salary) \
         from employee"
    );
}

// ==================== joins ====================

#[test]
fn inner_join() {
    let e = Employee::new();
    let a = Address::new();
    let query = dsl::from(&e.table).inner_join(&a.table, |on| {
        on.eq(&a.employee_id, &e.id);
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} inner join address on address.employee_id = employee.id")
    );
}

#[test]
fn self_join_aliases_second_reference() {
    let e = Employee::new();
    let m = e.alias();
    let query = dsl::from(&e.table)
        .left_join(&m.table, |on| {
            on.eq(&e.manager_id, &m.id);
        })
        .filter(|w| {
            w.eq(&m.name, "BOSS");
        });
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!(
            "{EMPLOYEE_COLUMNS} left outer join employee employee_1 \
             on employee.manager_id = employee_1.id where employee_1.name = $1"
        )
    );
}

#[test]
fn same_reference_twice_is_rejected() {
    let e = Employee::new();
    let err = dsl::from(&e.table)
        .inner_join(&e.table, |_| {})
        .build(&PostgresDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));
}

#[test]
fn quoted_identifiers_follow_dialect() {
    let order = TableDef::builder("\"Order\"")
        .id("id", SqlType::Int)
        .column("\"group\"", SqlType::Text)
        .build()
        .unwrap();
    let group = order.column::<String>("group").unwrap();
    let query = dsl::from(&order).filter(|w| {
        w.eq(&group, "g");
    });
    assert_eq!(
        sql(&query, &PostgresDialect),
        r#"select "Order".id, "Order"."group" from "Order" where "Order"."group" = $1"#
    );
    assert_eq!(
        sql(&query, &MySqlDialect),
        "select `Order`.id, `Order`.`group` from `Order` where `Order`.`group` = ?"
    );
    assert_eq!(
        sql(&query, &SqlServerDialect),
        "select [Order].id, [Order].[group] from [Order] where [Order].[group] = ?"
    );

    let other = order.alias();
    let query = dsl::from(&order).inner_join(&other, |_| {});
    assert!(sql(&query, &PostgresDialect).ends_with(r#"from "Order" inner join "Order" order_1 on 1 = 1"#));
}

#[test]
fn schema_qualifies_table_but_not_columns() {
    let t = TableDef::builder("employee")
        .schema("hr")
        .id("id", SqlType::Int)
        .build()
        .unwrap();
    assert_eq!(
        sql(&dsl::from(&t), &PostgresDialect),
        "select employee.id from hr.employee"
    );
}

// ==================== projection, ordering, paging, locking ====================

#[test]
fn explicit_columns_and_distinct() {
    let e = Employee::new();
    let query = dsl::from(&e.table)
        .distinct()
        .add_column(&e.name)
        .add_column(&e.salary);
    assert_eq!(
        sql(&query, &PostgresDialect),
        "select distinct employee.name, employee.salary from employee"
    );
}

#[test]
fn order_limit_offset_postgres() {
    let e = Employee::new();
    let query = dsl::from(&e.table)
        .order_by(e.name.desc())
        .order_by(&e.id)
        .limit(10)
        .offset(20);
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} order by employee.name desc, employee.id asc limit 10 offset 20")
    );
}

#[test]
fn offset_without_limit_per_dialect() {
    let e = Employee::new();
    let query = dsl::from(&e.table).offset(5);
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} offset 5")
    );
    assert_eq!(
        sql(&query, &MySqlDialect),
        format!("{EMPLOYEE_COLUMNS} limit 18446744073709551615 offset 5")
    );
    assert_eq!(
        sql(&query, &SqliteDialect),
        format!("{EMPLOYEE_COLUMNS} limit -1 offset 5")
    );
}

#[test]
fn sqlserver_paging_requires_order() {
    let e = Employee::new();
    let query = dsl::from(&e.table).limit(10);
    assert_eq!(
        sql(&query, &SqlServerDialect),
        format!("{EMPLOYEE_COLUMNS} order by (select null) offset 0 rows fetch next 10 rows only")
    );
    let query = dsl::from(&e.table).order_by(&e.id).offset(3);
    assert_eq!(
        sql(&query, &SqlServerDialect),
        format!("{EMPLOYEE_COLUMNS} order by employee.id asc offset 3 rows")
    );
}

#[test]
fn nulls_ordering_needs_support() {
    let e = Employee::new();
    let query = dsl::from(&e.table).order_by(e.manager_id.asc().nulls_last());
    assert_eq!(
        sql(&query, &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} order by employee.manager_id asc nulls last")
    );
    assert!(query.build(&MySqlDialect).unwrap_err().is_unsupported());
}

#[test]
fn for_update_variants() {
    let e = Employee::new();
    assert_eq!(
        sql(&dsl::from(&e.table).for_update(), &PostgresDialect),
        format!("{EMPLOYEE_COLUMNS} for update")
    );
    assert_eq!(
        sql(
            &dsl::from(&e.table).limit(1).for_update_with(LockWait::SkipLocked),
            &MySqlDialect
        ),
        format!("{EMPLOYEE_COLUMNS} limit 1 for update skip locked")
    );
    assert_eq!(
        sql(&dsl::from(&e.table).for_update_with(LockWait::NoWait), &H2Dialect),
        format!("{EMPLOYEE_COLUMNS} for update nowait")
    );
    let err = dsl::from(&e.table).for_update().build(&SqliteDialect).unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn building_twice_is_identical() {
    let e = Employee::new();
    let m = e.alias();
    let query = dsl::from(&e.table)
        .left_join(&m.table, |on| {
            on.eq(&e.manager_id, &m.id);
        })
        .filter(|w| {
            w.exists(dsl::from(&e.table).filter(|w| {
                w.eq(&e.id, outer(&m.id));
            }));
        });
    assert_eq!(
        query.build(&PostgresDialect).unwrap(),
        query.build(&PostgresDialect).unwrap()
    );
}

// ==================== delete / update ====================

#[test]
fn delete_with_where() {
    let e = Employee::new();
    let stmt = dsl::delete(&e.table)
        .filter(|w| {
            w.eq(&e.id, 5);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(stmt.sql(), "delete from employee where employee.id = $1");
    assert_eq!(stmt.values(), &[int(5)]);
}

#[test]
fn delete_without_where_is_rejected_unless_allowed() {
    let e = Employee::new();
    let err = dsl::delete(&e.table).build(&PostgresDialect).unwrap_err();
    assert!(matches!(err, SqlError::MissingWhereClause(_)));

    // A filter that null-skipped everything counts as missing.
    let err = dsl::delete(&e.table)
        .filter(|w| {
            w.eq(&e.id, None::<i32>);
        })
        .build(&PostgresDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::MissingWhereClause(_)));

    let allowed = dsl::delete(&e.table)
        .options(QueryOptions::new().allow_missing_where_clause(true))
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(allowed.sql(), "delete from employee");
}

#[test]
fn config_defaults_apply_when_query_has_no_options() {
    let e = Employee::new();
    let config = DatabaseConfig::new(DialectKind::MySql)
        .options(QueryOptions::new().allow_missing_where_clause(true));
    let stmt = config.build(&dsl::delete(&e.table)).unwrap();
    assert_eq!(stmt.sql(), "delete from employee");

    let strict = dsl::delete(&e.table).options(QueryOptions::new());
    assert!(config.build(&strict).is_err());
}

#[test]
fn update_sets_and_filters() {
    let e = Employee::new();
    let stmt = dsl::update(&e.table)
        .set(|s| {
            s.set(&e.salary, 200);
            s.set(&e.manager_id, None::<i32>);
        })
        .filter(|w| {
            w.eq(&e.id, 1);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "update employee set salary = $1, manager_id = $2 where employee.id = $3"
    );
    assert_eq!(
        stmt.values(),
        &[int(200), Bound::new(Value::Null, SqlType::Int), int(1)]
    );
}

#[test]
fn update_from_another_column() {
    let e = Employee::new();
    let stmt = dsl::update(&e.table)
        .set(|s| {
            s.set_column(&e.manager_id, &e.id);
        })
        .filter(|w| {
            w.is_null(&e.manager_id);
        })
        .build(&MySqlDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "update employee set manager_id = employee.id where employee.manager_id is null"
    );
}

#[test]
fn update_set_from_sub_query() {
    let e = Employee::new();
    let a = Address::new();
    let stmt = dsl::update(&e.table)
        .set(|s| {
            s.set(
                &e.salary,
                dsl::from(&a.table)
                    .filter(|w| {
                        w.eq(&a.employee_id, &e.id);
                    })
                    .select(dsl::max(&a.id)),
            );
        })
        .filter(|w| {
            w.eq(&e.id, 1);
        })
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "update employee set salary = (select max(address.id) from address \
         where address.employee_id = employee.id) where employee.id = $1"
    );
    assert_eq!(stmt.values(), &[int(1)]);
}

#[test]
fn update_rejections() {
    let e = Employee::new();
    let err = dsl::update(&e.table)
        .filter(|w| {
            w.eq(&e.id, 1);
        })
        .build(&PostgresDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));

    let err = dsl::update(&e.table)
        .set(|s| {
            s.set(&e.salary, 1);
        })
        .build(&PostgresDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::MissingWhereClause(_)));

    let other = e.alias();
    let err = dsl::update(&e.table)
        .set(|s| {
            s.set(&other.salary, 1);
        })
        .filter(|w| {
            w.eq(&e.id, 1);
        })
        .build(&PostgresDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));
}

// ==================== insert ====================

#[test]
fn insert_skips_identity_column() {
    let e = Employee::new();
    let stmt = dsl::insert(&e.table)
        .single(Employee::row("A", 10, None))
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "insert into employee (name, salary, manager_id) values ($1, $2, $3)"
    );
    assert_eq!(
        stmt.values(),
        &[
            Bound::text("A"),
            int(10),
            Bound::new(Value::Null, SqlType::Int)
        ]
    );
}

#[test]
fn insert_validates_rows() {
    let e = Employee::new();
    let short = dsl::insert(&e.table)
        .single(vec![Value::from("A")])
        .build(&PostgresDialect);
    assert!(matches!(short, Err(SqlError::Validation(_))));

    let mistyped = dsl::insert(&e.table)
        .single(vec![Value::Null, Value::Int(1), Value::Int(10), Value::Null])
        .build(&PostgresDialect);
    assert!(matches!(mistyped, Err(SqlError::Validation(_))));
}

#[test]
fn insert_returning() {
    let e = Employee::new();
    let query = dsl::insert(&e.table)
        .returning()
        .single(Employee::row("A", 10, Some(1)));
    assert_eq!(
        sql(&query, &PostgresDialect),
        "insert into employee (name, salary, manager_id) values ($1, $2, $3) returning id"
    );
    assert!(query.build(&MySqlDialect).unwrap_err().is_unsupported());
}

#[test]
fn insert_multiple_rows() {
    let e = Employee::new();
    let stmt = dsl::insert(&e.table)
        .multiple([Employee::row("A", 1, None), Employee::row("B", 2, Some(1))])
        .build(&MySqlDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "insert into employee (name, salary, manager_id) values (?, ?, ?), (?, ?, ?)"
    );
    assert_eq!(stmt.values().len(), 6);
    assert_eq!(stmt.values()[3], Bound::text("B"));

}

#[test]
fn insert_without_rows_is_an_empty_statement() {
    let e = Employee::new();
    let empty = dsl::insert(&e.table)
        .multiple(Vec::<Vec<Value>>::new())
        .build(&MySqlDialect)
        .unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.sql(), "");
    assert!(empty.values().is_empty());
}

#[test]
fn batch_insert_shares_one_sql() {
    let e = Employee::new();
    let rows = [
        Employee::row("A", 1, None),
        Employee::row("B", 2, None),
        Employee::row("C", 3, None),
    ];
    let batch = dsl::insert(&e.table)
        .options(QueryOptions::new().batch_size(2))
        .batch(rows)
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        batch.sql(),
        "insert into employee (name, salary, manager_id) values ($1, $2, $3)"
    );
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.rows()[2][0], Bound::text("C"));
    assert_eq!(batch.chunks().map(<[_]>::len).collect::<Vec<_>>(), vec![2, 1]);
}

#[test]
fn batch_insert_without_rows_still_has_sql() {
    let a = Address::new();
    let batch = dsl::insert(&a.table)
        .batch(Vec::<Vec<Value>>::new())
        .build(&SqliteDialect)
        .unwrap();
    assert!(batch.is_empty());
    assert_eq!(
        batch.sql(),
        "insert into address (id, employee_id, street) values (?, ?, ?)"
    );
}

#[test]
fn batch_identity_insert_needs_generated_keys() {
    let e = Employee::new();
    let err = dsl::insert(&e.table)
        .batch([Employee::row("A", 1, None)])
        .build(&SqliteDialect)
        .unwrap_err();
    assert!(err.is_unsupported());
}

// ==================== upsert ====================

#[test]
fn upsert_on_conflict_update_all() {
    let a = Address::new();
    let query = dsl::insert(&a.table)
        .on_duplicate_key_update()
        .single(Address::row(1, 2, "x"));
    let expected = "insert into address (id, employee_id, street) values ($1, $2, $3) \
                    on conflict (id) do update set employee_id = excluded.employee_id, \
                    street = excluded.street";
    assert_eq!(sql(&query, &PostgresDialect), expected);
    assert_eq!(
        sql(&query, &SqliteDialect),
        expected.replace("$1", "?").replace("$2", "?").replace("$3", "?")
    );
}

#[test]
fn upsert_on_conflict_ignore() {
    let a = Address::new();
    let query = dsl::insert(&a.table)
        .on_duplicate_key_ignore()
        .single(Address::row(1, 2, "x"));
    assert_eq!(
        sql(&query, &PostgresDialect),
        "insert into address (id, employee_id, street) values ($1, $2, $3) on conflict (id) do nothing"
    );
    assert_eq!(
        sql(&query, &MySqlDialect),
        "insert ignore into address (id, employee_id, street) values (?, ?, ?)"
    );
}

#[test]
fn upsert_explicit_keys_and_assignments() {
    let a = Address::new();
    let stmt = dsl::insert(&a.table)
        .on_duplicate_key_update()
        .conflict_key(&a.employee_id)
        .set(|s| {
            s.set_excluded(&a.street);
            s.set(&a.id, 99);
        })
        .single(Address::row(1, 2, "x"))
        .build(&PostgresDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "insert into address (id, employee_id, street) values ($1, $2, $3) \
         on conflict (employee_id) do update set street = excluded.street, id = $4"
    );
    assert_eq!(stmt.values()[3], int(99));
}

#[test]
fn upsert_on_duplicate_key_update() {
    let a = Address::new();
    let query = dsl::insert(&a.table)
        .on_duplicate_key_update()
        .multiple([Address::row(1, 2, "x"), Address::row(2, 3, "y")]);
    assert_eq!(
        sql(&query, &MySqlDialect),
        "insert into address (id, employee_id, street) values (?, ?, ?), (?, ?, ?) \
         on duplicate key update employee_id = values(employee_id), street = values(street)"
    );
}

#[test]
fn upsert_merge() {
    let a = Address::new();
    let query = dsl::insert(&a.table)
        .on_duplicate_key_update()
        .single(Address::row(1, 2, "x"));
    let h2 = "merge into address using (values (?, ?, ?)) as excluded (id, employee_id, street) \
              on (address.id = excluded.id) \
              when matched then update set employee_id = excluded.employee_id, street = excluded.street \
              when not matched then insert (id, employee_id, street) \
              values (excluded.id, excluded.employee_id, excluded.street)";
    assert_eq!(sql(&query, &H2Dialect), h2);
    assert_eq!(sql(&query, &SqlServerDialect), format!("{h2};"));

    let ignore = dsl::insert(&a.table)
        .on_duplicate_key_ignore()
        .single(Address::row(1, 2, "x"));
    assert_eq!(
        sql(&ignore, &H2Dialect),
        "merge into address using (values (?, ?, ?)) as excluded (id, employee_id, street) \
         on (address.id = excluded.id) \
         when not matched then insert (id, employee_id, street) \
         values (excluded.id, excluded.employee_id, excluded.street)"
    );
}

#[test]
fn upsert_excludes_identity_from_insert_and_update() {
    let e = Employee::new();
    let query = dsl::insert(&e.table)
        .on_duplicate_key_update()
        .single(Employee::row("A", 1, None));
    assert_eq!(
        sql(&query, &PostgresDialect),
        "insert into employee (name, salary, manager_id) values ($1, $2, $3) \
         on conflict (id) do update set name = excluded.name, salary = excluded.salary, \
         manager_id = excluded.manager_id"
    );
}

#[test]
fn upsert_merge_carries_identity_key_in_source_row() {
    let e = Employee::new();
    let query = dsl::insert(&e.table)
        .on_duplicate_key_update()
        .single(Employee::row("A", 1, None));
    let h2 = "merge into employee using (values (?, ?, ?, ?)) as excluded \
              (id, name, salary, manager_id) on (employee.id = excluded.id) \
              when matched then update set name = excluded.name, salary = excluded.salary, \
              manager_id = excluded.manager_id \
              when not matched then insert (name, salary, manager_id) \
              values (excluded.name, excluded.salary, excluded.manager_id)";
    let stmt = query.build(&H2Dialect).unwrap();
    assert_eq!(stmt.sql(), h2);
    assert_eq!(stmt.values().len(), 4);
    assert_eq!(stmt.values()[0], Bound::new(Value::Null, SqlType::Int));
    assert_eq!(stmt.values()[1], Bound::text("A"));

    let mssql = query.build(&SqlServerDialect).unwrap();
    assert_eq!(mssql.sql(), format!("{h2};"));
    assert_eq!(mssql.values()[0], Bound::new(Value::Null, SqlType::Int));
}

#[test]
fn upsert_merge_with_known_identity_updates_in_place() {
    let e = Employee::new();
    let mut row = Employee::row("A", 1, None);
    row[0] = Value::Int(7);
    let stmt = dsl::insert(&e.table)
        .on_duplicate_key_ignore()
        .multiple([row, Employee::row("B", 2, Some(7))])
        .build(&SqlServerDialect)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "merge into employee using (values (?, ?, ?, ?), (?, ?, ?, ?)) \
         as excluded (id, name, salary, manager_id) on (employee.id = excluded.id) \
         when not matched then insert (name, salary, manager_id) \
         values (excluded.name, excluded.salary, excluded.manager_id);"
    );
    assert_eq!(stmt.values()[0], int(7));
    assert_eq!(stmt.values()[4], Bound::new(Value::Null, SqlType::Int));
}

#[test]
fn upsert_needs_conflict_syntax() {
    let a = Address::new();
    let query = dsl::insert(&a.table)
        .on_duplicate_key_update()
        .single(Address::row(1, 2, "x"));
    assert!(query.build(&DryRunDialect).unwrap_err().is_unsupported());
}

#[test]
fn upsert_builder_misuse_is_reported() {
    let a = Address::new();
    let err = dsl::insert(&a.table)
        .set(|s| {
            s.set(&a.street, "x");
        })
        .single(Address::row(1, 2, "x"))
        .build(&PostgresDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));

    let err = dsl::insert(&a.table)
        .conflict_key(&a.street)
        .single(Address::row(1, 2, "x"))
        .build(&PostgresDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));
}

#[test]
fn upsert_batch() {
    let a = Address::new();
    let batch = dsl::insert(&a.table)
        .on_duplicate_key_ignore()
        .batch([Address::row(1, 2, "x"), Address::row(2, 2, "y")])
        .build(&SqliteDialect)
        .unwrap();
    assert_eq!(
        batch.sql(),
        "insert into address (id, employee_id, street) values (?, ?, ?) on conflict (id) do nothing"
    );
    assert_eq!(batch.len(), 2);
}

// ==================== dry run ====================

#[test]
fn dry_run_inlines_literals() {
    let e = Employee::new();
    let query = dsl::from(&e.table).filter(|w| {
        w.eq(&e.name, "O'Neil");
        w.eq(&e.salary, 10);
    });
    let dry = query.dry_run(&PostgresDialect).unwrap();
    assert_eq!(
        dry.sql,
        format!("{EMPLOYEE_COLUMNS} where employee.name = 'O''Neil' and employee.salary = 10")
    );
    assert_eq!(dry.args.len(), 2);

    let dry = query.dry_run(&SqlServerDialect).unwrap();
    assert!(dry.sql.contains("employee.name = N'O''Neil'"));
}
