// tests/consistency_tests.rs
//
// Each fixture pairs the generated SQL with the in-memory outcome for a set
// of records. The expected outcomes are what the SQL yields on a table
// holding those records.

use layerfilter::{Dialect, Filter, Record, Value, Variables};
use serde_json::json;

struct Fixture {
    expr: &'static str,
    sql: &'static str,
    cql: &'static str,
    cases: Vec<(serde_json::Value, bool)>,
}

fn check(fixture: &Fixture, vars: &Variables) {
    let filter = Filter::parse(fixture.expr).unwrap();

    assert_eq!(
        filter.to_sql("t", None, vars, Dialect::Sql).unwrap(),
        fixture.sql,
        "SQL for {}",
        fixture.expr
    );
    assert_eq!(
        filter.to_sql("t", None, vars, Dialect::Cql).unwrap(),
        fixture.cql,
        "CQL for {}",
        fixture.expr
    );

    for (props, expected) in &fixture.cases {
        let record = Record::from_json(props.clone());
        assert_eq!(
            filter.matches(&record, vars).unwrap(),
            *expected,
            "{} on {}",
            fixture.expr,
            props
        );
    }
}

#[test]
fn test_status_equality() {
    check(
        &Fixture {
            expr: "[status] = 'open'",
            sql: "\"status\" = 'open'",
            cql: "\"status\" = 'open'",
            cases: vec![
                (json!({"status": "open"}), true),
                (json!({"status": "closed"}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_age_range() {
    check(
        &Fixture {
            expr: "[age] >= 18 & [age] < 65",
            sql: "(\"age\" >= 18 AND \"age\" < 65)",
            cql: "(\"age\" >= 18 AND \"age\" < 65)",
            cases: vec![
                (json!({"age": 30}), true),
                (json!({"age": 70}), false),
                (json!({"age": null}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_name_like() {
    check(
        &Fixture {
            expr: "[name] like 'Jo%'",
            sql: "\"name\" LIKE 'Jo%' ESCAPE \"\\\"",
            cql: "\"name\" LIKE 'Jo%'",
            cases: vec![
                (json!({"name": "John"}), true),
                (json!({"name": "Amy"}), false),
                (json!({"name": null}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_name_ilike() {
    check(
        &Fixture {
            expr: "[name] ilike 'JO%'",
            sql: "lower(\"name\") LIKE lower('JO%') ESCAPE \"\\\"",
            cql: "strToLowerCase(\"name\") LIKE('jo%')",
            cases: vec![
                (json!({"name": "john"}), true),
                (json!({"name": "JOAN"}), true),
                (json!({"name": "amy"}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_region_in() {
    check(
        &Fixture {
            expr: "[region] in ('north', 'south')",
            sql: "\"region\" IN ('north', 'south')",
            cql: "\"region\" IN ('north', 'south')",
            cases: vec![
                (json!({"region": "north"}), true),
                (json!({"region": "east"}), false),
                (json!({}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_region_in_empty_list() {
    let mut vars = Variables::new();
    vars.insert("regions".into(), Value::Array(vec![]));
    check(
        &Fixture {
            expr: "[region] in {regions}",
            sql: "1=0",
            cql: "FALSE",
            cases: vec![(json!({"region": "north"}), false)],
        },
        &vars,
    );
}

#[test]
fn test_in_with_null_entry() {
    check(
        &Fixture {
            expr: "[owner] in (null, 'acme')",
            sql: "(\"owner\" IS NULL OR \"owner\" = '' OR \"owner\" IN ('acme'))",
            cql: "(\"owner\" IS NULL OR \"owner\" = '' OR \"owner\" IN ('acme'))",
            cases: vec![
                (json!({"owner": null}), true),
                (json!({"owner": ""}), true),
                (json!({"owner": "acme"}), true),
                (json!({"owner": "other"}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_not_over_or() {
    check(
        &Fixture {
            expr: "not ( [a] = 1 | [b] = 2 )",
            sql: "NOT (\"a\" = 1 OR \"b\" = 2)",
            cql: "NOT (\"a\" = 1 OR \"b\" = 2)",
            cases: vec![
                (json!({"a": 1, "b": 5}), false),
                (json!({"a": 9, "b": 9}), true),
                (json!({"a": 9, "b": 2}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_null_checks() {
    check(
        &Fixture {
            expr: "[closed] = null | [closed] <> null & [reopened] = true",
            sql: "(\"closed\" IS NULL OR (\"closed\" IS NOT NULL AND \"reopened\" = 1))",
            cql: "(\"closed\" IS NULL OR (\"closed\" IS NOT NULL AND \"reopened\" = TRUE))",
            cases: vec![
                (json!({"closed": null}), true),
                (json!({"closed": "2024-01-01", "reopened": true}), true),
                (json!({"closed": "2024-01-01", "reopened": false}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_owner_variable_default() {
    let fixture = |sql: &'static str, owner: &'static str| Fixture {
        expr: "[owner] = {user:guest}",
        sql,
        cql: sql,
        cases: vec![
            (json!({"owner": owner}), true),
            (json!({"owner": "someone"}), false),
        ],
    };

    check(&fixture("\"owner\" = 'guest'", "guest"), &Variables::new());

    let mut vars = Variables::new();
    vars.insert("user".into(), Value::from("alice"));
    check(&fixture("\"owner\" = 'alice'", "alice"), &vars);
}

#[test]
fn test_bare_constants() {
    check(
        &Fixture {
            expr: "true & not false",
            sql: "(1=1 AND NOT 1=0)",
            cql: "(TRUE AND NOT FALSE)",
            cases: vec![(json!({}), true)],
        },
        &Variables::new(),
    );
}

#[test]
fn test_in_with_field_entry() {
    check(
        &Fixture {
            expr: "[a] in ([b])",
            sql: "\"a\" IN (\"b\")",
            cql: "\"a\" IN (\"b\")",
            cases: vec![
                (json!({"a": null, "b": null}), false),
                (json!({"a": 1, "b": null}), false),
                (json!({"a": null, "b": 1}), false),
                (json!({"a": 1, "b": 1}), true),
                (json!({"a": 1, "b": 1.0}), true),
                (json!({"a": "", "b": ""}), true),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_in_with_field_and_null_entries() {
    check(
        &Fixture {
            expr: "[a] in ([b], null)",
            sql: "(\"a\" IS NULL OR \"a\" = '' OR \"a\" IN (\"b\"))",
            cql: "(\"a\" IS NULL OR \"a\" = '' OR \"a\" IN (\"b\"))",
            cases: vec![
                (json!({"a": null, "b": 2}), true),
                (json!({"a": 2, "b": 2}), true),
                (json!({"a": 3, "b": null}), false),
            ],
        },
        &Variables::new(),
    );
}

#[test]
fn test_not_null_guard_on_inequality() {
    check(
        &Fixture {
            expr: "[a] <> 'x' & [a] <> null",
            sql: "(\"a\" <> 'x' AND \"a\" IS NOT NULL)",
            cql: "(\"a\" <> 'x' AND \"a\" IS NOT NULL)",
            cases: vec![
                (json!({"a": null}), false),
                (json!({"a": "x"}), false),
                (json!({"a": "y"}), true),
            ],
        },
        &Variables::new(),
    );
}

// Inequality and negation over a null field use loose equality in memory,
// so they hold for the record, while SQL yields NULL and drops the row.
// Guard with `<> null` where both must agree.
#[test]
fn test_null_inequality_differs_from_sql() {
    let vars = Variables::new();
    let record = Record::from_json(json!({"a": null}));

    let cases = [
        ("[a] <> 'x'", "\"a\" <> 'x'"),
        ("not ([a] = 1)", "NOT \"a\" = 1"),
    ];
    for (expr, sql) in cases {
        let filter = Filter::parse(expr).unwrap();
        assert_eq!(filter.to_sql("t", None, &vars, Dialect::Sql).unwrap(), sql);
        assert!(filter.matches(&record, &vars).unwrap(), "{expr} in memory");
    }
}
