// tests/cli_tests.rs

use layerfilter::cli::{
    self, CheckOptions, CheckResult, CliError, ConvertOptions, SqlOptions, execute_check,
    execute_convert, execute_fields, execute_sql, execute_tree,
};
use layerfilter::{Dialect, FilterConfig, Value, Variables};
use serde_json::json;

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_single_record() {
    let options = CheckOptions {
        expression: "[status] = 'open'".into(),
        input: Some(r#"{"status": "open"}"#.into()),
        ..Default::default()
    };
    assert_eq!(execute_check(&options).unwrap(), CheckResult::Matched(true));
}

#[test]
fn test_check_feature_collection() {
    let input = json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"id": 1, "age": 30}},
            {"type": "Feature", "properties": {"id": 2, "age": 70}},
            {"type": "Feature", "properties": {"id": 3, "age": 18}}
        ]
    });
    let options = CheckOptions {
        expression: "[age] >= 18 & [age] < 65".into(),
        input: Some(input.to_string()),
        ..Default::default()
    };

    match execute_check(&options).unwrap() {
        CheckResult::Selected(features) => {
            let ids: Vec<_> = features.iter().map(|f| f["properties"]["id"].clone()).collect();
            assert_eq!(ids, vec![json!(1), json!(3)]);
        }
        other => panic!("Expected selection, got {:?}", other),
    }
}

#[test]
fn test_check_array_with_variables() {
    let mut variables = Variables::new();
    variables.insert("user".into(), Value::from("alice"));
    let options = CheckOptions {
        expression: "[owner] = {user:guest}".into(),
        input: Some(r#"[{"owner": "alice"}, {"owner": "guest"}]"#.into()),
        variables,
        syntax_only: false,
    };
    assert_eq!(
        execute_check(&options).unwrap(),
        CheckResult::Selected(vec![json!({"owner": "alice"})])
    );
}

#[test]
fn test_check_syntax_only() {
    let options = CheckOptions {
        expression: "[a] = 1".into(),
        syntax_only: true,
        ..Default::default()
    };
    assert_eq!(execute_check(&options).unwrap(), CheckResult::SyntaxValid);
}

#[test]
fn test_check_syntax_error() {
    let options = CheckOptions {
        expression: "[a] =".into(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(execute_check(&options), Err(CliError::Parse(_))));
}

#[test]
fn test_check_requires_input() {
    let options = CheckOptions {
        expression: "[a] = 1".into(),
        ..Default::default()
    };
    assert!(matches!(execute_check(&options), Err(CliError::NoInput)));
}

// ============================================================================
// sql
// ============================================================================

#[test]
fn test_sql_uses_config() {
    let config = FilterConfig::from_toml_str(
        r#"
        dialect = "CQL"
        table = "parcels"

        [field_map.owner]
        target = "owner_name"

        [variables]
        user = "alice"
        "#,
    )
    .unwrap();
    let variables = cli::session_variables(&config, &[]).unwrap();

    let output = execute_sql(&SqlOptions {
        expression: "[owner] = {user} & [active] = true".into(),
        config,
        variables,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(output.sql, "(\"owner_name\" = 'alice' AND \"active\" = TRUE)");
    assert!(output.params.is_empty());
}

#[test]
fn test_sql_flags_override_config() {
    let config = FilterConfig::from_toml_str("dialect = \"CQL\"\n[variables]\nuser = \"alice\"").unwrap();
    let variables = cli::session_variables(&config, &["user=bob".to_string()]).unwrap();

    let output = execute_sql(&SqlOptions {
        expression: "[owner] = {user} & true".into(),
        dialect: Some(Dialect::Sql),
        config,
        variables,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(output.sql, "(\"owner\" = 'bob' AND 1=1)");
}

#[test]
fn test_sql_reports_generation_errors() {
    let variables = cli::session_variables(&FilterConfig::default(), &[r#"ids=[1,2]"#.to_string()]).unwrap();
    let result = execute_sql(&SqlOptions {
        expression: "[id] = {ids}".into(),
        variables,
        ..Default::default()
    });
    assert!(matches!(result, Err(CliError::Sql(_))));
}

// ============================================================================
// fields / tree
// ============================================================================

#[test]
fn test_fields() {
    assert_eq!(
        execute_fields("[b] = 1 | [a] = 2 & [b] = 3").unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[test]
fn test_tree() {
    assert_eq!(
        execute_tree("[a] = 'x'").unwrap(),
        "comp_op: =\n  field: a\n  str_const: x\n"
    );
}

// ============================================================================
// convert
// ============================================================================

#[test]
fn test_convert() {
    let input = json!({
        "type": "logical",
        "operator": "and",
        "operands": [
            {"type": "comparison", "operator": "=", "operands": [{"field": "status"}, "open"]},
            {"type": "function", "operator": "in", "operands": [{"field": "region"}, ["north", "south"]]}
        ]
    });
    let expr = execute_convert(&ConvertOptions {
        input: Some(input.to_string()),
        strict: true,
    })
    .unwrap();
    assert_eq!(expr, "[status] = 'open' & [region] in ('north', 'south')");
}

#[test]
fn test_convert_strict_rejects_unknown() {
    let result = execute_convert(&ConvertOptions {
        input: Some(r#"{"type": "temporal", "operator": "during", "operands": []}"#.into()),
        strict: true,
    });
    assert!(matches!(result, Err(CliError::Convert(_))));

    let lenient = execute_convert(&ConvertOptions {
        input: Some(r#"{"type": "temporal", "operator": "during", "operands": []}"#.into()),
        strict: false,
    })
    .unwrap();
    assert_eq!(lenient, "true");
}

#[test]
fn test_convert_invalid_json() {
    let result = execute_convert(&ConvertOptions {
        input: Some("{not json".into()),
        strict: false,
    });
    assert!(matches!(result, Err(CliError::Json(_))));
}
