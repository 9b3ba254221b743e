//! CLI support for layerfilter
//!
//! Each subcommand is a plain function over an options struct, so the
//! binary stays a thin argument parser and the commands can be driven from
//! tests or other tools.

mod check;
mod convert;
mod inspect;
mod sql;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{ConvertOptions, execute_convert};
pub use inspect::{execute_fields, execute_tree};
pub use sql::{SqlOptions, SqlOutput, execute_sql};

use std::io;

use thiserror::Error;

use crate::{config::FilterConfig, session::Variables, value::Value};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("SQL generation error: {0}")]
    Sql(#[from] crate::SqlError),

    #[error("Conversion error: {0}")]
    Convert(#[from] crate::ConvertError),

    #[error("Config error: {0}")]
    Config(#[from] crate::ConfigError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// A `--var` argument without `=`
    #[error("Invalid variable '{0}': expected name=value")]
    InvalidVariable(String),
}

/// Parses a `name=value` argument.
///
/// The value is read as JSON when it is valid JSON (so arrays can be
/// passed), otherwise like a `{name:default}` default.
pub fn parse_variable(arg: &str) -> Result<(String, Value), CliError> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| CliError::InvalidVariable(arg.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidVariable(arg.to_string()));
    }

    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from(json),
        Err(_) => Value::parse_default(raw),
    };
    Ok((name.to_string(), value))
}

/// Config variables overlaid with `--var` arguments.
pub fn session_variables(config: &FilterConfig, overrides: &[String]) -> Result<Variables, CliError> {
    let mut variables = config.variables();
    for arg in overrides {
        let (name, value) = parse_variable(arg)?;
        variables.insert(name, value);
    }
    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variable() {
        assert_eq!(
            parse_variable("user=alice").unwrap(),
            ("user".to_string(), Value::from("alice"))
        );
        assert_eq!(
            parse_variable("limit=10").unwrap(),
            ("limit".to_string(), Value::Integer(10))
        );
        assert_eq!(
            parse_variable(r#"regions=["north","south"]"#).unwrap().1,
            Value::Array(vec![Value::from("north"), Value::from("south")])
        );
        assert!(matches!(
            parse_variable("novalue"),
            Err(CliError::InvalidVariable(_))
        ));
    }
}
