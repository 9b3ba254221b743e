//! Evaluate a filter against JSON records

use super::CliError;
use crate::{Filter, Record, session::Variables};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter expression
    pub expression: String,
    /// A record, an array of records or a GeoJSON FeatureCollection
    pub input: Option<String>,
    /// Session variables
    pub variables: Variables,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Outcome for a single record
    Matched(bool),
    /// The records of a collection that passed the filter, in input order
    Selected(Vec<serde_json::Value>),
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let filter = Filter::parse(&options.expression)?;
    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let input: serde_json::Value = serde_json::from_str(json_str)?;

    match into_collection(input) {
        Ok(features) => {
            let mut selected = Vec::new();
            for feature in features {
                if filter.matches(&Record::from_json(feature.clone()), &options.variables)? {
                    selected.push(feature);
                }
            }
            Ok(CheckResult::Selected(selected))
        }
        Err(single) => {
            let record = Record::from_json(single);
            Ok(CheckResult::Matched(filter.matches(&record, &options.variables)?))
        }
    }
}

/// Splits collections into their members; anything else is handed back.
fn into_collection(input: serde_json::Value) -> Result<Vec<serde_json::Value>, serde_json::Value> {
    match input {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut obj)
            if obj.get("type").and_then(|t| t.as_str()) == Some("FeatureCollection") =>
        {
            match obj.remove("features") {
                Some(serde_json::Value::Array(features)) => Ok(features),
                _ => Ok(Vec::new()),
            }
        }
        other => Err(other),
    }
}
