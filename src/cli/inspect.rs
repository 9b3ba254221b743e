//! Structural views of a parsed filter

use super::CliError;
use crate::Filter;

/// Field names referenced by `expression`, sorted.
pub fn execute_fields(expression: &str) -> Result<Vec<String>, CliError> {
    Ok(Filter::parse(expression)?.field_names())
}

/// Indented node dump of `expression`.
pub fn execute_tree(expression: &str) -> Result<String, CliError> {
    Ok(Filter::parse(expression)?.tree_str(0))
}
