//! Predicate description to filter expression

use super::CliError;
use crate::Filter;

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// JSON `{type, operator, operands}` description
    pub input: Option<String>,
    /// Reject unknown parts instead of replacing them with `true`
    pub strict: bool,
}

/// Converts the description and renders it as an expression.
pub fn execute_convert(options: &ConvertOptions) -> Result<String, CliError> {
    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let desc: serde_json::Value = serde_json::from_str(json_str)?;

    let filter = if options.strict {
        Filter::try_new_from(&desc)?
    } else {
        Filter::new_from(&desc)
    };
    Ok(filter.to_string())
}
