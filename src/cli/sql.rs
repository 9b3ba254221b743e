//! Compile a filter into a WHERE fragment

use super::CliError;
use crate::{
    Filter,
    config::FilterConfig,
    session::Variables,
    sql::{Dialect, SqlContext},
};

/// Options for the sql command. Explicit values win over the config.
#[derive(Debug, Clone, Default)]
pub struct SqlOptions {
    pub expression: String,
    pub dialect: Option<Dialect>,
    pub table: Option<String>,
    pub config: FilterConfig,
    pub variables: Variables,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlOutput {
    pub sql: String,
    /// Bind parameters as a JSON object; empty when there are none
    pub params: serde_json::Map<String, serde_json::Value>,
}

pub fn execute_sql(options: &SqlOptions) -> Result<SqlOutput, CliError> {
    let filter = Filter::parse(&options.expression)?;

    let dialect = options.dialect.unwrap_or(options.config.dialect);
    let table = options.table.as_deref().unwrap_or(&options.config.table);
    let ctx = SqlContext::new(table, dialect)
        .with_field_map(&options.config.field_map)
        .with_variables(&options.variables);

    let fragment = filter.sql_filter(&ctx)?;
    Ok(SqlOutput {
        sql: fragment.sql,
        params: fragment
            .params
            .into_iter()
            .map(|(name, value)| (name, value.into()))
            .collect(),
    })
}
