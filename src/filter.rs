use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::{
    ast::Predicate,
    convert::ConvertError,
    evaluator::EvalError,
    parser::{self, ParseError},
    record::Record,
    session::Variables,
    sql::{BindParams, Dialect, FieldMap, SqlContext, SqlError, SqlFragment},
};

/// A parsed filter: an immutable predicate tree plus its bind parameters.
///
/// The parameters are fixed when the filter is built and travel with every
/// fragment generated from it. A `Filter` can be shared across threads and
/// evaluated any number of times.
///
/// # Examples
///
/// ```
/// use layerfilter::{Dialect, Filter, Record, Variables};
///
/// let filter = Filter::parse("[status] = 'open'").unwrap();
///
/// let vars = Variables::new();
/// assert!(filter.matches(&Record::new().with("status", "open"), &vars).unwrap());
/// assert_eq!(
///     filter.to_sql("parcels", None, &vars, Dialect::Sql).unwrap(),
///     "\"status\" = 'open'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    root: Predicate,
    bind_params: BindParams,
}

impl Filter {
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        debug!(expression, "parsing filter");
        let root = parser::parse(expression)?;
        Ok(Filter::from_predicate(root))
    }

    pub fn from_predicate(root: Predicate) -> Self {
        Filter {
            root,
            bind_params: BindParams::new(),
        }
    }

    /// Lenient conversion from a `{type, operator, operands}` description.
    pub fn new_from(desc: &serde_json::Value) -> Self {
        Filter::from_predicate(Predicate::new_from(desc))
    }

    pub fn try_new_from(desc: &serde_json::Value) -> Result<Self, ConvertError> {
        Predicate::try_new_from(desc).map(Filter::from_predicate)
    }

    /// Attaches bind parameters to the tree.
    pub fn with_bind_params(mut self, params: BindParams) -> Self {
        self.bind_params = params;
        self
    }

    pub fn predicate(&self) -> &Predicate {
        &self.root
    }

    pub fn bind_params(&self) -> &BindParams {
        &self.bind_params
    }

    /// Generates the `WHERE` fragment, carrying the tree's bind parameters.
    pub fn sql_filter(&self, ctx: &SqlContext<'_>) -> Result<SqlFragment, SqlError> {
        debug!(dialect = %ctx.dialect, table = ctx.table, "generating sql filter");
        ctx.generate(&self.root)?
            .merge_params(self.bind_params.clone())
    }

    /// Generates the `WHERE` text for `dialect`, dropping any parameters.
    pub fn to_sql(
        &self,
        table: &str,
        field_map: Option<&FieldMap>,
        variables: &Variables,
        dialect: Dialect,
    ) -> Result<String, SqlError> {
        let mut ctx = SqlContext::new(table, dialect).with_variables(variables);
        if let Some(field_map) = field_map {
            ctx = ctx.with_field_map(field_map);
        }
        Ok(self.sql_filter(&ctx)?.sql)
    }

    pub fn matches(&self, record: &Record, variables: &Variables) -> Result<bool, EvalError> {
        self.root.matches(record, variables)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.root.field_names()
    }

    pub fn tree_str(&self, indent: usize) -> String {
        self.root.tree_str(indent)
    }
}

impl From<Predicate> for Filter {
    fn from(root: Predicate) -> Self {
        Filter::from_predicate(root)
    }
}

impl FromStr for Filter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::parse(s)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_bind_params_travel_with_fragment() {
        let mut params = BindParams::new();
        params.insert("srid".into(), Value::Integer(4326));
        let filter = Filter::parse("[a] = 1").unwrap().with_bind_params(params);

        let fragment = filter
            .sql_filter(&SqlContext::new("t", Dialect::Sql))
            .unwrap();
        assert_eq!(fragment.sql, "\"a\" = 1");
        assert_eq!(fragment.params.get("srid"), Some(&Value::Integer(4326)));
    }

    #[test]
    fn test_display_round_trips() {
        let filter: Filter = "not ([a] = 1 | [b] = 2)".parse().unwrap();
        let again = Filter::parse(&filter.to_string()).unwrap();
        assert_eq!(filter, again);
    }
}
