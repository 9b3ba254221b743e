//! Compiles a predicate tree into a `WHERE` fragment.
//!
//! Two dialects are supported: SQLite (`SQL`) and GeoServer CQL (`CQL`).
//! They differ in boolean literals, `LIKE` escaping and case folding:
//!
//! | construct            | SQL                                   | CQL                          |
//! |----------------------|---------------------------------------|------------------------------|
//! | `true` / `false`     | `1` / `0`                             | `TRUE` / `FALSE`             |
//! | `x like p`           | `x LIKE p ESCAPE "\"`                 | `x LIKE p`                   |
//! | `x ilike p`          | `lower(x) LIKE lower(p) ESCAPE "\"`   | `strToLowerCase(x) LIKE(p)`  |
//! | empty `in` list      | `1=0`                                 | `FALSE`                      |

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ast::{CompOp, GeomOp, Predicate, PredicateKind},
    session::{self, Variables},
    value::Value,
};

/// Target dialect of generated fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
    /// SQLite
    #[default]
    #[serde(rename = "SQL", alias = "sql")]
    Sql,
    /// GeoServer Common Query Language
    #[serde(rename = "CQL", alias = "cql")]
    Cql,
}

impl Dialect {
    /// Boolean literal in value position.
    pub fn boolean(&self, b: bool) -> &'static str {
        match (self, b) {
            (Dialect::Sql, true) => "1",
            (Dialect::Sql, false) => "0",
            (Dialect::Cql, true) => "TRUE",
            (Dialect::Cql, false) => "FALSE",
        }
    }

    /// Boolean literal in condition position. SQLite has no boolean
    /// literal, so it gets a tautology or a contradiction.
    pub fn condition(&self, b: bool) -> &'static str {
        match (self, b) {
            (Dialect::Sql, true) => "1=1",
            (Dialect::Sql, false) => "1=0",
            (Dialect::Cql, true) => "TRUE",
            (Dialect::Cql, false) => "FALSE",
        }
    }

    pub fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Quotes a column name; dotted names are quoted part by part.
    pub fn quote_ident(&self, name: &str) -> String {
        name.split('.')
            .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Sql => f.write_str("SQL"),
            Dialect::Cql => f.write_str("CQL"),
        }
    }
}

impl FromStr for Dialect {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SQL" | "SQLITE" => Ok(Dialect::Sql),
            "CQL" => Ok(Dialect::Cql),
            _ => Err(SqlError::UnknownDialect(s.to_string())),
        }
    }
}

/// Where a logical field lives in the physical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTarget {
    /// Column name, possibly table-qualified (`other.col`)
    pub target: String,
    /// When set, the column is wrapped in `CAST(... AS sql_type)`
    #[serde(default)]
    pub sql_type: Option<String>,
}

impl FieldTarget {
    pub fn new(target: &str) -> Self {
        FieldTarget {
            target: target.to_string(),
            sql_type: None,
        }
    }

    pub fn cast(target: &str, sql_type: &str) -> Self {
        FieldTarget {
            target: target.to_string(),
            sql_type: Some(sql_type.to_string()),
        }
    }
}

/// Logical field name to physical column.
pub type FieldMap = HashMap<String, FieldTarget>;

/// Named parameters travelling with a fragment.
pub type BindParams = BTreeMap<String, Value>;

/// Errors raised while generating SQL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlError {
    /// The node has no generation rule, or needs a capability that was not
    /// supplied
    #[error("unsupported operator: {kind} '{value}'")]
    UnsupportedOperator { kind: PredicateKind, value: String },

    /// Two sub-fragments bind the same name to different values
    #[error("bind parameter '{name}' defined twice with different values")]
    BindParamConflict { name: String },

    /// An array, object or geometry used where a single value is expected
    #[error("{operand} does not resolve to a single value")]
    NonScalarValue { operand: String },

    #[error("unknown dialect '{0}' (expected SQL or CQL)")]
    UnknownDialect(String),

    /// Failure reported by a [`GeometryProvider`]
    #[error("geometry provider failed: {0}")]
    Geometry(String),
}

/// A generated `WHERE` fragment with its bind parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: BindParams,
}

impl SqlFragment {
    pub fn new(sql: impl Into<String>) -> Self {
        SqlFragment {
            sql: sql.into(),
            params: BindParams::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Adds `params` to this fragment's parameters.
    pub fn merge_params(mut self, params: BindParams) -> Result<Self, SqlError> {
        for (name, value) in params {
            match self.params.get(&name) {
                Some(existing) if *existing != value => {
                    return Err(SqlError::BindParamConflict { name });
                }
                Some(_) => {}
                None => {
                    self.params.insert(name, value);
                }
            }
        }
        Ok(self)
    }

    /// Joins two fragments with `keyword`, merging their parameters.
    pub fn combine(self, keyword: &str, other: SqlFragment) -> Result<Self, SqlError> {
        let sql = format!("({} {keyword} {})", self.sql, other.sql);
        let merged = SqlFragment {
            sql,
            params: self.params,
        };
        merged.merge_params(other.params)
    }
}

impl fmt::Display for SqlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Input handed to a [`GeometryProvider`] for one spatial node.
#[derive(Debug, Clone, Copy)]
pub struct SpatialRequest<'a> {
    pub op: GeomOp,
    pub table: &'a str,
    /// Already quoted (and mapped) column expression
    pub column: &'a str,
    /// Opaque geometry payload, as supplied to `new_from`
    pub geometry: &'a serde_json::Value,
    pub dialect: Dialect,
}

/// Builds spatial clauses; supplied by whoever owns the spatial database.
pub trait GeometryProvider {
    fn spatial_clause(&self, request: &SpatialRequest<'_>) -> Result<SqlFragment, SqlError>;
}

/// Everything generation depends on besides the tree itself.
#[derive(Clone, Copy)]
pub struct SqlContext<'a> {
    pub table: &'a str,
    pub field_map: Option<&'a FieldMap>,
    pub variables: Option<&'a Variables>,
    pub dialect: Dialect,
    pub geometry: Option<&'a dyn GeometryProvider>,
}

impl fmt::Debug for SqlContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlContext")
            .field("table", &self.table)
            .field("field_map", &self.field_map)
            .field("variables", &self.variables)
            .field("dialect", &self.dialect)
            .field("geometry", &self.geometry.is_some())
            .finish()
    }
}

impl<'a> SqlContext<'a> {
    pub fn new(table: &'a str, dialect: Dialect) -> Self {
        SqlContext {
            table,
            field_map: None,
            variables: None,
            dialect,
            geometry: None,
        }
    }

    pub fn with_field_map(mut self, field_map: &'a FieldMap) -> Self {
        self.field_map = Some(field_map);
        self
    }

    pub fn with_variables(mut self, variables: &'a Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_geometry_provider(mut self, provider: &'a dyn GeometryProvider) -> Self {
        self.geometry = Some(provider);
        self
    }

    /// Generates the fragment for `predicate` in boolean position.
    pub fn generate(&self, predicate: &Predicate) -> Result<SqlFragment, SqlError> {
        match predicate {
            Predicate::Not(inner) => {
                let inner = self.generate(inner)?;
                Ok(SqlFragment {
                    sql: format!("NOT {}", inner.sql),
                    params: inner.params,
                })
            }
            Predicate::Join { op, left, right } => {
                let left = self.generate(left)?;
                let right = self.generate(right)?;
                left.combine(op.keyword(), right)
            }
            Predicate::Compare { op, left, right } => self.comparison(*op, left, right),
            Predicate::In { left, list } => self.membership(left, list),
            Predicate::Spatial { op, left, right } => self.spatial(*op, left, right),
            Predicate::Boolean(b) => Ok(SqlFragment::new(self.dialect.condition(*b))),
            other => Err(SqlError::UnsupportedOperator {
                kind: other.kind(),
                value: other.value(),
            }),
        }
    }

    fn comparison(
        &self,
        op: CompOp,
        left: &Predicate,
        right: &Predicate,
    ) -> Result<SqlFragment, SqlError> {
        let l = self.operand(left)?;
        let sql = match (op, self.dialect) {
            (CompOp::ILike, Dialect::Cql) => {
                // no lower() on the pattern side in CQL; fold constants here
                let r = match self.value_of(right)? {
                    Some(Value::String(pattern)) => {
                        self.dialect.quote_string(&pattern.to_lowercase())
                    }
                    _ => self.operand(right)?,
                };
                format!("strToLowerCase({l}) LIKE({r})")
            }
            (CompOp::ILike, Dialect::Sql) => {
                format!("lower({l}) LIKE lower({}) ESCAPE \"\\\"", self.operand(right)?)
            }
            (CompOp::Like, Dialect::Sql) => {
                format!("{l} LIKE {} ESCAPE \"\\\"", self.operand(right)?)
            }
            (CompOp::Like, Dialect::Cql) => format!("{l} LIKE {}", self.operand(right)?),
            _ => {
                let r = self.operand(right)?;
                match op {
                    CompOp::Equal if r == "NULL" => format!("{l} IS NULL"),
                    CompOp::NotEqual if r == "NULL" => format!("{l} IS NOT NULL"),
                    _ => format!("{l} {} {r}", op.symbol()),
                }
            }
        };
        Ok(SqlFragment::new(sql))
    }

    fn membership(&self, left: &Predicate, list: &Predicate) -> Result<SqlFragment, SqlError> {
        let Predicate::OperandList(items) = list else {
            return Err(SqlError::UnsupportedOperator {
                kind: list.kind(),
                value: list.value(),
            });
        };

        let l = self.operand(left)?;
        let mut literals = Vec::new();
        let mut has_blank = false;

        for item in items {
            let values = match item {
                Predicate::Field(_) => {
                    literals.push(self.operand(item)?);
                    continue;
                }
                Predicate::Variable(raw) => match session::resolve(raw, self.variables) {
                    Value::Array(values) => values,
                    value => vec![value],
                },
                other => match self.value_of(other)? {
                    Some(value) => vec![value],
                    None => {
                        return Err(SqlError::NonScalarValue {
                            operand: other.to_string(),
                        });
                    }
                },
            };

            for value in values {
                if value.is_blank() {
                    has_blank = true;
                } else {
                    literals.push(self.literal(&value, &item.to_string())?);
                }
            }
        }

        let in_clause =
            (!literals.is_empty()).then(|| format!("{l} IN ({})", literals.join(", ")));

        let sql = if has_blank {
            let mut parts = vec![format!("{l} IS NULL"), format!("{l} = ''")];
            parts.extend(in_clause);
            format!("({})", parts.join(" OR "))
        } else {
            in_clause.unwrap_or_else(|| self.dialect.condition(false).to_string())
        };
        Ok(SqlFragment::new(sql))
    }

    fn spatial(
        &self,
        op: GeomOp,
        left: &Predicate,
        right: &Predicate,
    ) -> Result<SqlFragment, SqlError> {
        let Some(provider) = self.geometry else {
            return Err(SqlError::UnsupportedOperator {
                kind: PredicateKind::GeomOp,
                value: op.name().to_string(),
            });
        };

        let (column, geometry) = match (left, right) {
            (Predicate::Field(name), Predicate::Geometry(geometry)) => {
                (self.field(name), geometry)
            }
            (Predicate::Geometry(geometry), Predicate::Field(name)) => {
                (self.field(name), geometry)
            }
            _ => {
                return Err(SqlError::UnsupportedOperator {
                    kind: PredicateKind::GeomOp,
                    value: format!("{op}({}, {})", left.kind(), right.kind()),
                });
            }
        };

        provider.spatial_clause(&SpatialRequest {
            op,
            table: self.table,
            column: &column,
            geometry,
            dialect: self.dialect,
        })
    }

    /// Renders a leaf in value position.
    fn operand(&self, node: &Predicate) -> Result<String, SqlError> {
        if let Predicate::Field(name) = node {
            return Ok(self.field(name));
        }
        match self.value_of(node)? {
            Some(value) => self.literal(&value, &node.to_string()),
            None => Err(SqlError::NonScalarValue {
                operand: node.to_string(),
            }),
        }
    }

    fn field(&self, name: &str) -> String {
        match self.field_map.and_then(|map| map.get(name)) {
            Some(FieldTarget {
                target,
                sql_type: Some(sql_type),
            }) => format!("CAST({} AS {sql_type})", self.dialect.quote_ident(target)),
            Some(FieldTarget { target, .. }) => self.dialect.quote_ident(target),
            None => self.dialect.quote_ident(name),
        }
    }

    /// Value of a constant or variable leaf; `None` for nodes that have no
    /// single value (fields, lists, geometries, operators).
    fn value_of(&self, node: &Predicate) -> Result<Option<Value>, SqlError> {
        let value = match node {
            Predicate::Variable(raw) => session::resolve(raw, self.variables),
            Predicate::Str(s) => Value::String(s.clone()),
            Predicate::Integer(n) => Value::Integer(*n),
            Predicate::Float(n) => Value::Float(*n),
            Predicate::Boolean(b) => Value::Boolean(*b),
            Predicate::Null => Value::Null,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn literal(&self, value: &Value, origin: &str) -> Result<String, SqlError> {
        match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Boolean(b) => Ok(self.dialect.boolean(*b).to_string()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Float(n) if n.is_finite() => Ok(n.to_string()),
            Value::Float(_) => Ok("NULL".to_string()),
            Value::String(s) => Ok(self.dialect.quote_string(s)),
            Value::Array(_) | Value::Object(_) => Err(SqlError::NonScalarValue {
                operand: origin.to_string(),
            }),
        }
    }
}

impl Predicate {
    /// Compiles this tree into a `WHERE` fragment for `ctx`.
    pub fn sql_filter(&self, ctx: &SqlContext<'_>) -> Result<SqlFragment, SqlError> {
        ctx.generate(self)
    }
}
