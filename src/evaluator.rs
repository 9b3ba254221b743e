use std::cmp::Ordering;

use regex::RegexBuilder;
use thiserror::Error;

use crate::{
    ast::{CompOp, JoinOp, Predicate, PredicateKind},
    record::Record,
    session::{self, Variables},
    value::Value,
};

/// Errors that can occur during in-memory evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A node with no client-side meaning, or one in the wrong position
    #[error("unsupported operator: {kind} '{value}'")]
    UnsupportedOperator { kind: PredicateKind, value: String },

    /// A LIKE pattern whose regex translation failed to compile
    #[error("invalid like pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Evaluates predicate trees against records.
///
/// Holds the session variables for the duration of a batch so the same
/// evaluator can be reused across many records.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    variables: Option<&'a Variables>,
}

impl<'a> Evaluator<'a> {
    pub fn new(variables: &'a Variables) -> Self {
        Evaluator {
            variables: Some(variables),
        }
    }

    /// An evaluator with no session variables; every `{name}` falls back to
    /// its default.
    pub fn without_variables() -> Self {
        Evaluator { variables: None }
    }

    /// Evaluates `predicate` for `record`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerfilter::{Evaluator, Record, parser::parse};
    ///
    /// let predicate = parse("[age] >= 18 & [age] < 65").unwrap();
    /// let evaluator = Evaluator::without_variables();
    ///
    /// assert!(evaluator.eval(&predicate, &Record::new().with("age", 30i64)).unwrap());
    /// assert!(!evaluator.eval(&predicate, &Record::new().with("age", 70i64)).unwrap());
    /// ```
    pub fn eval(&self, predicate: &Predicate, record: &Record) -> Result<bool, EvalError> {
        match predicate {
            Predicate::Not(inner) => Ok(!self.eval(inner, record)?),
            Predicate::Join { op, left, right } => {
                // both sides are always evaluated
                let left = self.eval(left, record)?;
                let right = self.eval(right, record)?;
                Ok(match op {
                    JoinOp::And => left && right,
                    JoinOp::Or => left || right,
                })
            }
            Predicate::Compare { op, left, right } => {
                let left = self.eval_operand(left, record)?;
                let right = self.eval_operand(right, record)?;
                apply_comparison(*op, &left, &right)
            }
            Predicate::In { left, list } => self.eval_membership(left, list, record),
            Predicate::Spatial { .. } | Predicate::OperandList(_) | Predicate::Geometry(_) => {
                Err(unsupported(predicate))
            }
            Predicate::Boolean(b) => Ok(*b),
            leaf => Ok(self.eval_operand(leaf, record)?.is_truthy()),
        }
    }

    /// Evaluates a leaf to its value.
    fn eval_operand(&self, node: &Predicate, record: &Record) -> Result<Value, EvalError> {
        match node {
            Predicate::Field(name) => Ok(record.property(name).cloned().unwrap_or(Value::Null)),
            Predicate::Variable(raw) => Ok(session::resolve(raw, self.variables)),
            Predicate::Str(s) => Ok(Value::String(s.clone())),
            Predicate::Integer(n) => Ok(Value::Integer(*n)),
            Predicate::Float(n) => Ok(Value::Float(*n)),
            Predicate::Boolean(b) => Ok(Value::Boolean(*b)),
            Predicate::Null => Ok(Value::Null),
            other => Err(unsupported(other)),
        }
    }

    fn eval_membership(
        &self,
        left: &Predicate,
        list: &Predicate,
        record: &Record,
    ) -> Result<bool, EvalError> {
        let Predicate::OperandList(items) = list else {
            return Err(unsupported(list));
        };

        let needle = self.eval_operand(left, record)?;
        let mut columns = Vec::new();
        let mut constants = Vec::with_capacity(items.len());
        for item in items {
            match (item, self.eval_operand(item, record)?) {
                (Predicate::Field(_), value) => columns.push(value),
                (Predicate::Variable(_), Value::Array(values)) => constants.extend(values),
                (_, value) => constants.push(value),
            }
        }

        // field entries behave like SQL `IN`: a null on either side never matches
        if !needle.is_null() && columns.iter().any(|column| column.strict_eq(&needle)) {
            return Ok(true);
        }

        // blank constants stand for "missing": they match null and ''
        if needle.is_blank() {
            return Ok(constants.iter().any(Value::is_blank));
        }
        Ok(constants.iter().any(|candidate| candidate.strict_eq(&needle)))
    }
}

impl Default for Evaluator<'_> {
    fn default() -> Self {
        Evaluator::without_variables()
    }
}

fn unsupported(node: &Predicate) -> EvalError {
    EvalError::UnsupportedOperator {
        kind: node.kind(),
        value: node.value(),
    }
}

fn apply_comparison(op: CompOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    let ordering = || left.loose_cmp(right);
    Ok(match op {
        CompOp::Equal => left.loose_eq(right),
        CompOp::NotEqual => !left.loose_eq(right),
        CompOp::LessThan => ordering() == Some(Ordering::Less),
        CompOp::LessEqual => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
        CompOp::GreaterThan => ordering() == Some(Ordering::Greater),
        CompOp::GreaterEqual => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
        CompOp::Like => like_matches(left, right, false)?,
        CompOp::ILike => like_matches(left, right, true)?,
    })
}

/// Translates a SQL LIKE pattern into an anchored regex.
///
/// `%` matches any run, `_` one character, and `\` makes the next character
/// literal. Literal runs are regex-escaped.
pub fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::from("^");
    let mut literal = String::new();
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => literal.push(chars.next().unwrap_or('\\')),
            '%' | '_' => {
                regex.push_str(&regex::escape(&literal));
                literal.clear();
                regex.push_str(if ch == '%' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    regex.push_str(&regex::escape(&literal));
    regex.push('$');
    regex
}

fn like_matches(subject: &Value, pattern: &Value, case_insensitive: bool) -> Result<bool, EvalError> {
    // NULL LIKE anything is unknown in SQL
    if subject.is_null() || pattern.is_null() {
        return Ok(false);
    }

    let pattern = pattern.as_string();
    let re = RegexBuilder::new(&like_to_regex(&pattern))
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| EvalError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
    Ok(re.is_match(&subject.as_string()))
}

impl Predicate {
    /// Evaluates this tree against `record` with the given session
    /// variables.
    pub fn matches(&self, record: &Record, variables: &Variables) -> Result<bool, EvalError> {
        Evaluator::new(variables).eval(self, record)
    }
}
