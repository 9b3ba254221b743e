//! Conversion from generic `{type, operator, operands}` predicate
//! descriptions, the JSON shape map clients hand over for layer filters.
//!
//! ```json
//! {
//!   "type": "logical",
//!   "operator": "and",
//!   "operands": [
//!     {"type": "comparison", "operator": "=", "operands": [{"field": "status"}, "open"]},
//!     {"type": "function", "operator": "in", "operands": [{"field": "region"}, ["north", "south"]]}
//!   ]
//! }
//! ```

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value as Json;
use thiserror::Error;
use tracing::warn;

use crate::ast::{CompOp, GeomOp, JoinOp, MAX_DEPTH, Predicate};
use crate::parser::MAX_NESTING;

/// Reasons a description cannot be converted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("predicate description must be an object or a boolean, got {0}")]
    NotAPredicate(String),

    #[error("predicate description has no '{0}' member")]
    MissingMember(&'static str),

    #[error("unknown predicate type '{0}'")]
    UnknownType(String),

    #[error("unknown {kind} operator '{operator}'")]
    UnknownOperator { kind: String, operator: String },

    #[error("operator '{operator}' takes {expected} operand(s), got {found}")]
    Arity {
        operator: String,
        expected: &'static str,
        found: usize,
    },

    #[error("invalid operand {0}")]
    InvalidOperand(String),

    #[error("invalid date '{value}': {message}")]
    InvalidDate { value: String, message: String },

    #[error("predicate description nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Walks a description and builds the matching tree.
///
/// In lenient mode any sub-description that fails to convert is replaced by
/// `true` and a warning is logged; in strict mode the first failure is
/// returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    strict: bool,
}

impl Converter {
    pub fn lenient() -> Self {
        Converter { strict: false }
    }

    pub fn strict() -> Self {
        Converter { strict: true }
    }

    /// Converts a whole description. Logical descriptions may nest
    /// [`MAX_NESTING`] levels and the resulting tree is capped at
    /// [`MAX_DEPTH`] levels.
    pub fn convert(&self, desc: &Json) -> Result<Predicate, ConvertError> {
        let predicate = self.predicate(desc)?;
        if predicate.depth() <= MAX_DEPTH {
            return Ok(predicate);
        }
        let e = ConvertError::TooDeep { limit: MAX_DEPTH };
        if self.strict {
            return Err(e);
        }
        warn!(error = %e, "unconvertible predicate description replaced by true");
        Ok(Predicate::TRUE)
    }

    pub fn predicate(&self, desc: &Json) -> Result<Predicate, ConvertError> {
        self.nested(desc, 0)
    }

    fn nested(&self, desc: &Json, level: usize) -> Result<Predicate, ConvertError> {
        match self.build(desc, level) {
            Ok(predicate) => Ok(predicate),
            Err(e) if self.strict => Err(e),
            Err(e) => {
                warn!(error = %e, "unconvertible predicate description replaced by true");
                Ok(Predicate::TRUE)
            }
        }
    }

    fn build(&self, desc: &Json, level: usize) -> Result<Predicate, ConvertError> {
        if level >= MAX_NESTING {
            return Err(ConvertError::TooDeep { limit: MAX_NESTING });
        }
        let obj = match desc {
            Json::Bool(b) => return Ok(Predicate::Boolean(*b)),
            Json::Object(obj) => obj,
            other => return Err(ConvertError::NotAPredicate(other.to_string())),
        };

        let kind = obj
            .get("type")
            .and_then(Json::as_str)
            .ok_or(ConvertError::MissingMember("type"))?
            .to_ascii_lowercase();
        let operator = obj
            .get("operator")
            .and_then(Json::as_str)
            .ok_or(ConvertError::MissingMember("operator"))?
            .to_ascii_lowercase();
        let operands: &[Json] = match obj.get("operands") {
            Some(Json::Array(items)) => items,
            Some(other) => return Err(ConvertError::InvalidOperand(other.to_string())),
            None => &[],
        };

        let unknown_operator = || ConvertError::UnknownOperator {
            kind: kind.clone(),
            operator: operator.clone(),
        };

        match kind.as_str() {
            "comparison" => {
                let op = CompOp::from_symbol(&operator).ok_or_else(unknown_operator)?;
                let [left, right] = exactly_two(&operator, operands)?;
                Ok(Predicate::compare(op, self.operand(left)?, self.operand(right)?))
            }
            "function" => {
                if operator != "in" {
                    return Err(unknown_operator());
                }
                match operands {
                    [left, list] => Ok(Predicate::is_in(self.operand(left)?, self.operand(list)?)),
                    [left, rest @ ..] if rest.len() > 1 => {
                        let items = rest
                            .iter()
                            .map(|item| self.constant(item))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(Predicate::is_in(self.operand(left)?, Predicate::OperandList(items)))
                    }
                    _ => Err(arity(&operator, "2 or more", operands.len())),
                }
            }
            "spatial" | "geometry" => {
                let op = match operator.as_str() {
                    "intersects" => GeomOp::Intersects,
                    _ => return Err(unknown_operator()),
                };
                let [left, right] = exactly_two(&operator, operands)?;
                Ok(Predicate::spatial(op, self.operand(left)?, self.operand(right)?))
            }
            "logical" => match operator.as_str() {
                "not" => match operands {
                    [inner] => Ok(Predicate::negate(self.nested(inner, level + 1)?)),
                    _ => Err(arity(&operator, "1", operands.len())),
                },
                "and" | "or" => {
                    let op = if operator == "and" { JoinOp::And } else { JoinOp::Or };
                    let [first, rest @ ..] = operands else {
                        return Err(arity(&operator, "2 or more", 0));
                    };
                    if rest.is_empty() {
                        return Err(arity(&operator, "2 or more", 1));
                    }
                    rest.iter().try_fold(self.nested(first, level + 1)?, |acc, next| {
                        Ok(Predicate::join(op, acc, self.nested(next, level + 1)?))
                    })
                }
                _ => Err(unknown_operator()),
            },
            _ => Err(ConvertError::UnknownType(kind.clone())),
        }
    }

    /// Maps an operand description to a leaf or operand list.
    pub fn operand(&self, desc: &Json) -> Result<Predicate, ConvertError> {
        match desc {
            Json::Array(items) => items
                .iter()
                .map(|item| self.constant(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Predicate::OperandList),
            Json::Object(obj) => {
                if let Some(name) = obj.get("field").and_then(Json::as_str) {
                    Ok(Predicate::Field(name.to_string()))
                } else if let Some(name) = obj.get("variable").and_then(Json::as_str) {
                    Ok(Predicate::Variable(name.to_string()))
                } else if let Some(payload) = obj.get("geometry") {
                    Ok(Predicate::Geometry(payload.clone()))
                } else {
                    self.constant(desc)
                }
            }
            scalar => self.constant(scalar),
        }
    }

    /// Maps a literal, including `{"date": ...}`, to a constant leaf.
    fn constant(&self, value: &Json) -> Result<Predicate, ConvertError> {
        match value {
            Json::Null => Ok(Predicate::Null),
            Json::String(s) if s.is_empty() => Ok(Predicate::Null),
            Json::String(s) => Ok(Predicate::Str(s.clone())),
            Json::Bool(b) => Ok(Predicate::Boolean(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Predicate::Integer(i)),
                None => n
                    .as_f64()
                    .map(Predicate::Float)
                    .ok_or_else(|| ConvertError::InvalidOperand(n.to_string())),
            },
            Json::Object(obj) => match obj.get("date").and_then(Json::as_str) {
                Some(date) => iso_timestamp(date).map(Predicate::Str),
                None => Err(ConvertError::InvalidOperand(value.to_string())),
            },
            Json::Array(_) => Err(ConvertError::InvalidOperand(value.to_string())),
        }
    }
}

/// Normalises an RFC 3339 timestamp or a bare `YYYY-MM-DD` date to UTC
/// `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn iso_timestamp(text: &str) -> Result<String, ConvertError> {
    let utc: DateTime<Utc> = match DateTime::parse_from_rfc3339(text) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(rfc_err) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| ConvertError::InvalidDate {
                value: text.to_string(),
                message: rfc_err.to_string(),
            })?,
    };
    Ok(utc.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn arity(operator: &str, expected: &'static str, found: usize) -> ConvertError {
    ConvertError::Arity {
        operator: operator.to_string(),
        expected,
        found,
    }
}

fn exactly_two<'a>(operator: &str, operands: &'a [Json]) -> Result<[&'a Json; 2], ConvertError> {
    match operands {
        [left, right] => Ok([left, right]),
        _ => Err(arity(operator, "2", operands.len())),
    }
}

impl Predicate {
    /// Builds a tree from a generic predicate description.
    ///
    /// Unrecognised parts become `true`; use [`Predicate::try_new_from`] to
    /// reject them instead.
    pub fn new_from(desc: &Json) -> Predicate {
        Converter::lenient()
            .convert(desc)
            .unwrap_or(Predicate::TRUE)
    }

    pub fn try_new_from(desc: &Json) -> Result<Predicate, ConvertError> {
        Converter::strict().convert(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(
            iso_timestamp("2024-03-01T12:30:00+02:00").unwrap(),
            "2024-03-01T10:30:00.000Z"
        );
        assert_eq!(iso_timestamp("2024-03-01").unwrap(), "2024-03-01T00:00:00.000Z");
        assert!(matches!(
            iso_timestamp("yesterday"),
            Err(ConvertError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_empty_string_is_null() {
        let converter = Converter::strict();
        assert_eq!(converter.operand(&Json::from("")).unwrap(), Predicate::Null);
    }
}
