use std::cmp::Ordering;
use std::collections::HashMap;

use rust_decimal::{Decimal, prelude::FromPrimitive};

/// A runtime value: a record property, a session variable or a bind
/// parameter.
///
/// # Comparison Semantics
///
/// [`Value::loose_eq`] coerces across types:
/// - numbers and numeric strings compare numerically (`'18' = 18`)
/// - booleans compare as `1` / `0`
/// - `null` equals only `null`
///
/// [`Value::strict_eq`] is type-aware and backs `in` membership.
///
/// # Examples
///
/// ```
/// use layerfilter::Value;
///
/// assert!(Value::String("18".into()).loose_eq(&Value::Integer(18)));
/// assert!(!Value::String("18".into()).strict_eq(&Value::Integer(18)));
/// assert!(Value::Integer(2).strict_eq(&Value::Float(2.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null; also stands for missing properties and undefined variables
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),
}

impl Value {
    /// Check if the value is truthy (for conditions)
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0 && !n.is_nan(),
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Array(_) | Object(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `null` or the empty string, the two values `in` lists treat as missing.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric coercion used by loose comparisons. `None` stands for NaN.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Null => Some(0.0),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) if n.is_nan() => None,
            Value::Float(n) => Some(*n),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
                }
            }
            Value::Array(items) => match items.as_slice() {
                [] => Some(0.0),
                [single] => Value::String(single.as_string()).to_number(),
                _ => None,
            },
            Value::Object(_) => None,
        }
    }

    /// Get as string (concatenation)
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(n) => n.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Array(items) => items
                .iter()
                .map(|item| if item.is_null() { String::new() } else { item.as_string() })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Loose equality with cross-type coercion.
    pub fn loose_eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Null, _) | (_, Null) => false,
            (String(a), String(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(_) | Float(_), Integer(_) | Float(_)) => numbers_equal(self, other),
            (Array(a), Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Object(a), Object(b)) => a == b,
            (Boolean(_), _) => Integer(self.to_number().unwrap_or_default() as i64).loose_eq(other),
            (_, Boolean(_)) => self.loose_eq(&Integer(other.to_number().unwrap_or_default() as i64)),
            (Array(_) | Object(_), _) => String(self.as_string()).loose_eq(other),
            (_, Array(_) | Object(_)) => self.loose_eq(&String(other.as_string())),
            // one side is a number, the other a string
            _ => match (self.to_number(), other.to_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Type-aware equality; integers and floats of the same magnitude are
    /// equal.
    pub fn strict_eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Integer(_) | Float(_), Integer(_) | Float(_)) => numbers_equal(self, other),
            (Array(a), Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            _ => self == other,
        }
    }

    /// Ordering for `< <= > >=`.
    ///
    /// Two strings compare lexicographically, everything else numerically.
    /// `None` when either side is null or has no numeric reading, in which
    /// case every ordered comparison is false, as in SQL.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
                compare_mixed(self, other)
            }
            _ => self.to_number()?.partial_cmp(&other.to_number()?),
        }
    }

    /// Reads the default part of `{name:default}`.
    ///
    /// Numbers, booleans and `null` are recognised, anything else stays a
    /// string.
    pub fn parse_default(text: &str) -> Value {
        if let Ok(n) = text.parse::<i64>() {
            return Value::Integer(n);
        }
        if let Ok(n) = text.parse::<f64>()
            && n.is_finite()
        {
            return Value::Float(n);
        }
        match text.to_ascii_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            "null" => Value::Null,
            _ => Value::String(text.to_string()),
        }
    }
}

/// Exact decimal reading; floats keep every binary digit, not just the
/// shortest round-trip form.
fn decimal_of(v: &Value) -> Option<Decimal> {
    match v {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Float(n) => Decimal::from_f64_retain(*n),
        _ => None,
    }
}

/// Integer against float. Falls back to `f64` outside the decimal range.
fn compare_mixed(a: &Value, b: &Value) -> Option<Ordering> {
    match (decimal_of(a), decimal_of(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_float()?.partial_cmp(&b.as_float()?),
    }
}

fn numbers_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        _ => compare_mixed(a, b) == Some(Ordering::Equal),
    }
}

/// Convert serde_json::Value to Value
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    n.as_f64().map(Value::Float).unwrap_or(Value::Null)
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Convert Value to serde_json::Value
impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(obj) => serde_json::Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_eq_coerces_numeric_strings() {
        assert!(Value::from("42").loose_eq(&Value::Integer(42)));
        assert!(Value::Integer(42).loose_eq(&Value::from(" 42 ")));
        assert!(!Value::from("42a").loose_eq(&Value::Integer(42)));
        assert!(Value::from("").loose_eq(&Value::Integer(0)));
    }

    #[test]
    fn test_loose_eq_booleans_as_numbers() {
        assert!(Value::Boolean(true).loose_eq(&Value::Integer(1)));
        assert!(Value::Boolean(false).loose_eq(&Value::from("0")));
        assert!(!Value::Boolean(true).loose_eq(&Value::from("true")));
    }

    #[test]
    fn test_null_only_equals_null() {
        assert!(Value::Null.loose_eq(&Value::Null));
        assert!(!Value::Null.loose_eq(&Value::Integer(0)));
        assert!(!Value::from("").loose_eq(&Value::Null));
    }

    #[test]
    fn test_mixed_number_equality_uses_decimal() {
        assert!(Value::Integer(3).loose_eq(&Value::Float(3.0)));
        assert!(!Value::Integer(3).loose_eq(&Value::Float(3.000001)));
    }

    #[test]
    fn test_mixed_numbers_keep_full_float_precision() {
        let just_above_one = Value::Float(1.0000000000000002);
        assert!(!Value::Integer(1).loose_eq(&just_above_one));
        assert!(!Value::Integer(1).strict_eq(&just_above_one));
        assert_eq!(
            Value::Integer(1).loose_cmp(&just_above_one),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Float(0.1).loose_cmp(&Value::Integer(0)),
            Some(Ordering::Greater)
        );
        assert!(Value::Integer(i64::MAX).loose_cmp(&Value::Float(1e30)) == Some(Ordering::Less));
    }

    #[test]
    fn test_loose_cmp() {
        assert_eq!(
            Value::from("apple").loose_cmp(&Value::from("banana")),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from("10").loose_cmp(&Value::Integer(9)),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Null.loose_cmp(&Value::Integer(9)), None);
        assert_eq!(Value::from("abc").loose_cmp(&Value::Integer(9)), None);
    }

    #[test]
    fn test_parse_default() {
        assert_eq!(Value::parse_default("10"), Value::Integer(10));
        assert_eq!(Value::parse_default("2.5"), Value::Float(2.5));
        assert_eq!(Value::parse_default("TRUE"), Value::Boolean(true));
        assert_eq!(Value::parse_default("null"), Value::Null);
        assert_eq!(Value::parse_default("guest"), Value::from("guest"));
    }
}
