//! Session variables: `{name}` and `{name:default}` references.

use std::collections::HashMap;

use crate::value::Value;

/// Session variable values keyed by name.
pub type Variables = HashMap<String, Value>;

/// A parsed `name[:default]` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableRef<'a> {
    pub name: &'a str,
    pub default: Option<&'a str>,
}

impl<'a> VariableRef<'a> {
    /// Splits the raw text between the braces at the first `:`.
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once(':') {
            Some((name, default)) => VariableRef {
                name: name.trim(),
                default: Some(default),
            },
            None => VariableRef {
                name: raw.trim(),
                default: None,
            },
        }
    }

    /// The session value if one is set, else the parsed default, else `Null`.
    pub fn resolve(&self, variables: Option<&Variables>) -> Value {
        variables
            .and_then(|vars| vars.get(self.name))
            .cloned()
            .or_else(|| self.default.map(Value::parse_default))
            .unwrap_or(Value::Null)
    }
}

/// Resolves a raw variable reference against `variables`.
pub fn resolve(raw: &str, variables: Option<&Variables>) -> Value {
    VariableRef::parse(raw).resolve(variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_value_wins_over_default() {
        let mut vars = Variables::new();
        vars.insert("user".into(), Value::from("alice"));
        assert_eq!(resolve("user:guest", Some(&vars)), Value::from("alice"));
        assert_eq!(resolve("user:guest", None), Value::from("guest"));
        assert_eq!(resolve("user", None), Value::Null);
    }

    #[test]
    fn test_default_may_contain_colons() {
        let r = VariableRef::parse("since:2024-01-01T00:00");
        assert_eq!(r.name, "since");
        assert_eq!(r.default, Some("2024-01-01T00:00"));
    }
}
