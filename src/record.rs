use std::collections::HashMap;

use crate::value::Value;

/// A feature as seen by the in-memory evaluator: only its properties matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub properties: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style property setter.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Reads a GeoJSON-like feature.
    ///
    /// The `properties` member is used when present; a plain object is taken
    /// as the properties themselves. Anything else yields an empty record.
    pub fn from_json(feature: serde_json::Value) -> Self {
        let properties = match feature {
            serde_json::Value::Object(mut obj) => match obj.remove("properties") {
                Some(serde_json::Value::Object(props)) => props,
                Some(_) => serde_json::Map::new(),
                None => obj,
            },
            _ => serde_json::Map::new(),
        };

        Record {
            properties: properties
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        }
    }
}

impl From<HashMap<String, Value>> for Record {
    fn from(properties: HashMap<String, Value>) -> Self {
        Record { properties }
    }
}
