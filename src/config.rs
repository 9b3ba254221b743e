use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    session::Variables,
    sql::{Dialect, FieldMap},
    value::Value,
};

/// Environment variable naming a config file when none is passed explicitly.
pub const CONFIG_ENV: &str = "LAYERFILTER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Generation settings for one layer.
///
/// ```toml
/// dialect = "CQL"
/// table = "parcels"
///
/// [field_map.owner]
/// target = "owner_name"
/// sql_type = "TEXT"
///
/// [variables]
/// user = "alice"
/// regions = ["north", "south"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub field_map: FieldMap,
    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,
}

impl FilterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `explicit` if given, else the file named by `$LAYERFILTER_CONFIG`,
    /// else returns the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => Self::load(Path::new(&path)),
                None => Ok(Self::default()),
            },
        }
    }

    /// Session variables converted to evaluator values.
    pub fn variables(&self) -> Variables {
        self.variables
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value.clone())))
            .collect()
    }
}
