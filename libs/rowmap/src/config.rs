use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::MapError;
use crate::resolver::AliasTable;

/// Mapper configuration — parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MapperConfig {
    /// Emit a `warn` event for every per-field failure.
    #[serde(default = "default_log_failures")]
    pub log_failures: bool,

    /// Column key → field key overrides.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_log_failures() -> bool {
    true
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            log_failures: default_log_failures(),
            aliases: BTreeMap::new(),
        }
    }
}

impl MapperConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, MapError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| MapError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, MapError> {
        toml::from_str(toml_str).map_err(|e| MapError::Config(e.to_string()))
    }

    pub fn alias_table(&self) -> AliasTable {
        self.aliases.iter().collect()
    }
}
