//! Optional TOML-loadable engine configuration, mirroring
//! `common/src/config/config.rs`'s nested-config-with-`Default` shape
//! (feature `config`; never required to drive the core pipeline).

use serde::{Deserialize, Serialize};
use sqlprep_quote::Engine;

fn default_dialect() -> String {
    "mysql".to_string()
}

fn default_null() -> String {
    "null".to_string()
}

fn default_default() -> String {
    "default".to_string()
}

fn default_marker_table_size() -> usize {
    64
}

/// Dialect and spelling knobs for a target server, loadable from a TOML
/// file so an embedding application doesn't have to hand-build a
/// [`sqlprep_core::TemplateEnvironment`] just to pick a dialect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Path to a reserved-word list to load instead of the built-in
    /// MySQL/MariaDB default; `None` keeps the built-in table.
    #[serde(default)]
    pub reserved_words_path: Option<String>,

    #[serde(default = "default_null")]
    pub null_keyword: String,

    #[serde(default = "default_default")]
    pub default_keyword: String,

    #[serde(default = "default_marker_table_size")]
    pub marker_table_size: usize,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            dialect: default_dialect(),
            reserved_words_path: None,
            null_keyword: default_null(),
            default_keyword: default_default(),
            marker_table_size: default_marker_table_size(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<EngineConfig, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn engine(&self) -> Engine {
        match self.dialect.as_str() {
            "generic" => Engine::Generic,
            _ => Engine::MySql,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_mysql_dialect() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.engine(), Engine::MySql);
        assert_eq!(cfg.marker_table_size, 64);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = EngineConfig::from_toml_str("dialect = \"generic\"\n").unwrap();
        assert_eq!(cfg.engine(), Engine::Generic);
        assert_eq!(cfg.null_keyword, "null");
    }
}
