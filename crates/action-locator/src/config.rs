//! Locations and switches for the healing engine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const ENV_CATALOG_PATH: &str = "SELFHEAL_CATALOG_PATH";
pub const ENV_PENDING_PATH: &str = "SELFHEAL_PENDING_PATH";
pub const ENV_DIAGNOSTICS_DIR: &str = "SELFHEAL_DIAGNOSTICS_DIR";
pub const ENV_CAPTURE_DIAGNOSTICS: &str = "SELFHEAL_CAPTURE_DIAGNOSTICS";

/// Healing engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealConfig {
    /// Catalog document
    pub catalog_path: PathBuf,

    /// Pending-update document
    pub pending_path: PathBuf,

    /// Where failure snapshots are written
    pub diagnostics_dir: PathBuf,

    /// Write a snapshot when every selector for a key failed
    pub capture_diagnostics: bool,
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("healing/catalog.json"),
            pending_path: PathBuf::from("healing/pending-updates.json"),
            diagnostics_dir: PathBuf::from("healing"),
            capture_diagnostics: true,
        }
    }
}

impl HealConfig {
    /// Overlay `SELFHEAL_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Overlay values from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(path) = non_empty(ENV_CATALOG_PATH) {
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty(ENV_PENDING_PATH) {
            self.pending_path = PathBuf::from(path);
        }
        if let Some(dir) = non_empty(ENV_DIAGNOSTICS_DIR) {
            self.diagnostics_dir = PathBuf::from(dir);
        }
        if let Some(flag) = non_empty(ENV_CAPTURE_DIAGNOSTICS).and_then(|v| parse_flag(&v)) {
            self.capture_diagnostics = flag;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<HealConfig, ConfigError> {
    let raw = fs::read_to_string(path.as_ref())?;
    parse_config_str(&raw)
}

/// Parse JSON, falling back to YAML
pub fn parse_config_str(raw: &str) -> Result<HealConfig, ConfigError> {
    match serde_json::from_str(raw) {
        Ok(config) => Ok(config),
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            ConfigError::Deserialize(format!(
                "json error: {}; yaml error: {}",
                json_err, yaml_err
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn yaml_with_partial_fields_keeps_defaults() {
        let config = parse_config_str("catalog_path: fixtures/catalog.json\n").unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("fixtures/catalog.json"));
        assert_eq!(config.pending_path, HealConfig::default().pending_path);
        assert!(config.capture_diagnostics);
    }

    #[test]
    fn json_is_accepted() {
        let config = parse_config_str(r#"{"capture_diagnostics": false}"#).unwrap();
        assert!(!config.capture_diagnostics);
    }

    #[test]
    fn garbage_reports_both_parsers() {
        let err = parse_config_str("catalog_path: [unterminated").unwrap_err();
        assert!(err.to_string().contains("yaml error"));
    }

    #[test]
    fn overrides_replace_paths_and_flag() {
        let vars: HashMap<&str, &str> = [
            (ENV_CATALOG_PATH, "/tmp/c.json"),
            (ENV_PENDING_PATH, " "),
            (ENV_CAPTURE_DIAGNOSTICS, "off"),
        ]
        .into_iter()
        .collect();

        let mut config = HealConfig::default();
        config.apply_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.catalog_path, PathBuf::from("/tmp/c.json"));
        assert_eq!(config.pending_path, HealConfig::default().pending_path);
        assert!(!config.capture_diagnostics);
    }
}
