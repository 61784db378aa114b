//! Configuration - JSON file, every field optional

use crate::error::LoadError;
use crate::model::{Operation, Tool};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Starting values for a new session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub teeth: u32,
    pub cut_width: f64,
    pub depth_of_cut: f64,
    pub chipload: f64,
    pub feed_factor: f64,
    pub wear_factor: f64,
    pub efficiency: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        let op = Operation::default();
        Self {
            teeth: Tool::default().teeth,
            cut_width: op.cut_width,
            depth_of_cut: op.depth_of_cut,
            chipload: op.chipload,
            feed_factor: op.feed_factor,
            wear_factor: op.wear_factor,
            efficiency: op.efficiency,
        }
    }
}

impl Defaults {
    pub fn tool(&self) -> Tool {
        Tool {
            teeth: self.teeth.max(1),
            ..Tool::default()
        }
    }

    pub fn operation(&self) -> Operation {
        Operation {
            cut_width: self.cut_width,
            depth_of_cut: self.depth_of_cut,
            chipload: self.chipload,
            feed_factor: self.feed_factor,
            wear_factor: self.wear_factor,
            efficiency: self.efficiency,
            ..Operation::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reference_table: PathBuf,
    pub power_constants: Option<PathBuf>,
    pub defaults: Defaults,
    /// Setting the cutter diameter also sets the depth of cut to it
    pub doc_follows_diameter: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_table: PathBuf::from("data/feed_speed_reference.csv"),
            power_constants: Some(PathBuf::from("data/power_constants.yaml")),
            defaults: Defaults::default(),
            doc_follows_diameter: false,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.defaults.teeth, 1);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_json(
            r#"{
                "reference_table": "tables/wood.csv",
                "power_constants": null,
                "defaults": { "teeth": 2, "efficiency": 0.8 },
                "doc_follows_diameter": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.reference_table, PathBuf::from("tables/wood.csv"));
        assert_eq!(config.power_constants, None);
        assert!(config.doc_follows_diameter);
        assert_eq!(config.defaults.teeth, 2);
        assert_eq!(config.defaults.efficiency, 0.8);
        assert_eq!(config.defaults.cut_width, 2.0);

        let op = config.defaults.operation();
        assert_eq!(op.efficiency, 0.8);
        assert_eq!(config.defaults.tool().teeth, 2);
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            Config::from_json("{ \"defaults\": 3 }"),
            Err(LoadError::Json(_))
        ));
    }
}
