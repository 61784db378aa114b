//! Power constants - Kp by material and Brinell hardness
//!
//! Loaded once and handed to whatever needs a power estimate.

use crate::error::{LoadError, LookupError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerConstant {
    #[serde(rename = "Kp")]
    pub kp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardnessBrackets {
    /// Upper bound of each bracket (HB) to its constant
    #[serde(rename = "Brinell Hardness")]
    pub brinell: BTreeMap<u32, PowerConstant>,
}

/// Read-only Kp lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerConstants {
    #[serde(rename = "Material")]
    materials: HashMap<String, HardnessBrackets>,
}

impl PowerConstants {
    pub fn from_yaml(source: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let constants = Self::from_yaml(&content)?;
        info!(path = %path.display(), materials = constants.materials.len(), "loaded power constants");
        Ok(constants)
    }

    pub fn insert(&mut self, material: &str, max_hardness: u32, kp: f64) {
        self.materials
            .entry(material.to_string())
            .or_default()
            .brinell
            .insert(max_hardness, PowerConstant { kp });
    }

    /// Kp for `material` at `hardness` HB.
    ///
    /// A bracket key covers hardnesses above the previous key up to and including itself.
    pub fn kp(&self, material: &str, hardness: f64) -> Result<f64, LookupError> {
        let brackets = self
            .materials
            .get(material)
            .ok_or_else(|| LookupError::UnknownMaterial(material.to_string()))?;

        brackets
            .brinell
            .iter()
            .find(|(max, _)| hardness <= **max as f64)
            .map(|(_, constant)| constant.kp)
            .ok_or_else(|| LookupError::NoHardnessBracket {
                material: material.to_string(),
                hardness,
            })
    }
}

/// Removal rate and power for the current cut
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerEstimate {
    pub kp: f64,
    pub removal_rate: f64, // in^3/min
    pub motor_power: f64,  // hp
}
