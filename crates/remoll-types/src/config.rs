// ─────────────────────────────────────────────────────────────────────
// Remoll Field — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{DEFAULT_FIELD_SCALE, DEFAULT_Z_OFFSET};
use crate::error::{FieldMapError, FieldMapResult};
use serde::{Deserialize, Serialize};

/// Set of field maps making up the global magnetic field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSetupConfig {
    pub maps: Vec<MagnetConfig>,
}

/// One tabulated magnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagnetConfig {
    /// Field map file (plain text, or gzip when it ends in `.gz`).
    pub file: String,
    /// Dimensionless multiplier applied to every returned component.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Longitudinal translation of the map (m).
    #[serde(default = "default_z_offset")]
    pub z_offset: f64,
    /// Current the map was tabulated at; enables scaling by magnet current.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_current: Option<f64>,
}

fn default_scale() -> f64 {
    DEFAULT_FIELD_SCALE
}
fn default_z_offset() -> f64 {
    DEFAULT_Z_OFFSET
}

impl MagnetConfig {
    pub fn new(file: impl Into<String>) -> Self {
        MagnetConfig {
            file: file.into(),
            scale: default_scale(),
            z_offset: default_z_offset(),
            reference_current: None,
        }
    }
}

impl FieldSetupConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> FieldMapResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would silently corrupt every query.
    pub fn validate(&self) -> FieldMapResult<()> {
        for magnet in &self.maps {
            if magnet.file.trim().is_empty() {
                return Err(FieldMapError::ConfigError(
                    "field map entry has an empty file name".to_string(),
                ));
            }
            if !magnet.scale.is_finite() || !magnet.z_offset.is_finite() {
                return Err(FieldMapError::ConfigError(format!(
                    "field map '{}' has non-finite scale or z_offset",
                    magnet.file
                )));
            }
            if let Some(current) = magnet.reference_current {
                if !current.is_finite() || current == 0.0 {
                    return Err(FieldMapError::ConfigError(format!(
                        "field map '{}' needs a finite, non-zero reference_current",
                        magnet.file
                    )));
                }
            }
        }
        Ok(())
    }
}
