// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Configuration for mesh processing

use crate::geometry::{BooleanTolerances, MeshingParameters, MeshingPreset};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read by [`MeshConfig::load`] when present in the working directory.
pub const CONFIG_FILE: &str = "polymesh.toml";

/// Settings for triangle pairing in quad conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadConversion {
    /// Largest angle between paired triangle normals, in degrees
    pub angle_tolerance: f64,
    /// Smallest accepted ratio of the short diagonal to the long one
    pub min_diagonal_ratio: f64,
}

impl QuadConversion {
    pub fn angle_tolerance_radians(&self) -> f64 {
        self.angle_tolerance.to_radians()
    }
}

impl Default for QuadConversion {
    fn default() -> Self {
        Self {
            angle_tolerance: 2.0,
            min_diagonal_ratio: 0.875,
        }
    }
}

/// Which attributes must match when welding identical vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeldOptions {
    pub ignore_normals: bool,
    pub ignore_additional: bool,
}

/// Mesh processing configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Preset used for brep meshing unless `meshing` is given
    pub preset: MeshingPreset,
    /// Explicit meshing parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meshing: Option<MeshingParameters>,
    pub boolean: BooleanTolerances,
    pub quads: QuadConversion,
    pub weld: WeldOptions,
}

impl MeshConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: MeshConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `polymesh.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `POLYMESH_*` overrides read through `var`.
    ///
    /// An unknown preset is an error; unparsable numbers are ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(preset) = var("POLYMESH_PRESET") {
            self.preset = preset
                .parse()
                .with_context(|| format!("Invalid POLYMESH_PRESET: {preset}"))?;
            self.meshing = None;
        }

        if let Some(angle) = var("POLYMESH_ANGLE_TOLERANCE").and_then(|v| v.parse().ok()) {
            self.quads.angle_tolerance = angle;
        }

        if let Some(ratio) = var("POLYMESH_DIAGONAL_RATIO").and_then(|v| v.parse().ok()) {
            self.quads.min_diagonal_ratio = ratio;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Parameters for brep meshing: explicit values win over the preset
    pub fn meshing_parameters(&self) -> MeshingParameters {
        self.meshing.unwrap_or_else(|| self.preset.parameters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MeshConfig::default();
        assert_eq!(config.preset, MeshingPreset::Default);
        assert_eq!(config.meshing_parameters(), MeshingParameters::default());
        assert_eq!(config.quads.min_diagonal_ratio, 0.875);
        assert!((config.quads.angle_tolerance_radians() - 2f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_partial_toml() {
        let config: MeshConfig = toml::from_str(
            r#"
            preset = "smooth"

            [weld]
            ignore_normals = true
            "#,
        )
        .unwrap();
        assert_eq!(config.meshing_parameters(), MeshingParameters::smooth());
        assert!(config.weld.ignore_normals);
        assert!(!config.weld.ignore_additional);
        assert_eq!(config.boolean, BooleanTolerances::default());
    }

    #[test]
    fn test_overrides() {
        let mut config = MeshConfig {
            meshing: Some(MeshingParameters::minimal()),
            ..MeshConfig::default()
        };
        config
            .apply_overrides(|key| match key {
                "POLYMESH_PRESET" => Some("coarse".to_string()),
                "POLYMESH_ANGLE_TOLERANCE" => Some("5".to_string()),
                "POLYMESH_DIAGONAL_RATIO" => Some("not a number".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.meshing_parameters(), MeshingParameters::coarse());
        assert_eq!(config.quads.angle_tolerance, 5.0);
        assert_eq!(config.quads.min_diagonal_ratio, 0.875);

        let bad = config.apply_overrides(|key| (key == "POLYMESH_PRESET").then(|| "fine".to_string()));
        assert!(bad.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = MeshConfig {
            preset: MeshingPreset::Minimal,
            meshing: Some(MeshingParameters::smooth()),
            ..MeshConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(MeshConfig::from_file(&path).unwrap(), config);
        assert!(MeshConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
