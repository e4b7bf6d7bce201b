// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshing parameters handed to an external kernel when meshing breps

use crate::error::MeshError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Density and quality settings for turning surfaces into meshes.
///
/// Angles are in radians. A zero tolerance or edge length means "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshingParameters {
    pub jagged_seams: bool,
    pub refine_grid: bool,
    pub simple_planes: bool,
    pub compute_curvature: bool,
    pub grid_min_count: u32,
    pub grid_max_count: u32,
    pub grid_angle: f64,
    pub grid_aspect_ratio: f64,
    pub grid_amplification: f64,
    pub tolerance: f64,
    pub minimum_tolerance: f64,
    pub relative_tolerance: f64,
    pub refine_angle: f64,
    pub minimum_edge_length: f64,
    pub maximum_edge_length: f64,
}

impl MeshingParameters {
    /// Fewest faces that still represent the surface; seams are not welded.
    pub fn minimal() -> Self {
        Self {
            jagged_seams: true,
            refine_grid: false,
            simple_planes: false,
            compute_curvature: false,
            grid_min_count: 16,
            grid_max_count: 0,
            grid_angle: 0.0,
            grid_aspect_ratio: 6.0,
            grid_amplification: 1.0,
            tolerance: 0.0,
            minimum_tolerance: 0.0,
            relative_tolerance: 0.0,
            refine_angle: 0.0,
            minimum_edge_length: 0.0001,
            maximum_edge_length: 0.0,
        }
    }

    pub fn coarse() -> Self {
        Self {
            simple_planes: true,
            grid_min_count: 16,
            grid_angle: 0.0,
            grid_aspect_ratio: 0.0,
            grid_amplification: 0.0,
            relative_tolerance: 0.65,
            refine_angle: 0.0,
            ..Self::default()
        }
    }

    pub fn smooth() -> Self {
        Self {
            relative_tolerance: 0.8,
            refine_angle: 20f64.to_radians(),
            ..Self::coarse()
        }
    }

    pub fn preset(preset: MeshingPreset) -> Self {
        match preset {
            MeshingPreset::Minimal => Self::minimal(),
            MeshingPreset::Default => Self::default(),
            MeshingPreset::Coarse => Self::coarse(),
            MeshingPreset::Smooth => Self::smooth(),
        }
    }

    /// Non-negative finite numbers and a relative tolerance inside `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        let values = [
            self.grid_angle,
            self.grid_aspect_ratio,
            self.grid_amplification,
            self.tolerance,
            self.minimum_tolerance,
            self.relative_tolerance,
            self.refine_angle,
            self.minimum_edge_length,
            self.maximum_edge_length,
        ];
        values.iter().all(|v| v.is_finite() && *v >= 0.0) && self.relative_tolerance <= 1.0
    }
}

impl Default for MeshingParameters {
    fn default() -> Self {
        Self {
            jagged_seams: false,
            refine_grid: true,
            simple_planes: false,
            compute_curvature: false,
            grid_min_count: 0,
            grid_max_count: 0,
            grid_angle: 20f64.to_radians(),
            grid_aspect_ratio: 6.0,
            grid_amplification: 1.0,
            tolerance: 0.0,
            minimum_tolerance: 0.0,
            relative_tolerance: 0.0,
            refine_angle: 20f64.to_radians(),
            minimum_edge_length: 0.0001,
            maximum_edge_length: 0.0,
        }
    }
}

/// Named parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshingPreset {
    Minimal,
    #[default]
    Default,
    Coarse,
    Smooth,
}

impl MeshingPreset {
    pub const ALL: [MeshingPreset; 4] = [
        MeshingPreset::Minimal,
        MeshingPreset::Default,
        MeshingPreset::Coarse,
        MeshingPreset::Smooth,
    ];

    pub fn parameters(self) -> MeshingParameters {
        MeshingParameters::preset(self)
    }

    pub fn name(self) -> &'static str {
        match self {
            MeshingPreset::Minimal => "minimal",
            MeshingPreset::Default => "default",
            MeshingPreset::Coarse => "coarse",
            MeshingPreset::Smooth => "smooth",
        }
    }
}

impl fmt::Display for MeshingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeshingPreset {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeshingPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MeshError::Config(format!("unknown meshing preset '{s}'")))
    }
}
