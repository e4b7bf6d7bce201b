// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh processing commands shared by the `polymesh` binary

use crate::config::MeshConfig;
use crate::geometry::{analyze, IndexedMesh, MeshStats};
use crate::io;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a command that writes a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub vertex_count: usize,
    pub face_count: usize,
    /// Whether the command changed the mesh before writing it
    pub modified: bool,
}

fn load(input: &Path) -> Result<IndexedMesh> {
    io::import_mesh(input).with_context(|| format!("Failed to import {}", input.display()))
}

fn save(mesh: &IndexedMesh, output: &Path) -> Result<()> {
    io::export_mesh(mesh, output).with_context(|| format!("Failed to export {}", output.display()))
}

fn summary(mesh: &IndexedMesh, modified: bool) -> WriteSummary {
    WriteSummary {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        modified,
    }
}

/// Import a mesh and compute its statistics
pub fn info(input: &Path) -> Result<(MeshStats, Duration)> {
    let start = Instant::now();
    let mesh = load(input)?;
    let stats = analyze(&mesh);
    Ok((stats, start.elapsed()))
}

/// Compact the mesh, weld identical vertices and orient faces consistently
pub fn clean(input: &Path, output: &Path, config: &MeshConfig) -> Result<WriteSummary> {
    let mut mesh = load(input)?;
    let before = (mesh.vertex_count(), mesh.face_count());

    let valid = mesh.compact();
    let welded = mesh
        .vertices_mut()
        .combine_identical(config.weld.ignore_normals, config.weld.ignore_additional);
    let culled = mesh.faces_mut().cull_degenerate_faces();
    let flipped = mesh.unify_normals();
    info!(valid, welded, culled, flipped, "cleaned mesh");

    save(&mesh, output)?;
    let resized = before != (mesh.vertex_count(), mesh.face_count());
    Ok(summary(&mesh, resized || welded || flipped > 0))
}

/// Split every quad into two triangles
pub fn triangulate(input: &Path, output: &Path) -> Result<WriteSummary> {
    let mut mesh = load(input)?;
    let modified = mesh.faces_mut().convert_quads_to_triangles();
    debug!(modified, faces = mesh.face_count(), "triangulated");
    save(&mesh, output)?;
    Ok(summary(&mesh, modified))
}

/// Pair coplanar triangles into quads using the configured tolerances
pub fn quadrangulate(input: &Path, output: &Path, config: &MeshConfig) -> Result<WriteSummary> {
    let mut mesh = load(input)?;
    let modified = mesh.faces_mut().convert_triangles_to_quads(
        config.quads.angle_tolerance_radians(),
        config.quads.min_diagonal_ratio,
    );
    debug!(modified, faces = mesh.face_count(), "quadrangulated");
    save(&mesh, output)?;
    Ok(summary(&mesh, modified))
}

/// Meshing parameters of the configured preset as TOML
pub fn meshing_parameters_toml(config: &MeshConfig) -> Result<String> {
    toml::to_string_pretty(&config.meshing_parameters()).context("Failed to serialize meshing parameters")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use nalgebra::Point3;

    fn write_box(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("box.json");
        let bbox = BoundingBox::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        let mesh = IndexedMesh::create_from_box(&bbox).unwrap();
        io::export_mesh(&mesh, &path).unwrap();
        path
    }

    #[test]
    fn test_info() {
        let dir = tempfile::tempdir().unwrap();
        let (stats, _) = info(&write_box(dir.path())).unwrap();
        assert_eq!(stats.quad_count, 6);
        assert!(stats.is_closed);
        assert!((stats.volume - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangulate_then_quadrangulate() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_box(dir.path());
        let triangles = dir.path().join("triangles.json");
        let quads = dir.path().join("quads.json");

        let first = triangulate(&input, &triangles).unwrap();
        assert!(first.modified);
        assert_eq!(first.face_count, 12);

        let second = quadrangulate(&triangles, &quads, &MeshConfig::default()).unwrap();
        assert!(second.modified);
        assert_eq!(second.face_count, 6);
    }

    #[test]
    fn test_clean_welds_triangle_soup() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("soup.json");
        let output = dir.path().join("clean.stl");

        let mut soup = IndexedMesh::new();
        soup.vertices_mut().add_range([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ]);
        soup.faces_mut().add_triangle(0, 1, 2);
        soup.faces_mut().add_triangle(3, 4, 5);
        io::export_mesh(&soup, &input).unwrap();

        let result = clean(&input, &output, &MeshConfig::default()).unwrap();
        assert!(result.modified);
        assert_eq!(result.vertex_count, 4);
        assert_eq!(result.face_count, 2);
        assert!(output.exists());
    }

    #[test]
    fn test_missing_input_has_context() {
        let err = info(Path::new("/nonexistent/polymesh/box.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to import"));
    }

    #[test]
    fn test_parameters_toml() {
        let text = meshing_parameters_toml(&MeshConfig::default()).unwrap();
        assert!(text.contains("refine_grid = true"));
    }
}
