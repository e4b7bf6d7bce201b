// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh analytics and statistics

use super::IndexedMesh;
use crate::utils::math;
use serde::{Deserialize, Serialize};

/// Summary of a mesh's size, shape and soundness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    pub vertex_count: usize,
    pub topology_vertex_count: usize,
    pub face_count: usize,
    pub triangle_count: usize,
    pub quad_count: usize,
    /// Faces that are invalid for the vertex count or have zero area
    pub degenerate_face_count: usize,
    pub hidden_vertex_count: usize,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Enclosed volume in cubic units, only meaningful for closed meshes
    pub volume: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Average vertex position [x, y, z]
    pub centroid: [f64; 3],
    pub naked_edge_count: usize,
    pub disjoint_pieces: usize,
    pub is_closed: bool,
    pub is_manifold: bool,
    pub is_oriented: bool,
    pub is_valid: bool,
}

impl MeshStats {
    /// Create empty stats
    pub fn empty() -> Self {
        Self {
            vertex_count: 0,
            topology_vertex_count: 0,
            face_count: 0,
            triangle_count: 0,
            quad_count: 0,
            degenerate_face_count: 0,
            hidden_vertex_count: 0,
            surface_area: 0.0,
            volume: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            naked_edge_count: 0,
            disjoint_pieces: 0,
            is_closed: false,
            is_manifold: false,
            is_oriented: false,
            is_valid: true,
        }
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.bbox[3] - self.bbox[0],
            self.bbox[4] - self.bbox[1],
            self.bbox[5] - self.bbox[2],
        ]
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &IndexedMesh) -> MeshStats {
    let vertex_count = mesh.vertex_count();
    let face_count = mesh.face_count();

    if vertex_count == 0 {
        return MeshStats {
            face_count,
            degenerate_face_count: face_count,
            is_valid: mesh.is_valid(),
            ..MeshStats::empty()
        };
    }

    let faces = mesh.faces();
    let topology = mesh.topology();
    let report = mesh.is_manifold(true);
    let area_normals = super::normals::area_normals(mesh);

    MeshStats {
        vertex_count,
        topology_vertex_count: topology.topology_vertex_count(),
        face_count,
        triangle_count: faces.triangle_count(),
        quad_count: faces.quad_count(),
        degenerate_face_count: area_normals.iter().filter(|n| n.is_none()).count(),
        hidden_vertex_count: mesh.vertices().hidden_count(),
        surface_area: area_normals
            .iter()
            .flatten()
            .map(|n| f64::from(n.norm()) * 0.5)
            .sum(),
        volume: mesh
            .signed_volume_with((0..face_count).map(|f| (f, false)))
            .abs(),
        bbox: calculate_bounding_box(mesh),
        centroid: calculate_centroid(mesh),
        naked_edge_count: topology.edges().iter().filter(|e| e.is_naked()).count(),
        disjoint_pieces: mesh.disjoint_mesh_count(),
        is_closed: mesh.is_closed(),
        is_manifold: report.is_manifold,
        is_oriented: report.is_oriented,
        is_valid: mesh.is_valid(),
    }
}

fn calculate_bounding_box(mesh: &IndexedMesh) -> [f64; 6] {
    let bbox = mesh.bounding_box();
    let (min, max) = (math::to_f64(&bbox.min), math::to_f64(&bbox.max));
    [min.x, min.y, min.z, max.x, max.y, max.z]
}

fn calculate_centroid(mesh: &IndexedMesh) -> [f64; 3] {
    let vertices = mesh.vertices();
    let sum = vertices
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + math::to_f64(&p).coords);
    let centroid = sum / vertices.count() as f64;
    [centroid.x, centroid.y, centroid.z]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Interval, Plane, Sphere};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_analyze_box() {
        let bbox = BoundingBox::new(Point3::new(-5.0, -5.0, -5.0), Point3::new(5.0, 5.0, 5.0));
        let mesh = IndexedMesh::create_from_box(&bbox).unwrap();
        let stats = analyze(&mesh);

        assert_relative_eq!(stats.volume, 1000.0, epsilon = 1e-6);
        assert_relative_eq!(stats.surface_area, 600.0, epsilon = 1e-4);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.quad_count, 6);
        assert_eq!(stats.size(), [10.0, 10.0, 10.0]);
        assert!(stats.centroid.iter().all(|c| c.abs() < 1e-9));
        assert!(stats.is_closed && stats.is_manifold && stats.is_oriented);
        assert_eq!(stats.naked_edge_count, 0);
        assert_eq!(stats.disjoint_pieces, 1);
    }

    #[test]
    fn test_analyze_sphere() {
        let sphere = Sphere::new(Point3::origin(), 5.0);
        let mesh = IndexedMesh::create_from_sphere(&sphere, 48, 24).unwrap();
        let stats = analyze(&mesh);

        let expected_volume = 4.0 / 3.0 * std::f64::consts::PI * 5.0_f64.powi(3);
        let expected_area = 4.0 * std::f64::consts::PI * 5.0_f64.powi(2);
        assert!(
            (stats.volume - expected_volume).abs() < expected_volume * 0.05,
            "Volume {} not close to expected {}",
            stats.volume,
            expected_volume
        );
        assert!(
            (stats.surface_area - expected_area).abs() < expected_area * 0.05,
            "Surface area {} not close to expected {}",
            stats.surface_area,
            expected_area
        );
        assert!(stats.is_closed);
    }

    #[test]
    fn test_open_grid_has_boundary() {
        let mesh =
            IndexedMesh::create_from_plane(&Plane::world_xy(), Interval::UNIT, Interval::UNIT, 3, 3)
                .unwrap();
        let stats = analyze(&mesh);
        assert!(!stats.is_closed);
        assert_eq!(stats.naked_edge_count, 12);
        assert_eq!(stats.topology_vertex_count, 16);
    }

    #[test]
    fn test_empty_mesh() {
        let stats = analyze(&IndexedMesh::new());
        assert_eq!(stats, MeshStats::empty());
    }
}
