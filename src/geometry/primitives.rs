// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh construction from planes, spheres and boxes

use super::{BoundingBox, IndexedMesh, Interval, MeshFace, Plane, Sphere};
use crate::error::{MeshError, Result};
use crate::utils::math;
use nalgebra::{Point2, Point3, Vector3};
use std::f64::consts::PI;
use tracing::trace;

impl IndexedMesh {
    /// Planar grid of `x_count` by `y_count` quads over the given plane
    /// intervals, with vertex normals along the plane normal and texture
    /// coordinates spanning the unit square.
    pub fn create_from_plane(
        plane: &Plane,
        x_interval: Interval,
        y_interval: Interval,
        x_count: usize,
        y_count: usize,
    ) -> Result<IndexedMesh> {
        if !plane.is_valid() {
            return Err(MeshError::invalid("plane is not valid"));
        }
        if !x_interval.is_valid() || !y_interval.is_valid() {
            return Err(MeshError::invalid("plane intervals must be finite"));
        }
        if x_count == 0 || y_count == 0 {
            return Err(MeshError::invalid(format!(
                "grid counts must be positive (x = {x_count}, y = {y_count})"
            )));
        }

        let columns = x_count + 1;
        let rows = y_count + 1;
        let normal = plane.z_axis.cast::<f32>();
        let mut mesh = IndexedMesh::with_capacity(columns * rows, x_count * y_count);

        for j in 0..rows {
            let t = j as f64 / y_count as f64;
            for i in 0..columns {
                let s = i as f64 / x_count as f64;
                let point = plane.point_at(x_interval.parameter_at(s), y_interval.parameter_at(t));
                mesh.vertices.push(math::to_f32(&point));
                mesh.normals.push(normal);
                mesh.texture_coordinates.push(Point2::new(s as f32, t as f32));
            }
        }

        for j in 0..y_count {
            for i in 0..x_count {
                let k = (j * columns + i) as i32;
                let up = columns as i32;
                mesh.faces.push(MeshFace::quad(k, k + 1, k + 1 + up, k + up));
            }
        }

        trace!(
            vertices = mesh.vertices.len(),
            faces = mesh.faces.len(),
            "created plane mesh"
        );
        Ok(mesh)
    }

    /// Latitude/longitude sphere with `x_count` segments around the axis and
    /// `y_count` bands from pole to pole. The poles are single vertices
    /// closed by triangle fans; the bands between are quads.
    pub fn create_from_sphere(sphere: &Sphere, x_count: usize, y_count: usize) -> Result<IndexedMesh> {
        if !sphere.is_valid() {
            return Err(MeshError::invalid("sphere is not valid"));
        }
        if x_count < 2 || y_count < 2 {
            return Err(MeshError::invalid(format!(
                "sphere counts must be at least 2 (x = {x_count}, y = {y_count})"
            )));
        }

        let frame = &sphere.plane;
        let radial = |theta: f64, phi: f64| -> Vector3<f64> {
            frame.x_axis * (phi.cos() * theta.cos())
                + frame.y_axis * (phi.cos() * theta.sin())
                + frame.z_axis * phi.sin()
        };
        let rings = y_count - 1;
        let mut mesh = IndexedMesh::with_capacity(2 + rings * x_count, x_count * y_count);
        let mut push = |direction: Vector3<f64>, uv: Point2<f32>| {
            let point = frame.origin + direction * sphere.radius;
            mesh.vertices.push(math::to_f32(&point));
            mesh.normals.push(direction.cast::<f32>());
            mesh.texture_coordinates.push(uv);
        };

        push(-frame.z_axis, Point2::new(0.5, 0.0));
        for j in 1..=rings {
            let phi = -PI / 2.0 + PI * j as f64 / y_count as f64;
            for i in 0..x_count {
                let theta = 2.0 * PI * i as f64 / x_count as f64;
                let uv = Point2::new(i as f32 / x_count as f32, j as f32 / y_count as f32);
                push(radial(theta, phi), uv);
            }
        }
        push(frame.z_axis, Point2::new(0.5, 1.0));

        let south = 0i32;
        let north = (1 + rings * x_count) as i32;
        let ring = |j: usize, i: usize| (1 + (j - 1) * x_count + i % x_count) as i32;

        for i in 0..x_count {
            mesh.faces.push(MeshFace::triangle(south, ring(1, i + 1), ring(1, i)));
        }
        for j in 1..rings {
            for i in 0..x_count {
                mesh.faces.push(MeshFace::quad(
                    ring(j, i),
                    ring(j, i + 1),
                    ring(j + 1, i + 1),
                    ring(j + 1, i),
                ));
            }
        }
        for i in 0..x_count {
            mesh.faces.push(MeshFace::triangle(north, ring(rings, i), ring(rings, i + 1)));
        }

        trace!(
            vertices = mesh.vertices.len(),
            faces = mesh.faces.len(),
            "created sphere mesh"
        );
        Ok(mesh)
    }

    /// Closed box with eight shared corners and six outward-facing quads.
    pub fn create_from_box(bbox: &BoundingBox) -> Result<IndexedMesh> {
        if !bbox.is_valid() {
            return Err(MeshError::invalid("bounding box is not valid"));
        }

        let (lo, hi) = (bbox.min, bbox.max);
        let mut mesh = IndexedMesh::with_capacity(8, 6);
        mesh.vertices.extend([
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ]);
        mesh.faces.extend([
            MeshFace::quad(0, 3, 2, 1), // bottom (z-)
            MeshFace::quad(4, 5, 6, 7), // top (z+)
            MeshFace::quad(0, 1, 5, 4), // front (y-)
            MeshFace::quad(1, 2, 6, 5), // right (x+)
            MeshFace::quad(2, 3, 7, 6), // back (y+)
            MeshFace::quad(3, 0, 4, 7), // left (x-)
        ]);
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_grid_counts() {
        let mesh = IndexedMesh::create_from_plane(
            &Plane::world_xy(),
            Interval::new(0.0, 2.0),
            Interval::new(0.0, 1.0),
            2,
            1,
        )
        .unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.faces().quad_count(), 2);
        assert!(mesh.is_valid());
        assert_eq!(mesh.vertices().get(5).unwrap(), Point3::new(2.0, 1.0, 0.0));
        assert_eq!(mesh.normals().get(3).unwrap(), Vector3::z());
        assert_eq!(mesh.texture_coordinates().get(4).unwrap(), Point2::new(0.5, 1.0));
    }

    #[test]
    fn test_plane_rejects_bad_input() {
        let plane = Plane::world_xy();
        assert!(matches!(
            IndexedMesh::create_from_plane(&plane, Interval::UNIT, Interval::UNIT, 0, 3),
            Err(MeshError::InvalidInput(_))
        ));
        assert!(IndexedMesh::create_from_plane(
            &plane,
            Interval::new(f64::NAN, 1.0),
            Interval::UNIT,
            1,
            1
        )
        .is_err());
        let degenerate = Plane::new(Point3::origin(), Vector3::x(), Vector3::x());
        assert!(
            IndexedMesh::create_from_plane(&degenerate, Interval::UNIT, Interval::UNIT, 1, 1)
                .is_err()
        );
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let sphere = Sphere::new(Point3::new(1.0, 2.0, 3.0), 2.0);
        let mut mesh = IndexedMesh::create_from_sphere(&sphere, 8, 4).unwrap();
        assert_eq!(mesh.vertex_count(), 2 + 3 * 8);
        assert_eq!(mesh.face_count(), 32);
        assert_eq!(mesh.faces().triangle_count(), 16);
        assert!(mesh.is_valid());
        assert!(mesh.is_closed());

        for (i, p) in mesh.vertices().iter().enumerate() {
            let d = (math::to_f64(&p) - sphere.center()).norm();
            assert_relative_eq!(d, 2.0, epsilon = 1e-5);
            let n = mesh.normals().get(i).unwrap();
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-5);
        }

        let stored = mesh.normals().as_slice().to_vec();
        assert!(mesh.normals_mut().compute_normals());
        for (computed, radial) in mesh.normals().iter().zip(stored) {
            assert!(computed.dot(&radial) > 0.5);
        }
    }

    #[test]
    fn test_sphere_rejects_low_counts() {
        let sphere = Sphere::new(Point3::origin(), 1.0);
        assert!(IndexedMesh::create_from_sphere(&sphere, 1, 4).is_err());
        assert!(IndexedMesh::create_from_sphere(&sphere, 4, 1).is_err());
        assert!(IndexedMesh::create_from_sphere(&Sphere::new(Point3::origin(), -1.0), 4, 4).is_err());
    }

    #[test]
    fn test_box_is_closed() {
        let bbox = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        let mesh = IndexedMesh::create_from_box(&bbox).unwrap();
        assert!(mesh.is_closed());
        assert!(IndexedMesh::create_from_box(&BoundingBox::empty()).is_err());
    }
}
