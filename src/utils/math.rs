// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Area-weighted normal of a triangle (length equals twice the area).
pub fn triangle_area_normal(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> Vector3<f32> {
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    v1.cross(&v2)
}

/// Normal of a quad from the cross product of its diagonals.
///
/// Length equals twice the area of a planar quad.
pub fn quad_area_normal(
    p0: &Point3<f32>,
    p1: &Point3<f32>,
    p2: &Point3<f32>,
    p3: &Point3<f32>,
) -> Vector3<f32> {
    let d0 = p2 - p0;
    let d1 = p3 - p1;
    d0.cross(&d1)
}

/// Unit normal, or `None` for a degenerate (zero length) input.
pub fn unit(v: &Vector3<f32>) -> Option<Vector3<f32>> {
    v.try_normalize(f32::MIN_POSITIVE)
}

/// Promote a single precision point.
pub fn to_f64(p: &Point3<f32>) -> Point3<f64> {
    Point3::new(p.x as f64, p.y as f64, p.z as f64)
}

/// Demote a double precision point.
pub fn to_f32(p: &Point3<f64>) -> Point3<f32> {
    Point3::new(p.x as f32, p.y as f32, p.z as f32)
}

/// Closest point to `p` on triangle `(a, b, c)`.
///
/// Region-based walk over the triangle's Voronoi regions.
pub fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_normals() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(1.0, 0.0, 0.0);
        let p2 = Point3::new(1.0, 1.0, 0.0);
        let p3 = Point3::new(0.0, 1.0, 0.0);
        assert_eq!(triangle_area_normal(&p0, &p1, &p2), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(quad_area_normal(&p0, &p1, &p2, &p3), Vector3::new(0.0, 0.0, 2.0));
        assert!(unit(&Vector3::zeros()).is_none());
    }

    #[test]
    fn test_closest_point_regions() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        let inside = closest_point_on_triangle(&Point3::new(0.25, 0.25, 3.0), &a, &b, &c);
        assert!((inside - Point3::new(0.25, 0.25, 0.0)).norm() < 1e-12);

        let corner = closest_point_on_triangle(&Point3::new(-1.0, -1.0, 0.0), &a, &b, &c);
        assert_eq!(corner, a);

        let edge = closest_point_on_triangle(&Point3::new(1.0, 1.0, 0.0), &a, &b, &c);
        assert!((edge - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
    }
}
