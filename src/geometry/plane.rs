// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Small geometric value types used by mesh construction and queries

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

const AXIS_TOLERANCE: f64 = 1e-8;

/// Closed numeric interval `[t0, t1]`. `t0` may exceed `t1` (decreasing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub t0: f64,
    pub t1: f64,
}

impl Interval {
    pub const UNIT: Interval = Interval { t0: 0.0, t1: 1.0 };

    pub const fn new(t0: f64, t1: f64) -> Self {
        Self { t0, t1 }
    }

    pub fn is_valid(&self) -> bool {
        self.t0.is_finite() && self.t1.is_finite()
    }

    pub fn length(&self) -> f64 {
        self.t1 - self.t0
    }

    /// Point at normalized parameter `t`.
    pub fn parameter_at(&self, t: f64) -> f64 {
        self.t0 + (self.t1 - self.t0) * t
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Oriented plane with an orthonormal frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3<f64>,
    pub x_axis: Vector3<f64>,
    pub y_axis: Vector3<f64>,
    pub z_axis: Vector3<f64>,
}

impl Plane {
    /// Plane through `origin` spanned by `x_axis` and `y_axis`.
    ///
    /// The axes are orthonormalized; the result is invalid if they are parallel
    /// or zero.
    pub fn new(origin: Point3<f64>, x_axis: Vector3<f64>, y_axis: Vector3<f64>) -> Self {
        let x = x_axis.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        let z = x.cross(&y_axis).try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        let y = z.cross(&x);
        Self {
            origin,
            x_axis: x,
            y_axis: y,
            z_axis: z,
        }
    }

    pub fn world_xy() -> Self {
        Self {
            origin: Point3::origin(),
            x_axis: Vector3::x(),
            y_axis: Vector3::y(),
            z_axis: Vector3::z(),
        }
    }

    pub fn is_valid(&self) -> bool {
        let finite = self.origin.iter().all(|v| v.is_finite())
            && self.x_axis.iter().all(|v| v.is_finite())
            && self.y_axis.iter().all(|v| v.is_finite())
            && self.z_axis.iter().all(|v| v.is_finite());
        if !finite {
            return false;
        }
        let unit = |v: &Vector3<f64>| (v.norm() - 1.0).abs() <= AXIS_TOLERANCE;
        unit(&self.x_axis)
            && unit(&self.y_axis)
            && unit(&self.z_axis)
            && self.x_axis.dot(&self.y_axis).abs() <= AXIS_TOLERANCE
            && (self.x_axis.cross(&self.y_axis) - self.z_axis).norm() <= AXIS_TOLERANCE
    }

    /// World point at plane coordinates `(u, v)`.
    pub fn point_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.origin + self.x_axis * u + self.y_axis * v
    }

    /// Signed distance of `point` along the plane normal.
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).dot(&self.z_axis)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::world_xy()
    }
}

/// Sphere described by an equatorial plane and a radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub plane: Plane,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        let mut plane = Plane::world_xy();
        plane.origin = center;
        Self { plane, radius }
    }

    pub fn center(&self) -> Point3<f64> {
        self.plane.origin
    }

    pub fn is_valid(&self) -> bool {
        self.plane.is_valid() && self.radius.is_finite() && self.radius > 0.0
    }
}

/// Open or closed chain of points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point3<f64>>,
}

impl Polyline {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last points coincide.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }

    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}
