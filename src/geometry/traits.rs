// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Capabilities shared by geometry types

use super::{BoundingBox, IndexedMesh};
use nalgebra::{Matrix4, Vector3};

/// Deep copy detached from any owner or cache.
pub trait Duplicate {
    fn duplicate(&self) -> Self;
}

/// Geometry that can be moved by an affine transform.
pub trait Transformable {
    fn transform(&mut self, matrix: &Matrix4<f64>);

    fn translate(&mut self, offset: Vector3<f64>) {
        self.transform(&Matrix4::new_translation(&offset));
    }

    /// Uniform scale about the world origin.
    fn scale(&mut self, factor: f64) {
        self.transform(&Matrix4::new_scaling(factor));
    }
}

/// Geometry with an axis-aligned extent.
pub trait Bounded {
    fn bounding_box(&self) -> BoundingBox;
}

impl Duplicate for IndexedMesh {
    fn duplicate(&self) -> Self {
        IndexedMesh::duplicate(self)
    }
}

impl Transformable for IndexedMesh {
    fn transform(&mut self, matrix: &Matrix4<f64>) {
        IndexedMesh::transform(self, matrix);
    }
}

impl Bounded for IndexedMesh {
    fn bounding_box(&self) -> BoundingBox {
        IndexedMesh::bounding_box(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn extent<T: Bounded>(geometry: &T) -> Vector3<f32> {
        geometry.bounding_box().size()
    }

    #[test]
    fn test_mesh_capabilities() {
        let bbox = BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let mut mesh = IndexedMesh::create_from_box(&bbox).unwrap();
        Transformable::scale(&mut mesh, 2.0);
        Transformable::translate(&mut mesh, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(extent(&mesh), Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(Bounded::bounding_box(&mesh).min, Point3::new(1.0, 0.0, 0.0));

        let copy = Duplicate::duplicate(&mesh);
        assert_eq!(copy, mesh);
    }
}
