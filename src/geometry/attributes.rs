// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex color and texture coordinate list views

use super::{Color, IndexedMesh, Interval};
use crate::error::{MeshError, Result};
use nalgebra::Point2;
use std::ops::{Deref, DerefMut};

/// Per-vertex colors. Stored colors are always opaque.
pub struct VertexColorList<M> {
    mesh: M,
}

impl<M: Deref<Target = IndexedMesh>> VertexColorList<M> {
    pub(crate) fn new(mesh: M) -> Self {
        Self { mesh }
    }

    pub fn count(&self) -> usize {
        self.mesh.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Color> {
        self.mesh
            .colors
            .get(index)
            .copied()
            .ok_or_else(|| MeshError::out_of_range(index, self.count()))
    }

    pub fn as_slice(&self) -> &[Color] {
        &self.mesh.colors
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Color> + '_ {
        self.mesh.colors.iter().copied()
    }
}

impl<M: DerefMut<Target = IndexedMesh>> VertexColorList<M> {
    /// Truncate, or pad with black.
    pub fn set_count(&mut self, count: usize) {
        if count == self.count() {
            return;
        }
        self.mesh.colors.resize(count, Color::BLACK);
        self.mesh.touch();
    }

    pub fn set(&mut self, index: usize, color: Color) -> Result<()> {
        let count = self.count();
        let slot = self
            .mesh
            .colors
            .get_mut(index)
            .ok_or_else(|| MeshError::out_of_range(index, count))?;
        *slot = color.opaque();
        self.mesh.touch();
        Ok(())
    }

    /// Modify color `index`, or append when `index` equals the count.
    pub fn set_color(&mut self, index: usize, color: Color) -> Result<()> {
        if index == self.count() {
            self.add(color);
            return Ok(());
        }
        self.set(index, color)
    }

    pub fn add(&mut self, color: Color) -> usize {
        let index = self.count();
        self.mesh.colors.push(color.opaque());
        self.mesh.touch();
        index
    }

    pub fn add_rgb(&mut self, r: u8, g: u8, b: u8) -> usize {
        self.add(Color::rgb(r, g, b))
    }

    /// Replace every color. False (and no change) when `colors` is empty.
    pub fn set_colors(&mut self, colors: &[Color]) -> bool {
        if colors.is_empty() {
            return false;
        }
        self.mesh.colors = colors.iter().map(Color::opaque).collect();
        self.mesh.touch();
        true
    }

    /// Append colors after the existing ones. False when `colors` is empty.
    pub fn append_colors(&mut self, colors: &[Color]) -> bool {
        if colors.is_empty() {
            return false;
        }
        self.mesh.colors.extend(colors.iter().map(Color::opaque));
        self.mesh.touch();
        true
    }

    /// Give every vertex the same color. False when the mesh has no vertices.
    pub fn create_monotone_mesh(&mut self, color: Color) -> bool {
        let count = self.mesh.vertices.len();
        if count == 0 {
            return false;
        }
        self.mesh.colors = vec![color.opaque(); count];
        self.mesh.touch();
        true
    }

    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.mesh.colors.clear();
        self.mesh.touch();
    }
}

/// Per-vertex texture coordinates, interpreted inside the mesh texture domain.
pub struct TextureCoordinateList<M> {
    mesh: M,
}

impl<M: Deref<Target = IndexedMesh>> TextureCoordinateList<M> {
    pub(crate) fn new(mesh: M) -> Self {
        Self { mesh }
    }

    pub fn count(&self) -> usize {
        self.mesh.texture_coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.texture_coordinates.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Point2<f32>> {
        self.mesh
            .texture_coordinates
            .get(index)
            .copied()
            .ok_or_else(|| MeshError::out_of_range(index, self.count()))
    }

    pub fn as_slice(&self) -> &[Point2<f32>] {
        &self.mesh.texture_coordinates
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Point2<f32>> + '_ {
        self.mesh.texture_coordinates.iter().copied()
    }
}

impl<M: DerefMut<Target = IndexedMesh>> TextureCoordinateList<M> {
    /// Truncate, or pad with `(0, 0)`.
    pub fn set_count(&mut self, count: usize) {
        if count == self.count() {
            return;
        }
        self.mesh.texture_coordinates.resize(count, Point2::origin());
        self.mesh.touch();
    }

    pub fn set(&mut self, index: usize, coordinate: Point2<f32>) -> Result<()> {
        let count = self.count();
        let slot = self
            .mesh
            .texture_coordinates
            .get_mut(index)
            .ok_or_else(|| MeshError::out_of_range(index, count))?;
        *slot = coordinate;
        self.mesh.touch();
        Ok(())
    }

    /// Modify coordinate `index`, or append when `index` equals the count.
    pub fn set_texture_coordinate(&mut self, index: usize, coordinate: Point2<f32>) -> bool {
        if index == self.count() {
            self.add(coordinate);
            return true;
        }
        self.set(index, coordinate).is_ok()
    }

    pub fn add(&mut self, coordinate: Point2<f32>) -> usize {
        let index = self.count();
        self.mesh.texture_coordinates.push(coordinate);
        self.mesh.touch();
        index
    }

    pub fn add_range(&mut self, coordinates: &[Point2<f32>]) -> bool {
        if coordinates.is_empty() {
            return false;
        }
        self.mesh.texture_coordinates.extend_from_slice(coordinates);
        self.mesh.touch();
        true
    }

    /// Replace every coordinate. False (and no change) when empty.
    pub fn set_texture_coordinates(&mut self, coordinates: &[Point2<f32>]) -> bool {
        if coordinates.is_empty() {
            return false;
        }
        self.mesh.texture_coordinates = coordinates.to_vec();
        self.mesh.touch();
        true
    }

    /// Rescale both axes to `[0, 1]` and reset the texture domain to the
    /// unit square. An axis with no extent collapses to 0.
    pub fn normalize(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }

        let coordinates = &mut self.mesh.texture_coordinates;
        for axis in 0..2 {
            let (lo, hi) = coordinates
                .iter()
                .map(|c| c[axis])
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            let extent = hi - lo;
            for coordinate in coordinates.iter_mut() {
                coordinate[axis] = if extent > 0.0 {
                    (coordinate[axis] - lo) / extent
                } else {
                    0.0
                };
            }
        }

        self.mesh.texture_domain = [Interval::UNIT, Interval::UNIT];
        self.mesh.touch();
        true
    }

    /// Swap the s and t axes, together with the texture domain.
    pub fn transpose(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        for coordinate in &mut self.mesh.texture_coordinates {
            *coordinate = Point2::new(coordinate.y, coordinate.x);
        }
        self.mesh.texture_domain.swap(0, 1);
        self.mesh.touch();
        true
    }

    /// Mirror one axis (0 for s, 1 for t) inside its texture domain interval.
    pub fn reverse(&mut self, direction: usize) -> bool {
        if direction > 1 || self.is_empty() {
            return false;
        }
        let domain = self.mesh.texture_domain[direction];
        let sum = (domain.t0 + domain.t1) as f32;
        for coordinate in &mut self.mesh.texture_coordinates {
            coordinate[direction] = sum - coordinate[direction];
        }
        self.mesh.touch();
        true
    }

    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.mesh.texture_coordinates.clear();
        self.mesh.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn three_vertices() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices_mut().add_range([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh
    }

    #[test]
    fn test_colors_are_stored_opaque() {
        let mut mesh = three_vertices();
        mesh.vertex_colors_mut().add(Color::rgba(10, 20, 30, 40));
        assert_eq!(mesh.vertex_colors().get(0).unwrap(), Color::rgb(10, 20, 30));
        mesh.vertex_colors_mut().set(0, Color::from_argb(0x00FF0000)).unwrap();
        assert_eq!(mesh.vertex_colors().get(0).unwrap().a, 255);
    }

    #[test]
    fn test_set_color_append_and_range() {
        let mut mesh = three_vertices();
        mesh.vertex_colors_mut().set_color(0, Color::WHITE).unwrap();
        mesh.vertex_colors_mut().set_color(0, Color::BLACK).unwrap();
        assert_eq!(mesh.vertex_colors().count(), 1);
        assert!(matches!(
            mesh.vertex_colors_mut().set_color(5, Color::WHITE),
            Err(MeshError::IndexOutOfRange { index: 5, count: 1 })
        ));
    }

    #[test]
    fn test_monotone_and_append() {
        let mut mesh = three_vertices();
        assert!(mesh.vertex_colors_mut().create_monotone_mesh(Color::rgb(1, 2, 3)));
        assert_eq!(mesh.vertex_colors().count(), 3);
        assert!(mesh.vertex_colors_mut().append_colors(&[Color::WHITE]));
        assert_eq!(mesh.vertex_colors().count(), 4);
        assert!(!mesh.vertex_colors_mut().set_colors(&[]));
        assert!(!IndexedMesh::new().vertex_colors_mut().create_monotone_mesh(Color::WHITE));
    }

    #[test]
    fn test_normalize_texture_coordinates() {
        let mut mesh = three_vertices();
        mesh.set_texture_domain(Interval::new(0.0, 4.0), Interval::new(0.0, 2.0));
        mesh.texture_coordinates_mut().set_texture_coordinates(&[
            Point2::new(1.0, 2.0),
            Point2::new(3.0, 2.0),
            Point2::new(2.0, 2.0),
        ]);
        assert!(mesh.texture_coordinates_mut().normalize());
        assert_eq!(mesh.texture_coordinates().get(0).unwrap(), Point2::new(0.0, 0.0));
        assert_eq!(mesh.texture_coordinates().get(1).unwrap(), Point2::new(1.0, 0.0));
        assert_eq!(mesh.texture_coordinates().get(2).unwrap(), Point2::new(0.5, 0.0));
        assert_eq!(mesh.texture_domain(), [Interval::UNIT, Interval::UNIT]);
    }

    #[test]
    fn test_reverse_within_domain() {
        let mut mesh = three_vertices();
        mesh.set_texture_domain(Interval::new(0.0, 2.0), Interval::UNIT);
        mesh.texture_coordinates_mut().add(Point2::new(0.5, 0.25));
        assert!(mesh.texture_coordinates_mut().reverse(0));
        assert_eq!(mesh.texture_coordinates().get(0).unwrap(), Point2::new(1.5, 0.25));
        assert!(mesh.texture_coordinates_mut().reverse(1));
        assert_eq!(mesh.texture_coordinates().get(0).unwrap(), Point2::new(1.5, 0.75));
        assert!(!mesh.texture_coordinates_mut().reverse(2));
    }

    #[test]
    fn test_transpose() {
        let mut mesh = three_vertices();
        mesh.set_texture_domain(Interval::new(0.0, 2.0), Interval::UNIT);
        mesh.texture_coordinates_mut().add(Point2::new(0.5, 0.25));
        assert!(mesh.texture_coordinates_mut().transpose());
        assert_eq!(mesh.texture_coordinates().get(0).unwrap(), Point2::new(0.25, 0.5));
        assert_eq!(mesh.texture_domain()[1], Interval::new(0.0, 2.0));
    }
}
