// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh face: four vertex indices encoding a triangle or a quad

use serde::{Deserialize, Serialize};
use std::fmt;

/// Face defined by four vertex indices.
///
/// A face whose third and fourth corners are equal (`c == d`) is a triangle,
/// anything else is a quad. Indices are signed so that the [`MeshFace::UNSET`]
/// sentinel and deliberately invalid faces can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshFace {
    pub a: i32,
    pub b: i32,
    pub c: i32,
    pub d: i32,
}

impl MeshFace {
    /// Face with every corner set to `i32::MIN`, returned by lookups that fail.
    pub const UNSET: MeshFace = MeshFace {
        a: i32::MIN,
        b: i32::MIN,
        c: i32::MIN,
        d: i32::MIN,
    };

    /// Create a triangle; the fourth corner repeats the third.
    pub const fn triangle(a: i32, b: i32, c: i32) -> Self {
        Self { a, b, c, d: c }
    }

    /// Create a quad.
    pub const fn quad(a: i32, b: i32, c: i32, d: i32) -> Self {
        Self { a, b, c, d }
    }

    pub const fn is_triangle(&self) -> bool {
        self.c == self.d
    }

    pub const fn is_quad(&self) -> bool {
        self.c != self.d
    }

    /// True when every corner is the `i32::MIN` sentinel.
    pub const fn is_unset(&self) -> bool {
        self.a == i32::MIN && self.b == i32::MIN && self.c == i32::MIN && self.d == i32::MIN
    }

    /// Context-free validity: no negative corner and no repeated corner,
    /// except that `d` may repeat `c`.
    ///
    /// A face that passes this check can still be invalid for a particular
    /// mesh; see [`MeshFace::is_valid_for`].
    pub const fn is_valid(&self) -> bool {
        if self.a < 0 || self.b < 0 || self.c < 0 || self.d < 0 {
            return false;
        }
        if self.a == self.b || self.a == self.c || self.a == self.d {
            return false;
        }
        if self.b == self.c || self.b == self.d {
            return false;
        }
        true
    }

    /// Validity within a mesh of `vertex_count` vertices.
    pub fn is_valid_for(&self, vertex_count: usize) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.corners()
            .iter()
            .all(|&corner| (corner as usize) < vertex_count)
    }

    /// Overwrite all corners as a triangle.
    pub fn set_triangle(&mut self, a: i32, b: i32, c: i32) {
        *self = Self::triangle(a, b, c);
    }

    /// Overwrite all corners as a quad.
    pub fn set_quad(&mut self, a: i32, b: i32, c: i32, d: i32) {
        *self = Self::quad(a, b, c, d);
    }

    /// Reverse the orientation, keeping corner `a` first.
    ///
    /// Triangles become `(a, c, b, b)`. Quads become `(a, d, c, a)`: the
    /// fourth slot repeats `a`, so a flipped quad is no longer valid. Callers
    /// that need a sound quad reversal should build `(a, d, c, b)` themselves.
    pub const fn flip(&self) -> MeshFace {
        if self.c == self.d {
            MeshFace::quad(self.a, self.c, self.b, self.b)
        } else {
            MeshFace::quad(self.a, self.d, self.c, self.a)
        }
    }

    /// Orientation reversal that keeps quads valid: `(a, d, c, b)`.
    pub(crate) const fn reversed(&self) -> MeshFace {
        if self.c == self.d {
            MeshFace::triangle(self.a, self.c, self.b)
        } else {
            MeshFace::quad(self.a, self.d, self.c, self.b)
        }
    }

    pub const fn corners(&self) -> [i32; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Distinct corner sequence: three entries for a triangle, four for a quad.
    pub fn polygon(&self) -> Vec<usize> {
        if self.is_triangle() {
            vec![self.a as usize, self.b as usize, self.c as usize]
        } else {
            vec![self.a as usize, self.b as usize, self.c as usize, self.d as usize]
        }
    }

    /// Directed edges walking the face boundary.
    pub(crate) fn edges(&self) -> Vec<(usize, usize)> {
        let polygon = self.polygon();
        let n = polygon.len();
        (0..n).map(|i| (polygon[i], polygon[(i + 1) % n])).collect()
    }

    /// Apply an index remap to every corner. Corners outside the map are kept.
    pub(crate) fn remapped(&self, map: &[usize]) -> MeshFace {
        let remap = |corner: i32| match usize::try_from(corner) {
            Ok(index) if index < map.len() => map[index] as i32,
            _ => corner,
        };
        MeshFace::quad(remap(self.a), remap(self.b), remap(self.c), remap(self.d))
    }
}

impl Default for MeshFace {
    fn default() -> Self {
        Self::UNSET
    }
}

impl fmt::Display for MeshFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_triangle() {
            write!(f, "T({}, {}, {})", self.a, self.b, self.c)
        } else {
            write!(f, "Q({}, {}, {}, {})", self.a, self.b, self.c, self.d)
        }
    }
}

impl From<[i32; 3]> for MeshFace {
    fn from(corners: [i32; 3]) -> Self {
        Self::triangle(corners[0], corners[1], corners[2])
    }
}

impl From<[i32; 4]> for MeshFace {
    fn from(corners: [i32; 4]) -> Self {
        Self::quad(corners[0], corners[1], corners[2], corners[3])
    }
}
