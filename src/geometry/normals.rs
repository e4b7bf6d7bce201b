// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex and face normal list views

use super::{IndexedMesh, MeshFace};
use crate::error::{MeshError, Result};
use crate::utils::math;
use nalgebra::Vector3;
use rayon::prelude::*;
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

/// Face counts above which face normals are computed on the rayon pool.
const PARALLEL_FACE_THRESHOLD: usize = 4096;

/// Area-weighted normal of every face; `None` for faces that are invalid
/// or have zero area.
pub(crate) fn area_normals(mesh: &IndexedMesh) -> Vec<Option<Vector3<f32>>> {
    let normal = |face: &MeshFace| {
        mesh.face_area_normal(face)
            .filter(|n: &Vector3<f32>| n.norm_squared() > 0.0 && n.iter().all(|v| v.is_finite()))
    };
    if mesh.faces.len() > PARALLEL_FACE_THRESHOLD {
        mesh.faces.par_iter().map(normal).collect()
    } else {
        mesh.faces.iter().map(normal).collect()
    }
}

/// Unit face normals, zero for faces without a usable normal.
fn unit_face_normals(area_normals: &[Option<Vector3<f32>>]) -> Vec<Vector3<f32>> {
    area_normals
        .iter()
        .map(|n| n.as_ref().and_then(math::unit).unwrap_or_else(Vector3::zeros))
        .collect()
}

fn unitize(values: &mut [Vector3<f32>]) {
    for value in values {
        if let Some(unit) = math::unit(value) {
            *value = unit;
        }
    }
}

/// Access to the per-vertex normals of a mesh.
pub struct VertexNormalList<M> {
    mesh: M,
}

impl<M: Deref<Target = IndexedMesh>> VertexNormalList<M> {
    pub(crate) fn new(mesh: M) -> Self {
        Self { mesh }
    }

    pub fn count(&self) -> usize {
        self.mesh.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.normals.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Vector3<f32>> {
        self.mesh
            .normals
            .get(index)
            .copied()
            .ok_or_else(|| MeshError::out_of_range(index, self.count()))
    }

    pub fn as_slice(&self) -> &[Vector3<f32>] {
        &self.mesh.normals
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Vector3<f32>> + '_ {
        self.mesh.normals.iter().copied()
    }
}

impl<M: DerefMut<Target = IndexedMesh>> VertexNormalList<M> {
    /// Truncate, or pad with zero vectors.
    pub fn set_count(&mut self, count: usize) {
        if count == self.count() {
            return;
        }
        self.mesh.normals.resize(count, Vector3::zeros());
        self.mesh.touch();
    }

    pub fn set(&mut self, index: usize, normal: Vector3<f32>) -> Result<()> {
        let count = self.count();
        let slot = self
            .mesh
            .normals
            .get_mut(index)
            .ok_or_else(|| MeshError::out_of_range(index, count))?;
        *slot = normal;
        self.mesh.touch();
        Ok(())
    }

    /// Modify normal `index`, or append when `index` equals the count.
    pub fn set_normal(&mut self, index: usize, normal: Vector3<f32>) -> bool {
        if index == self.count() {
            self.add(normal);
            return true;
        }
        self.set(index, normal).is_ok()
    }

    pub fn add(&mut self, normal: Vector3<f32>) -> usize {
        let index = self.count();
        self.mesh.normals.push(normal);
        self.mesh.touch();
        index
    }

    /// Append many normals. False when `normals` is empty.
    pub fn add_range(&mut self, normals: &[Vector3<f32>]) -> bool {
        if normals.is_empty() {
            return false;
        }
        self.mesh.normals.extend_from_slice(normals);
        self.mesh.touch();
        true
    }

    /// Replace every normal. False (and no change) when `normals` is empty.
    pub fn set_normals(&mut self, normals: &[Vector3<f32>]) -> bool {
        if normals.is_empty() {
            return false;
        }
        self.mesh.normals = normals.to_vec();
        self.mesh.touch();
        true
    }

    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.mesh.normals.clear();
        self.mesh.touch();
    }

    /// Recompute vertex normals from the faces.
    ///
    /// Each vertex gets the normalized sum of the area-weighted normals of the
    /// faces that use it; vertices without any usable face get `+Z`. Face
    /// normals are refreshed as a side effect. Returns false, leaving the
    /// mesh untouched, when no face has a usable normal.
    pub fn compute_normals(&mut self) -> bool {
        let area = area_normals(&self.mesh);
        if area.iter().all(Option::is_none) {
            trace!(faces = area.len(), "no usable face normals");
            return false;
        }

        let vertex_count = self.mesh.vertices.len();
        let mut sums = vec![Vector3::<f64>::zeros(); vertex_count];
        for (face, normal) in self.mesh.faces.iter().zip(&area) {
            let Some(normal) = normal else { continue };
            for corner in face.polygon() {
                sums[corner] += normal.cast::<f64>();
            }
        }

        self.mesh.normals = sums
            .iter()
            .map(|sum| {
                sum.try_normalize(1e-20)
                    .map(|n| n.cast::<f32>())
                    .unwrap_or_else(Vector3::z)
            })
            .collect();
        self.mesh.face_normals = unit_face_normals(&area);
        self.mesh.touch();
        debug!(vertices = vertex_count, faces = area.len(), "computed vertex normals");
        true
    }

    /// Scale every normal to unit length; zero vectors are left alone.
    pub fn unitize_normals(&mut self) -> bool {
        if self.is_empty() {
            return true;
        }
        unitize(&mut self.mesh.normals);
        self.mesh.touch();
        true
    }

    /// Negate every normal.
    pub fn flip(&mut self) {
        if self.is_empty() {
            return;
        }
        self.mesh.flip(true, false, false);
    }
}

/// Access to the per-face normals of a mesh.
pub struct FaceNormalList<M> {
    mesh: M,
}

impl<M: Deref<Target = IndexedMesh>> FaceNormalList<M> {
    pub(crate) fn new(mesh: M) -> Self {
        Self { mesh }
    }

    pub fn count(&self) -> usize {
        self.mesh.face_normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.face_normals.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Vector3<f32>> {
        self.mesh
            .face_normals
            .get(index)
            .copied()
            .ok_or_else(|| MeshError::out_of_range(index, self.count()))
    }

    pub fn as_slice(&self) -> &[Vector3<f32>] {
        &self.mesh.face_normals
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Vector3<f32>> + '_ {
        self.mesh.face_normals.iter().copied()
    }
}

impl<M: DerefMut<Target = IndexedMesh>> FaceNormalList<M> {
    pub fn set_count(&mut self, count: usize) {
        if count == self.count() {
            return;
        }
        self.mesh.face_normals.resize(count, Vector3::zeros());
        self.mesh.touch();
    }

    pub fn set(&mut self, index: usize, normal: Vector3<f32>) -> Result<()> {
        let count = self.count();
        let slot = self
            .mesh
            .face_normals
            .get_mut(index)
            .ok_or_else(|| MeshError::out_of_range(index, count))?;
        *slot = normal;
        self.mesh.touch();
        Ok(())
    }

    /// Modify face normal `index`, or append when `index` equals the count.
    pub fn set_face_normal(&mut self, index: usize, normal: Vector3<f32>) -> bool {
        if index == self.count() {
            self.add(normal);
            return true;
        }
        self.set(index, normal).is_ok()
    }

    pub fn add(&mut self, normal: Vector3<f32>) -> usize {
        let index = self.count();
        self.mesh.face_normals.push(normal);
        self.mesh.touch();
        index
    }

    pub fn add_range(&mut self, normals: &[Vector3<f32>]) -> bool {
        if normals.is_empty() {
            return false;
        }
        self.mesh.face_normals.extend_from_slice(normals);
        self.mesh.touch();
        true
    }

    pub fn set_face_normals(&mut self, normals: &[Vector3<f32>]) -> bool {
        if normals.is_empty() {
            return false;
        }
        self.mesh.face_normals = normals.to_vec();
        self.mesh.touch();
        true
    }

    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.mesh.face_normals.clear();
        self.mesh.touch();
    }

    /// Recompute unit face normals. Faces without a usable normal get the
    /// zero vector. False when the mesh has no such face at all.
    pub fn compute_face_normals(&mut self) -> bool {
        let area = area_normals(&self.mesh);
        if area.iter().all(Option::is_none) {
            return false;
        }
        self.mesh.face_normals = unit_face_normals(&area);
        self.mesh.touch();
        true
    }

    pub fn unitize_face_normals(&mut self) -> bool {
        if self.is_empty() {
            return true;
        }
        unitize(&mut self.mesh.face_normals);
        self.mesh.touch();
        true
    }

    pub fn flip(&mut self) {
        if self.is_empty() {
            return;
        }
        self.mesh.flip(false, true, false);
    }
}
