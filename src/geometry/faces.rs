// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face list view

use super::{IndexedMesh, MeshFace};
use crate::error::{MeshError, Result};
use crate::utils::math;
use ahash::AHashMap;
use nalgebra::Point3;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Merge candidate for two triangles sharing an edge.
#[derive(Debug, Clone, Copy)]
struct QuadCandidate {
    ratio: f64,
    keep: usize,
    remove: usize,
    quad: MeshFace,
}

/// Corner of triangle `face` opposite the directed edge `from -> to`.
fn opposite_corner(face: &MeshFace, from: usize, to: usize) -> Option<usize> {
    let corners = [face.a as usize, face.b as usize, face.c as usize];
    (0..3)
        .find(|&k| corners[k] == from && corners[(k + 1) % 3] == to)
        .map(|k| corners[(k + 2) % 3])
}

/// Split a quad along its shorter diagonal.
pub(crate) fn split_quad(vertices: &[Point3<f32>], face: &MeshFace) -> (MeshFace, MeshFace) {
    let along_ac = MeshFace::triangle(face.a, face.b, face.c);
    let along_ac_rest = MeshFace::triangle(face.a, face.c, face.d);
    if !face.is_valid_for(vertices.len()) {
        return (along_ac, along_ac_rest);
    }

    let p = |corner: i32| vertices[corner as usize];
    let ac = (p(face.c) - p(face.a)).norm_squared();
    let bd = (p(face.d) - p(face.b)).norm_squared();
    if ac <= bd {
        (along_ac, along_ac_rest)
    } else {
        (
            MeshFace::triangle(face.b, face.c, face.d),
            MeshFace::triangle(face.b, face.d, face.a),
        )
    }
}

/// Access to the faces of a mesh.
pub struct FaceList<M> {
    mesh: M,
}

impl<M: Deref<Target = IndexedMesh>> FaceList<M> {
    pub(crate) fn new(mesh: M) -> Self {
        Self { mesh }
    }

    pub fn count(&self) -> usize {
        self.mesh.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.faces.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.mesh.faces.iter().filter(|f| f.is_quad()).count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.faces.iter().filter(|f| f.is_triangle()).count()
    }

    /// Face at `index`, or [`MeshFace::UNSET`] when there is none.
    pub fn get_face(&self, index: usize) -> MeshFace {
        self.mesh.faces.get(index).copied().unwrap_or(MeshFace::UNSET)
    }

    /// Corner positions of face `index`; triangles repeat the third corner.
    pub fn get_face_vertices(&self, index: usize) -> Option<[Point3<f32>; 4]> {
        let face = self.mesh.faces.get(index)?;
        if !face.is_valid_for(self.mesh.vertices.len()) {
            return None;
        }
        Some(face.corners().map(|corner| self.mesh.vertices[corner as usize]))
    }

    /// Average of the distinct corners of face `index`.
    pub fn get_face_center(&self, index: usize) -> Result<Point3<f64>> {
        let face = self
            .mesh
            .faces
            .get(index)
            .ok_or_else(|| MeshError::out_of_range(index, self.count()))?;
        let vertex_count = self.mesh.vertices.len();
        if !face.is_valid_for(vertex_count) {
            return Err(MeshError::invalid(format!(
                "face {index} ({face}) is not valid for {vertex_count} vertices"
            )));
        }

        let polygon = face.polygon();
        let sum = polygon
            .iter()
            .fold(Point3::<f64>::origin().coords, |acc, &corner| {
                acc + math::to_f64(&self.mesh.vertices[corner]).coords
            });
        Ok(Point3::from(sum / polygon.len() as f64))
    }

    /// Faces sharing an edge with face `index`, through the topology.
    pub fn adjacent_faces(&self, index: usize) -> Option<Vec<usize>> {
        if index >= self.count() {
            return None;
        }
        let adjacent = self.mesh.topology().adjacent_faces(index);
        (!adjacent.is_empty()).then_some(adjacent)
    }

    pub fn as_slice(&self) -> &[MeshFace] {
        &self.mesh.faces
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = MeshFace> + '_ {
        self.mesh.faces.iter().copied()
    }
}

impl<M: DerefMut<Target = IndexedMesh>> FaceList<M> {
    /// Truncate, or pad with [`MeshFace::UNSET`].
    pub fn set_count(&mut self, count: usize) {
        if count == self.count() {
            return;
        }
        self.mesh.faces.resize(count, MeshFace::UNSET);
        self.changed();
    }

    /// Append a face and return its index. Faces are stored as given, valid
    /// or not.
    pub fn add_face(&mut self, face: impl Into<MeshFace>) -> usize {
        let index = self.count();
        self.mesh.faces.push(face.into());
        self.changed();
        index
    }

    pub fn add_triangle(&mut self, a: i32, b: i32, c: i32) -> usize {
        self.add_face(MeshFace::triangle(a, b, c))
    }

    pub fn add_quad(&mut self, a: i32, b: i32, c: i32, d: i32) -> usize {
        self.add_face(MeshFace::quad(a, b, c, d))
    }

    pub fn add_faces<I>(&mut self, faces: I)
    where
        I: IntoIterator<Item = MeshFace>,
    {
        let before = self.count();
        self.mesh.faces.extend(faces);
        if self.count() != before {
            self.changed();
        }
    }

    /// Overwrite face `index`. False when `index` is past the end; the list
    /// never grows here.
    pub fn set_face(&mut self, index: usize, face: MeshFace) -> bool {
        let Some(slot) = self.mesh.faces.get_mut(index) else {
            return false;
        };
        *slot = face;
        self.changed();
        true
    }

    pub fn set_triangle(&mut self, index: usize, a: i32, b: i32, c: i32) -> bool {
        self.set_face(index, MeshFace::triangle(a, b, c))
    }

    pub fn set_quad(&mut self, index: usize, a: i32, b: i32, c: i32, d: i32) -> bool {
        self.set_face(index, MeshFace::quad(a, b, c, d))
    }

    /// Remove the listed faces. Out-of-range and repeated indices are
    /// skipped. Returns the number of faces removed.
    pub fn delete_faces(&mut self, indices: &[usize]) -> usize {
        let mut keep = vec![true; self.count()];
        for &index in indices {
            if let Some(flag) = keep.get_mut(index) {
                *flag = false;
            }
        }
        self.mesh.retain_faces(&keep)
    }

    /// Remove faces that are not valid for the current vertex count.
    pub fn cull_degenerate_faces(&mut self) -> usize {
        let vertex_count = self.mesh.vertices.len();
        let keep: Vec<bool> = self
            .mesh
            .faces
            .iter()
            .map(|face| face.is_valid_for(vertex_count))
            .collect();
        let removed = self.mesh.retain_faces(&keep);
        if removed > 0 {
            debug!(removed, "culled degenerate faces");
        }
        removed
    }

    /// Split every quad along its shorter diagonal. The two triangles take
    /// the quad's place in order. Returns false when there were no quads.
    pub fn convert_quads_to_triangles(&mut self) -> bool {
        let quads = self.quad_count();
        if quads == 0 {
            return false;
        }

        let mesh: &IndexedMesh = &self.mesh;
        let face_normals_complete = mesh.face_normals.len() == mesh.faces.len();
        let mut faces = Vec::with_capacity(mesh.faces.len() + quads);
        let mut face_normals = Vec::new();

        for (index, face) in mesh.faces.iter().enumerate() {
            if face.is_triangle() {
                faces.push(*face);
                if face_normals_complete {
                    face_normals.push(mesh.face_normals[index]);
                }
                continue;
            }
            let (first, second) = split_quad(&mesh.vertices, face);
            faces.extend([first, second]);
            if face_normals_complete {
                face_normals.extend([mesh.face_normals[index]; 2]);
            }
        }

        self.mesh.faces = faces;
        if face_normals_complete {
            self.mesh.face_normals = face_normals;
        }
        self.changed();
        debug!(quads, "converted quads to triangles");
        true
    }

    /// Merge pairs of triangles sharing an edge into quads.
    ///
    /// A pair qualifies when both triangles use the shared edge by vertex
    /// index in opposite directions, the angle between their normals is at
    /// most `angle_tolerance` radians, and the shorter quad diagonal divided
    /// by the longer is at least `min_diagonal_ratio`. The best shaped pairs
    /// are merged first; a triangle joins at most one quad. Returns true
    /// when any pair was merged.
    pub fn convert_triangles_to_quads(&mut self, angle_tolerance: f64, min_diagonal_ratio: f64) -> bool {
        let mesh: &IndexedMesh = &self.mesh;
        let vertex_count = mesh.vertices.len();

        let mut edge_uses: AHashMap<(usize, usize), Vec<(usize, bool)>> = AHashMap::new();
        for (index, face) in mesh.faces.iter().enumerate() {
            if !face.is_triangle() || !face.is_valid_for(vertex_count) {
                continue;
            }
            for (from, to) in face.edges() {
                edge_uses
                    .entry((from.min(to), from.max(to)))
                    .or_default()
                    .push((index, from < to));
            }
        }

        let unit_normal =
            |face: usize| mesh.face_area_normal(&mesh.faces[face]).and_then(|n| math::unit(&n));
        let mut candidates = Vec::new();
        for (&(lo, hi), uses) in &edge_uses {
            let [(f0, forward0), (f1, forward1)] = uses.as_slice() else {
                continue;
            };
            if forward0 == forward1 {
                continue;
            }
            let (keep, remove) = if *forward0 { (*f0, *f1) } else { (*f1, *f0) };
            let (Some(o1), Some(o2)) = (
                opposite_corner(&mesh.faces[keep], lo, hi),
                opposite_corner(&mesh.faces[remove], hi, lo),
            ) else {
                continue;
            };
            if o1 == o2 {
                continue;
            }

            let (Some(n1), Some(n2)) = (unit_normal(keep), unit_normal(remove)) else {
                continue;
            };
            let angle = (n1.dot(&n2) as f64).clamp(-1.0, 1.0).acos();
            if angle > angle_tolerance {
                continue;
            }

            let p = |i: usize| math::to_f64(&mesh.vertices[i]);
            let d0 = (p(hi) - p(lo)).norm();
            let d1 = (p(o2) - p(o1)).norm();
            let longer = d0.max(d1);
            if longer <= 0.0 {
                continue;
            }
            let ratio = d0.min(d1) / longer;
            if ratio < min_diagonal_ratio {
                continue;
            }

            candidates.push(QuadCandidate {
                ratio,
                keep,
                remove,
                quad: MeshFace::quad(lo as i32, o2 as i32, hi as i32, o1 as i32),
            });
        }

        candidates.sort_by(|x, y| {
            y.ratio
                .total_cmp(&x.ratio)
                .then(x.keep.cmp(&y.keep))
                .then(x.remove.cmp(&y.remove))
        });

        let mut used = vec![false; mesh.faces.len()];
        let mut keep_flags = vec![true; mesh.faces.len()];
        let mut merged = Vec::new();
        for candidate in candidates {
            if used[candidate.keep] || used[candidate.remove] {
                continue;
            }
            used[candidate.keep] = true;
            used[candidate.remove] = true;
            keep_flags[candidate.remove] = false;
            merged.push((candidate.keep, candidate.quad));
        }

        if merged.is_empty() {
            return false;
        }
        for (index, quad) in &merged {
            self.mesh.faces[*index] = *quad;
        }
        self.mesh.retain_faces(&keep_flags);
        debug!(quads = merged.len(), "converted triangles to quads");
        true
    }

    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.mesh.faces.clear();
        self.changed();
    }

    fn changed(&mut self) {
        self.mesh.invalidate_topology();
        self.mesh.touch();
    }
}
