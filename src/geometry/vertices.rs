// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex list view

use super::topology::position_key;
use super::IndexedMesh;
use crate::error::{MeshError, Result};
use ahash::AHashMap;
use nalgebra::Point3;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Access to the vertex positions and hidden flags of a mesh.
pub struct VertexList<M> {
    mesh: M,
}

impl<M: Deref<Target = IndexedMesh>> VertexList<M> {
    pub(crate) fn new(mesh: M) -> Self {
        Self { mesh }
    }

    pub fn count(&self) -> usize {
        self.mesh.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.vertices.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Point3<f32>> {
        self.mesh
            .vertices
            .get(index)
            .copied()
            .ok_or_else(|| MeshError::out_of_range(index, self.count()))
    }

    pub fn as_slice(&self) -> &[Point3<f32>] {
        &self.mesh.vertices
    }

    /// False for visible vertices, out-of-range indices and meshes without
    /// hidden flags.
    pub fn is_hidden(&self, index: usize) -> bool {
        self.mesh
            .hidden
            .as_ref()
            .and_then(|hidden| hidden.get(index).copied())
            .unwrap_or(false)
    }

    pub fn hidden_count(&self) -> usize {
        self.mesh
            .hidden
            .as_ref()
            .map(|hidden| hidden.iter().filter(|&&h| h).count())
            .unwrap_or(0)
    }

    /// Faces with a corner at mesh vertex `index`.
    pub fn faces_using_vertex(&self, index: usize) -> Option<Vec<usize>> {
        if index >= self.count() {
            return None;
        }
        let corner = index as i32;
        let faces: Vec<usize> = self
            .mesh
            .faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.corners().contains(&corner))
            .map(|(i, _)| i)
            .collect();
        (!faces.is_empty()).then_some(faces)
    }

    /// Every mesh vertex at the same topological position as `index`,
    /// including `index` itself.
    pub fn topologically_identical_vertices(&self, index: usize) -> Option<Vec<usize>> {
        let topology = self.mesh.topology();
        let group = topology.mesh_vertices(topology.topology_vertex_of(index)?)?;
        Some(group.to_vec())
    }

    /// Mesh vertices sharing an edge with `index`.
    ///
    /// Neighbours are found through the topology, so unwelded seams are
    /// crossed; each neighbouring position is reported once, by its lowest
    /// mesh vertex index.
    pub fn connected_vertices(&self, index: usize) -> Option<Vec<usize>> {
        let topology = self.mesh.topology();
        let tv = topology.topology_vertex_of(index)?;
        let connected: Vec<usize> = topology
            .connected(tv)
            .into_iter()
            .filter_map(|neighbour| topology.mesh_vertices(neighbour)?.first().copied())
            .collect();
        (!connected.is_empty()).then_some(connected)
    }

    /// Enumerate positions. The count is fixed when the iterator is created.
    pub fn iter(&self) -> VertexIter<'_> {
        VertexIter {
            vertices: &self.mesh.vertices,
            position: 0,
            count: self.mesh.vertices.len(),
        }
    }

    pub fn to_point3f_array(&self) -> Vec<Point3<f32>> {
        self.mesh.vertices.clone()
    }

    pub fn to_point3d_array(&self) -> Vec<Point3<f64>> {
        self.mesh.vertices.iter().map(|p| p.cast::<f64>()).collect()
    }
}

impl<M: DerefMut<Target = IndexedMesh>> VertexList<M> {
    /// Grow (padding with the origin) or shrink the vertex array.
    pub fn set_count(&mut self, count: usize) {
        if count == self.count() {
            return;
        }
        self.mesh.vertices.resize(count, Point3::origin());
        self.changed();
    }

    pub fn set(&mut self, index: usize, point: Point3<f32>) -> Result<()> {
        let count = self.count();
        let slot = self
            .mesh
            .vertices
            .get_mut(index)
            .ok_or_else(|| MeshError::out_of_range(index, count))?;
        *slot = point;
        self.mesh.invalidate_topology();
        self.mesh.touch();
        Ok(())
    }

    /// Modify vertex `index`, or append when `index` equals the count.
    /// Returns false for anything further out.
    pub fn set_vertex(&mut self, index: usize, point: Point3<f32>) -> bool {
        match index.cmp(&self.count()) {
            std::cmp::Ordering::Less => self.set(index, point).is_ok(),
            std::cmp::Ordering::Equal => {
                self.add(point);
                true
            }
            std::cmp::Ordering::Greater => false,
        }
    }

    /// Append a vertex and return its index
    pub fn add(&mut self, point: Point3<f32>) -> usize {
        let index = self.count();
        self.mesh.vertices.push(point);
        self.changed();
        index
    }

    /// Append many vertices; the hidden flags are repaired once at the end.
    pub fn add_range<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let before = self.count();
        self.mesh.vertices.extend(points);
        if self.count() != before {
            self.changed();
        }
    }

    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.mesh.vertices.clear();
        self.changed();
    }

    /// Hide vertex `index`. Nothing is allocated or modified when the
    /// vertex is already hidden.
    pub fn hide(&mut self, index: usize) -> Result<()> {
        self.set_hidden(index, true)
    }

    /// Show vertex `index`. Nothing is allocated or modified when the
    /// vertex is already visible.
    pub fn show(&mut self, index: usize) -> Result<()> {
        self.set_hidden(index, false)
    }

    pub fn hide_all(&mut self) {
        if !self.is_empty() && self.hidden_count() == self.count() {
            return;
        }
        self.mesh.ensure_hidden().fill(true);
        self.mesh.touch();
    }

    /// Show every vertex. Never allocates the hidden flags.
    pub fn show_all(&mut self) {
        if self.hidden_count() == 0 {
            return;
        }
        if let Some(hidden) = &mut self.mesh.hidden {
            hidden.fill(false);
        }
        self.mesh.touch();
    }

    /// Remove vertices no face refers to and reindex faces. Returns the
    /// number removed.
    pub fn cull_unused(&mut self) -> usize {
        let count = self.count();
        let mut used = vec![false; count];
        for face in &self.mesh.faces {
            for corner in face.corners() {
                if let Some(flag) = usize::try_from(corner).ok().and_then(|c| used.get_mut(c)) {
                    *flag = true;
                }
            }
        }

        let survivors: Vec<usize> = (0..count).filter(|&i| used[i]).collect();
        let removed = count - survivors.len();
        if removed == 0 {
            return 0;
        }

        let mut remap = vec![0; count];
        for (new_index, &old_index) in survivors.iter().enumerate() {
            remap[old_index] = new_index;
        }
        self.mesh.reindex_vertices(&survivors, &remap);
        debug!(removed, remaining = survivors.len(), "culled unused vertices");
        removed
    }

    /// Merge vertices with identical positions.
    ///
    /// Unless ignored, vertex normals and the additional attributes (colors
    /// and texture coordinates) must match as well. Returns true when any
    /// vertices were merged.
    pub fn combine_identical(&mut self, ignore_normals: bool, ignore_additional: bool) -> bool {
        let count = self.count();
        let mesh: &IndexedMesh = &self.mesh;
        let use_normals = !ignore_normals && mesh.normals.len() == count;
        let use_colors = !ignore_additional && mesh.colors.len() == count;
        let use_texture = !ignore_additional && mesh.texture_coordinates.len() == count;

        let mut lookup: AHashMap<Vec<u32>, usize> = AHashMap::with_capacity(count);
        let mut survivors = Vec::with_capacity(count);
        let mut remap = vec![0; count];

        for i in 0..count {
            let mut key = position_key(&mesh.vertices[i]).to_vec();
            if use_normals {
                key.extend(mesh.normals[i].iter().map(|v| v.to_bits()));
            }
            if use_colors {
                key.push(mesh.colors[i].to_argb());
            }
            if use_texture {
                key.extend(mesh.texture_coordinates[i].iter().map(|v| v.to_bits()));
            }

            let next = survivors.len();
            let target = *lookup.entry(key).or_insert(next);
            if target == next {
                survivors.push(i);
            }
            remap[i] = target;
        }

        let merged = count - survivors.len();
        if merged == 0 {
            return false;
        }
        self.mesh.reindex_vertices(&survivors, &remap);
        debug!(merged, remaining = survivors.len(), "combined identical vertices");
        true
    }

    fn set_hidden(&mut self, index: usize, hidden: bool) -> Result<()> {
        let count = self.count();
        if index >= count {
            return Err(MeshError::out_of_range(index, count));
        }
        if self.is_hidden(index) == hidden {
            return Ok(());
        }
        self.mesh.ensure_hidden()[index] = hidden;
        self.mesh.touch();
        Ok(())
    }

    /// Bookkeeping after the vertex count changed.
    fn changed(&mut self) {
        self.mesh.repair_hidden();
        self.mesh.invalidate_topology();
        self.mesh.touch();
    }
}

/// Iterator over vertex positions with a count snapshot.
#[derive(Debug, Clone)]
pub struct VertexIter<'a> {
    vertices: &'a [Point3<f32>],
    position: usize,
    count: usize,
}

impl Iterator for VertexIter<'_> {
    type Item = Point3<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.count {
            return None;
        }
        let point = self.vertices.get(self.position).copied();
        self.position += 1;
        point
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for VertexIter<'_> {}
