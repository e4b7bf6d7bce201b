// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topological connectivity derived from an indexed mesh
//! Coalesces coincident vertices and tracks which faces share each edge

use super::{IndexedMesh, MeshFace};
use crate::error::{MeshError, Result};
use ahash::AHashMap;
use nalgebra::Point3;
use std::ops::{Deref, DerefMut};

/// One face's use of a topology edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeUse {
    pub face: usize,
    /// True when the face walks the edge from `vertices.0` to `vertices.1`
    pub forward: bool,
}

/// Edge between two topology vertices, `vertices.0 < vertices.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEdge {
    pub vertices: (usize, usize),
    pub uses: Vec<EdgeUse>,
}

impl TopologyEdge {
    /// Edge used by exactly one face.
    pub fn is_naked(&self) -> bool {
        self.uses.len() == 1
    }

    pub fn face_count(&self) -> usize {
        self.uses.len()
    }
}

/// Connectivity over topology vertices.
///
/// Topology vertices are numbered in order of first occurrence among the
/// mesh vertices. Only faces valid for the vertex count contribute edges.
#[derive(Debug, Clone, Default)]
pub struct MeshTopology {
    vertex_map: Vec<usize>,
    groups: Vec<Vec<usize>>,
    edges: Vec<TopologyEdge>,
    edge_lookup: AHashMap<(usize, usize), usize>,
    vertex_edges: Vec<Vec<usize>>,
    vertex_faces: Vec<Vec<usize>>,
    face_edges: Vec<Vec<usize>>,
}

/// Bit pattern of a coordinate with `-0.0` folded onto `0.0`.
fn canonical_bits(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

pub(crate) fn position_key(point: &Point3<f32>) -> [u32; 3] {
    [
        canonical_bits(point.x),
        canonical_bits(point.y),
        canonical_bits(point.z),
    ]
}

impl MeshTopology {
    /// Coalesce vertices with bit-identical positions, then connect faces.
    pub fn build(vertices: &[Point3<f32>], faces: &[MeshFace]) -> Self {
        let mut lookup: AHashMap<[u32; 3], usize> = AHashMap::with_capacity(vertices.len());
        let mut vertex_map = Vec::with_capacity(vertices.len());
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for (index, point) in vertices.iter().enumerate() {
            let next = groups.len();
            let topology_index = *lookup.entry(position_key(point)).or_insert(next);
            if topology_index == next {
                groups.push(Vec::new());
            }
            groups[topology_index].push(index);
            vertex_map.push(topology_index);
        }

        Self::connect(vertex_map, groups, faces)
    }

    /// Connectivity by vertex index alone: every mesh vertex is its own
    /// topology vertex, so unwelded seams stay open.
    pub fn by_index(vertex_count: usize, faces: &[MeshFace]) -> Self {
        let vertex_map = (0..vertex_count).collect();
        let groups = (0..vertex_count).map(|i| vec![i]).collect();
        Self::connect(vertex_map, groups, faces)
    }

    fn connect(vertex_map: Vec<usize>, groups: Vec<Vec<usize>>, faces: &[MeshFace]) -> Self {
        let vertex_count = vertex_map.len();
        let mut edge_lookup: AHashMap<(usize, usize), usize> = AHashMap::new();
        let mut edges: Vec<TopologyEdge> = Vec::new();
        let mut vertex_edges = vec![Vec::new(); groups.len()];
        let mut vertex_faces = vec![Vec::new(); groups.len()];
        let mut face_edges = vec![Vec::new(); faces.len()];

        for (face_index, face) in faces.iter().enumerate() {
            if !face.is_valid_for(vertex_count) {
                continue;
            }
            for corner in face.polygon() {
                vertex_faces[vertex_map[corner]].push(face_index);
            }
            for (from, to) in face.edges() {
                let (t0, t1) = (vertex_map[from], vertex_map[to]);
                if t0 == t1 {
                    continue;
                }
                let key = (t0.min(t1), t0.max(t1));
                let edge_index = *edge_lookup.entry(key).or_insert_with(|| {
                    edges.push(TopologyEdge {
                        vertices: key,
                        uses: Vec::new(),
                    });
                    vertex_edges[key.0].push(edges.len() - 1);
                    vertex_edges[key.1].push(edges.len() - 1);
                    edges.len() - 1
                });
                edges[edge_index].uses.push(EdgeUse {
                    face: face_index,
                    forward: t0 < t1,
                });
                face_edges[face_index].push(edge_index);
            }
        }

        for list in &mut vertex_faces {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            vertex_map,
            groups,
            edges,
            edge_lookup,
            vertex_edges,
            vertex_faces,
            face_edges,
        }
    }

    pub fn topology_vertex_count(&self) -> usize {
        self.groups.len()
    }

    /// Topology vertex that owns `mesh_vertex`.
    pub fn topology_vertex_of(&self, mesh_vertex: usize) -> Option<usize> {
        self.vertex_map.get(mesh_vertex).copied()
    }

    /// Mesh vertices coalesced into topology vertex `index`, ascending.
    pub fn mesh_vertices(&self, index: usize) -> Option<&[usize]> {
        self.groups.get(index).map(Vec::as_slice)
    }

    pub fn edges(&self) -> &[TopologyEdge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edge joining two topology vertices, in either order.
    pub fn find_edge(&self, v0: usize, v1: usize) -> Option<usize> {
        self.edge_lookup.get(&(v0.min(v1), v0.max(v1))).copied()
    }

    /// Edges ending at topology vertex `index`.
    pub fn vertex_edges(&self, index: usize) -> &[usize] {
        self.vertex_edges.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edges around a face in boundary order; empty for faces invalid in context.
    pub fn face_edges(&self, face: usize) -> &[usize] {
        self.face_edges.get(face).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Faces touching topology vertex `index`, ascending.
    pub fn vertex_faces(&self, index: usize) -> &[usize] {
        self.vertex_faces.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Topology vertices sharing an edge with `index`, ascending.
    pub fn connected(&self, index: usize) -> Vec<usize> {
        let Some(edge_indices) = self.vertex_edges.get(index) else {
            return Vec::new();
        };
        let mut neighbours: Vec<usize> = edge_indices
            .iter()
            .map(|&e| {
                let (v0, v1) = self.edges[e].vertices;
                if v0 == index {
                    v1
                } else {
                    v0
                }
            })
            .collect();
        neighbours.sort_unstable();
        neighbours.dedup();
        neighbours
    }

    /// Faces sharing at least one edge with `face`, ascending.
    pub fn adjacent_faces(&self, face: usize) -> Vec<usize> {
        let mut adjacent: Vec<usize> = self
            .face_edges(face)
            .iter()
            .flat_map(|&e| self.edges[e].uses.iter().map(|u| u.face))
            .filter(|&f| f != face)
            .collect();
        adjacent.sort_unstable();
        adjacent.dedup();
        adjacent
    }
}

/// Read or write view over the topology vertices of a mesh.
///
/// Writing a topology vertex moves every mesh vertex it coalesces.
pub struct TopologyVertexList<M> {
    mesh: M,
}

impl<M: Deref<Target = IndexedMesh>> TopologyVertexList<M> {
    pub(crate) fn new(mesh: M) -> Self {
        Self { mesh }
    }

    pub fn count(&self) -> usize {
        self.mesh.topology().topology_vertex_count()
    }

    pub fn get(&self, index: usize) -> Result<Point3<f32>> {
        let first = self.group(index)?[0];
        Ok(self.mesh.vertices[first])
    }

    /// Mesh vertices represented by topology vertex `index`.
    pub fn mesh_vertex_indices(&self, index: usize) -> Result<Vec<usize>> {
        self.group(index).map(<[usize]>::to_vec)
    }

    /// Topology vertex index of a mesh vertex.
    pub fn topology_vertex_index(&self, mesh_vertex: usize) -> Result<usize> {
        self.mesh
            .topology()
            .topology_vertex_of(mesh_vertex)
            .ok_or_else(|| MeshError::out_of_range(mesh_vertex, self.mesh.vertices.len()))
    }

    pub fn connected_topology_vertices(&self, index: usize) -> Result<Vec<usize>> {
        self.group(index)?;
        Ok(self.mesh.topology().connected(index))
    }

    /// Positions of every topology vertex, count fixed at the call.
    pub fn iter(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        let topology = self.mesh.topology();
        (0..topology.topology_vertex_count()).filter_map(move |i| {
            topology
                .mesh_vertices(i)
                .and_then(|group| group.first())
                .map(|&v| self.mesh.vertices[v])
        })
    }

    fn group(&self, index: usize) -> Result<&[usize]> {
        let topology = self.mesh.topology();
        topology
            .mesh_vertices(index)
            .ok_or_else(|| MeshError::out_of_range(index, topology.topology_vertex_count()))
    }
}

impl<M: DerefMut<Target = IndexedMesh>> TopologyVertexList<M> {
    /// Move topology vertex `index`, writing through to all of its mesh vertices.
    pub fn set(&mut self, index: usize, point: Point3<f32>) -> Result<()> {
        let members = self.group(index)?.to_vec();
        for member in members {
            self.mesh.vertices[member] = point;
        }
        self.mesh.invalidate_topology();
        self.mesh.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles that share an edge by position but not by index.
    fn unwelded_square() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices_mut().add_range([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh.faces_mut().add_triangle(0, 1, 2);
        mesh.faces_mut().add_triangle(3, 4, 5);
        mesh
    }

    #[test]
    fn test_coincident_vertices_coalesce() {
        let mesh = unwelded_square();
        let topology = mesh.topology_vertices();
        assert_eq!(topology.count(), 4);
        assert_eq!(topology.mesh_vertex_indices(0).unwrap(), vec![0, 3]);
        assert_eq!(topology.mesh_vertex_indices(2).unwrap(), vec![2, 4]);
        assert_eq!(topology.topology_vertex_index(5).unwrap(), 3);
        assert!(topology.get(4).is_err());
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices_mut().add(Point3::new(0.0, 0.0, 0.0));
        mesh.vertices_mut().add(Point3::new(-0.0, 0.0, -0.0));
        assert_eq!(mesh.topology_vertices().count(), 1);
    }

    #[test]
    fn test_shared_edge_is_interior() {
        let mesh = unwelded_square();
        let topology = mesh.topology();
        assert_eq!(topology.edge_count(), 5);
        let interior: Vec<_> = topology.edges().iter().filter(|e| !e.is_naked()).collect();
        assert_eq!(interior.len(), 1);
        assert_eq!(interior[0].vertices, (0, 2));
        assert_eq!(topology.adjacent_faces(0), vec![1]);
    }

    #[test]
    fn test_set_writes_through() {
        let mut mesh = unwelded_square();
        let serial = mesh.modification_serial();
        mesh.topology_vertices_mut()
            .set(0, Point3::new(-1.0, -1.0, 0.0))
            .unwrap();
        assert!(mesh.modification_serial() > serial);
        assert_eq!(mesh.vertices().get(0).unwrap(), Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(mesh.vertices().get(3).unwrap(), Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(mesh.topology_vertices().count(), 4);
    }

    #[test]
    fn test_connected_topology_vertices() {
        let mesh = unwelded_square();
        let topology = mesh.topology_vertices();
        assert_eq!(topology.connected_topology_vertices(0).unwrap(), vec![1, 2, 3]);
        assert_eq!(topology.connected_topology_vertices(1).unwrap(), vec![0, 2]);
        assert_eq!(topology.iter().count(), 4);
    }
}
