// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Whole-mesh analysis: connected pieces, closure, manifold checks,
//! naked edges, orientation repair and closest point queries

use super::bvh::BVH;
use super::topology::MeshTopology;
use super::{BoundingBox, IndexedMesh, Polyline};
use crate::utils::math;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Disjoint-set forest over face indices.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            Ordering::Less => self.parent[root_a] = root_b,
            Ordering::Greater => self.parent[root_b] = root_a,
            Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }

    /// Group `members` by root, groups ordered by their lowest member.
    fn groups(&mut self, members: impl IntoIterator<Item = usize>) -> Vec<Vec<usize>> {
        let mut slot_of_root: Vec<Option<usize>> = vec![None; self.parent.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for member in members {
            let root = self.find(member);
            let slot = *slot_of_root[root].get_or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(member);
        }
        groups
    }
}

/// Result of [`IndexedMesh::is_manifold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManifoldReport {
    /// Every edge has one or two faces and every vertex has a single fan of faces
    pub is_manifold: bool,
    /// Every interior edge is walked in opposite directions by its two faces
    pub is_oriented: bool,
    /// At least one edge is used by a single face
    pub has_boundary: bool,
}

/// A location on a mesh face.
///
/// `parameters` are barycentric weights of the face corners `a, b, c, d`;
/// for triangles the fourth weight is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPoint {
    /// Face the point lies on, `-1` when no point was found
    pub face_index: i32,
    pub point: Point3<f64>,
    pub parameters: [f64; 4],
    /// Unit normal of the face, zero for faces without area
    pub normal: Vector3<f64>,
}

impl MeshPoint {
    pub const UNSET: MeshPoint = MeshPoint {
        face_index: -1,
        point: Point3::new(f64::NAN, f64::NAN, f64::NAN),
        parameters: [0.0; 4],
        normal: Vector3::new(0.0, 0.0, 0.0),
    };

    pub fn is_valid(&self) -> bool {
        self.face_index >= 0
    }

    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        (self.point - point).norm()
    }
}

impl Default for MeshPoint {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Barycentric weights of `p` with respect to triangle `(a, b, c)`.
fn barycentric(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> [f64; 3] {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() <= f64::EPSILON * d00.max(d11).max(1.0) {
        return [1.0, 0.0, 0.0];
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    [1.0 - v - w, v, w]
}

/// Face bounding boxes and a BVH over the faces valid for a mesh.
struct ProximityIndex<'a> {
    mesh: &'a IndexedMesh,
    bvh: BVH,
}

impl<'a> ProximityIndex<'a> {
    fn build(mesh: &'a IndexedMesh) -> Option<Self> {
        let vertex_count = mesh.vertices.len();
        let boxes: Vec<(usize, BoundingBox)> = mesh
            .faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.is_valid_for(vertex_count))
            .map(|(i, face)| {
                let corners = face.polygon();
                (i, BoundingBox::from_points(corners.iter().map(|&v| &mesh.vertices[v])))
            })
            .collect();
        if boxes.is_empty() {
            return None;
        }
        Some(Self {
            mesh,
            bvh: BVH::build(boxes),
        })
    }

    /// Squared distance to a face together with its closest location.
    fn face_distance(&self, face_index: usize, point: &Point3<f64>) -> Option<(f64, Point3<f64>)> {
        let face = self.mesh.faces.get(face_index)?;
        let corner = |c: i32| math::to_f64(&self.mesh.vertices[c as usize]);
        let (a, b, c, d) = (corner(face.a), corner(face.b), corner(face.c), corner(face.d));

        let mut best = math::closest_point_on_triangle(point, &a, &b, &c);
        if face.is_quad() {
            let other = math::closest_point_on_triangle(point, &a, &c, &d);
            if (other - point).norm_squared() < (best - point).norm_squared() {
                best = other;
            }
        }
        let d2 = (best - point).norm_squared();
        d2.is_finite().then_some((d2, best))
    }

    fn closest(&self, point: &Point3<f64>, max_distance: f64) -> MeshPoint {
        let bound = if max_distance > 0.0 {
            max_distance * max_distance
        } else {
            f64::INFINITY
        };
        let Some((face_index, _, location)) =
            self.bvh.nearest(point, bound, |f| self.face_distance(f, point))
        else {
            return MeshPoint::UNSET;
        };

        let face = self.mesh.faces[face_index];
        let corner = |c: i32| math::to_f64(&self.mesh.vertices[c as usize]);
        let (a, b, c, d) = (corner(face.a), corner(face.b), corner(face.c), corner(face.d));
        let parameters = if face.is_triangle() {
            let [u, v, w] = barycentric(&location, &a, &b, &c);
            [u, v, w, 0.0]
        } else {
            let first = math::closest_point_on_triangle(&location, &a, &b, &c);
            let second = math::closest_point_on_triangle(&location, &a, &c, &d);
            if (first - location).norm_squared() <= (second - location).norm_squared() {
                let [u, v, w] = barycentric(&location, &a, &b, &c);
                [u, v, w, 0.0]
            } else {
                let [u, v, w] = barycentric(&location, &a, &c, &d);
                [u, 0.0, v, w]
            }
        };
        let normal = self
            .mesh
            .face_area_normal(&face)
            .and_then(|n| math::unit(&n))
            .map(|n| n.cast::<f64>())
            .unwrap_or_else(Vector3::zeros);

        MeshPoint {
            face_index: face_index as i32,
            point: location,
            parameters,
            normal,
        }
    }
}

impl IndexedMesh {
    /// Faces grouped into pieces connected through edges of `topology`.
    /// Faces invalid for this mesh belong to no piece.
    fn connected_pieces(&self, topology: &MeshTopology) -> Vec<Vec<usize>> {
        let mut sets = UnionFind::new(self.faces.len());
        for edge in topology.edges() {
            for pair in edge.uses.windows(2) {
                sets.union(pair[0].face, pair[1].face);
            }
        }
        let vertex_count = self.vertices.len();
        let valid = (0..self.faces.len()).filter(|&f| self.faces[f].is_valid_for(vertex_count));
        sets.groups(valid)
    }

    /// Number of pieces that share no topology edge.
    pub fn disjoint_mesh_count(&self) -> usize {
        self.connected_pieces(self.topology()).len()
    }

    /// One mesh per disjoint piece. Empty for a mesh without valid faces.
    pub fn split_disjoint_pieces(&self) -> Vec<IndexedMesh> {
        let pieces = self.connected_pieces(self.topology());
        debug!(pieces = pieces.len(), "split disjoint pieces");
        pieces.iter().map(|faces| self.sub_mesh(faces)).collect()
    }

    /// One mesh per region bounded by unwelded edges, where faces only stay
    /// together when they share vertex indices along an edge.
    pub fn explode_at_unwelded_edges(&self) -> Vec<IndexedMesh> {
        let topology = MeshTopology::by_index(self.vertices.len(), &self.faces);
        let pieces = self.connected_pieces(&topology);
        debug!(pieces = pieces.len(), "exploded at unwelded edges");
        pieces.iter().map(|faces| self.sub_mesh(faces)).collect()
    }

    /// Copy of the listed faces and the vertices they use, vertices in
    /// ascending order of their original index.
    pub(crate) fn sub_mesh(&self, faces: &[usize]) -> IndexedMesh {
        let vertex_count = self.vertices.len();
        let mut used = vec![false; vertex_count];
        for &f in faces {
            for corner in self.faces[f].polygon() {
                used[corner] = true;
            }
        }
        let survivors: Vec<usize> = (0..vertex_count).filter(|&v| used[v]).collect();
        let mut remap = vec![usize::MAX; vertex_count];
        for (new_index, &old_index) in survivors.iter().enumerate() {
            remap[old_index] = new_index;
        }

        fn pick<T: Copy>(values: &[T], count: usize, indices: &[usize]) -> Vec<T> {
            if values.len() == count {
                indices.iter().map(|&i| values[i]).collect()
            } else {
                Vec::new()
            }
        }

        let mut piece = IndexedMesh::with_capacity(survivors.len(), faces.len());
        piece.vertices = pick(&self.vertices, vertex_count, &survivors);
        piece.normals = pick(&self.normals, vertex_count, &survivors);
        piece.colors = pick(&self.colors, vertex_count, &survivors);
        piece.texture_coordinates = pick(&self.texture_coordinates, vertex_count, &survivors);
        piece.face_normals = pick(&self.face_normals, self.faces.len(), faces);
        piece.faces = faces.iter().map(|&f| self.faces[f].remapped(&remap)).collect();
        piece.texture_domain = self.texture_domain;
        piece.hidden = self
            .hidden
            .as_ref()
            .map(|hidden| survivors.iter().map(|&v| hidden.get(v).copied().unwrap_or(false)).collect());
        piece
    }

    /// True when the mesh has faces and every edge is shared by at least
    /// two of them.
    pub fn is_closed(&self) -> bool {
        let topology = self.topology();
        topology.edge_count() > 0 && topology.edges().iter().all(|e| e.face_count() >= 2)
    }

    /// Manifold, orientation and boundary checks.
    ///
    /// With `topological` set, coincident vertices count as one; otherwise
    /// only shared vertex indices connect faces.
    pub fn is_manifold(&self, topological: bool) -> ManifoldReport {
        let by_index;
        let topology = if topological {
            self.topology()
        } else {
            by_index = MeshTopology::by_index(self.vertices.len(), &self.faces);
            &by_index
        };
        if topology.edge_count() == 0 {
            return ManifoldReport::default();
        }

        let edges = topology.edges();
        let mut is_manifold = edges.iter().all(|e| e.face_count() <= 2);
        let has_boundary = edges.iter().any(|e| e.is_naked());
        let is_oriented = edges
            .iter()
            .filter(|e| e.face_count() == 2)
            .all(|e| e.uses[0].forward != e.uses[1].forward);

        if is_manifold {
            // Faces around each vertex must form a single fan
            is_manifold = (0..topology.topology_vertex_count()).all(|vertex| {
                let fan = topology.vertex_faces(vertex);
                if fan.len() < 2 {
                    return true;
                }
                let mut sets = UnionFind::new(fan.len());
                for &e in topology.vertex_edges(vertex) {
                    let uses = &edges[e].uses;
                    if uses.len() == 2 {
                        if let (Ok(i), Ok(j)) =
                            (fan.binary_search(&uses[0].face), fan.binary_search(&uses[1].face))
                        {
                            sets.union(i, j);
                        }
                    }
                }
                sets.groups(0..fan.len()).len() == 1
            });
        }

        ManifoldReport {
            is_manifold,
            is_oriented,
            has_boundary,
        }
    }

    /// Chains of edges used by a single face. Closed chains repeat their
    /// first point. `None` when the mesh has no naked edges.
    pub fn naked_edges(&self) -> Option<Vec<Polyline>> {
        let topology = self.topology();
        let edges = topology.edges();
        let naked: Vec<usize> = (0..edges.len()).filter(|&e| edges[e].is_naked()).collect();
        if naked.is_empty() {
            return None;
        }

        let mut visited = vec![false; edges.len()];
        let position = |vertex: usize| {
            topology
                .mesh_vertices(vertex)
                .and_then(|group| group.first())
                .map(|&v| math::to_f64(&self.vertices[v]))
        };
        let next_edge = |vertex: usize, visited: &[bool]| {
            topology
                .vertex_edges(vertex)
                .iter()
                .copied()
                .find(|&e| edges[e].is_naked() && !visited[e])
        };
        let other_end = |e: usize, vertex: usize| {
            let (v0, v1) = edges[e].vertices;
            if v0 == vertex {
                v1
            } else {
                v0
            }
        };

        let mut polylines = Vec::new();
        for &start in &naked {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let (first, second) = edges[start].vertices;
            let mut chain: VecDeque<usize> = VecDeque::from([first, second]);

            let mut tail = second;
            while let Some(e) = next_edge(tail, &visited) {
                visited[e] = true;
                tail = other_end(e, tail);
                chain.push_back(tail);
                if tail == first {
                    break;
                }
            }
            if tail != first {
                let mut head = first;
                while let Some(e) = next_edge(head, &visited) {
                    visited[e] = true;
                    head = other_end(e, head);
                    chain.push_front(head);
                }
            }

            let points: Option<Vec<Point3<f64>>> = chain.into_iter().map(position).collect();
            polylines.extend(points.map(Polyline::new));
        }

        trace!(naked_edges = naked.len(), polylines = polylines.len(), "collected naked edges");
        Some(polylines)
    }

    /// Per mesh vertex, true when it lies on a naked edge. `None` for a
    /// mesh without vertices.
    pub fn naked_edge_point_status(&self) -> Option<Vec<bool>> {
        if self.vertices.is_empty() {
            return None;
        }
        let topology = self.topology();
        let mut on_boundary = vec![false; topology.topology_vertex_count()];
        for edge in topology.edges().iter().filter(|e| e.is_naked()) {
            on_boundary[edge.vertices.0] = true;
            on_boundary[edge.vertices.1] = true;
        }
        let status = (0..self.vertices.len())
            .map(|v| {
                topology
                    .topology_vertex_of(v)
                    .map(|t| on_boundary[t])
                    .unwrap_or(false)
            })
            .collect();
        Some(status)
    }

    /// Make adjacent faces agree on orientation. Returns the number of
    /// faces reversed.
    ///
    /// Each piece keeps the orientation most of its faces already have;
    /// closed pieces are then turned to face outward. Edges with more than
    /// two faces do not propagate orientation.
    pub fn unify_normals(&mut self) -> usize {
        let face_count = self.faces.len();
        let mut flipped = vec![false; face_count];
        {
            let topology = self.topology();
            let edges = topology.edges();
            let mut seen = vec![false; face_count];

            for seed in 0..face_count {
                if seen[seed] || topology.face_edges(seed).is_empty() {
                    continue;
                }
                seen[seed] = true;
                let mut component = vec![seed];
                let mut queue = VecDeque::from([seed]);
                let mut closed = true;

                while let Some(face) = queue.pop_front() {
                    for &e in topology.face_edges(face) {
                        let uses = &edges[e].uses;
                        if uses.len() != 2 {
                            closed &= uses.len() > 2;
                            continue;
                        }
                        let (mine, theirs) = if uses[0].face == face {
                            (uses[0], uses[1])
                        } else {
                            (uses[1], uses[0])
                        };
                        if seen[theirs.face] {
                            continue;
                        }
                        seen[theirs.face] = true;
                        flipped[theirs.face] = !(mine.forward ^ flipped[face] ^ theirs.forward);
                        component.push(theirs.face);
                        queue.push_back(theirs.face);
                    }
                }

                let changed = component.iter().filter(|&&f| flipped[f]).count();
                let mut invert = changed * 2 > component.len();
                if closed {
                    let volume = self.signed_volume_with(component.iter().map(|&f| (f, flipped[f])));
                    invert = volume < 0.0;
                }
                if invert {
                    for &f in &component {
                        flipped[f] = !flipped[f];
                    }
                }
            }
        }

        let reversed = flipped.iter().filter(|&&f| f).count();
        if reversed == 0 {
            return 0;
        }

        let face_normals_complete = self.face_normals.len() == face_count;
        for index in (0..face_count).filter(|&f| flipped[f]) {
            self.faces[index] = self.faces[index].reversed();
            if face_normals_complete {
                self.face_normals[index] = -self.face_normals[index];
            }
        }
        self.invalidate_topology();
        self.touch();
        if self.has_normals() {
            self.normals_mut().compute_normals();
        }

        debug!(reversed, "unified face orientation");
        reversed
    }

    /// Signed volume enclosed by the listed faces, each optionally taken
    /// with reversed orientation. Quads are split along `a-c`.
    pub(crate) fn signed_volume_with(&self, faces: impl Iterator<Item = (usize, bool)>) -> f64 {
        let vertex_count = self.vertices.len();
        let mut volume = 0.0;
        for (index, reverse) in faces {
            let Some(face) = self.faces.get(index) else {
                continue;
            };
            if !face.is_valid_for(vertex_count) {
                continue;
            }
            let p = |c: i32| math::to_f64(&self.vertices[c as usize]).coords;
            let (a, b, c, d) = (p(face.a), p(face.b), p(face.c), p(face.d));
            let mut contribution = a.dot(&b.cross(&c));
            if face.is_quad() {
                contribution += a.dot(&c.cross(&d));
            }
            volume += if reverse { -contribution } else { contribution };
        }
        volume / 6.0
    }

    /// Closest point on the mesh, `None` for a mesh without valid faces.
    pub fn closest_point(&self, point: &Point3<f64>) -> Option<Point3<f64>> {
        let mesh_point = self.closest_mesh_point(point, 0.0);
        mesh_point.is_valid().then_some(mesh_point.point)
    }

    /// Closest location on the mesh within `max_distance` of `point`.
    ///
    /// A `max_distance` of zero or less means no limit. On failure the
    /// result has `face_index == -1`.
    pub fn closest_mesh_point(&self, point: &Point3<f64>, max_distance: f64) -> MeshPoint {
        match ProximityIndex::build(self) {
            Some(index) => index.closest(point, max_distance),
            None => MeshPoint::UNSET,
        }
    }

    /// Closest mesh point for each input point; points with no result are
    /// dropped.
    pub fn pull_points_to_mesh(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        let Some(index) = ProximityIndex::build(self) else {
            return Vec::new();
        };
        points
            .par_iter()
            .map(|p| index.closest(p, 0.0))
            .filter(MeshPoint::is_valid)
            .map(|mesh_point| mesh_point.point)
            .collect()
    }

    /// New mesh with every vertex moved `distance` along its vertex normal.
    ///
    /// Missing normals are computed first. `None` for an invalid mesh, a
    /// mesh without faces or a non-finite distance.
    pub fn offset(&self, distance: f64) -> Option<IndexedMesh> {
        if !distance.is_finite() || self.faces.is_empty() || !self.is_valid() {
            return None;
        }
        let mut result = self.duplicate();
        if !result.has_normals() && !result.normals_mut().compute_normals() {
            return None;
        }

        for (vertex, normal) in result.vertices.iter_mut().zip(result.normals.iter()) {
            if let Some(unit) = math::unit(normal) {
                let moved = math::to_f64(vertex) + unit.cast::<f64>() * distance;
                *vertex = math::to_f32(&moved);
            }
        }
        result.invalidate_topology();
        result.touch();
        Some(result)
    }
}
