// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed mesh representation and whole-mesh operations

use super::attributes::{TextureCoordinateList, VertexColorList};
use super::faces::FaceList;
use super::normals::{FaceNormalList, VertexNormalList};
use super::topology::{MeshTopology, TopologyVertexList};
use super::vertices::VertexList;
use super::{BoundingBox, Color, Interval, MeshFace};
use crate::utils::math;
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Polygon mesh of triangles and quads over a shared vertex array.
///
/// Vertex normals, colors and texture coordinates are optional arrays
/// parallel to the vertices; face normals are parallel to the faces. An
/// optional array is considered present when its length matches its
/// reference count, but mismatched lengths are tolerated while a mesh is
/// being built. The hidden-vertex flags are allocated on the first hide and
/// kept the same length as the vertex array from then on.
///
/// All access goes through the list views returned by [`IndexedMesh::vertices`],
/// [`IndexedMesh::faces`] and friends. Views borrowed through `&self` only
/// read; the `_mut` variants also write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub(crate) vertices: Vec<Point3<f32>>,
    pub(crate) faces: Vec<MeshFace>,
    #[serde(default)]
    pub(crate) normals: Vec<Vector3<f32>>,
    #[serde(default)]
    pub(crate) face_normals: Vec<Vector3<f32>>,
    #[serde(default)]
    pub(crate) colors: Vec<Color>,
    #[serde(default)]
    pub(crate) texture_coordinates: Vec<Point2<f32>>,
    #[serde(default)]
    pub(crate) texture_domain: [Interval; 2],
    #[serde(default)]
    pub(crate) hidden: Option<Vec<bool>>,
    #[serde(skip)]
    topology: OnceLock<MeshTopology>,
    #[serde(skip)]
    serial: u64,
}

impl IndexedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            ..Self::default()
        }
    }

    /// Deep copy of every array. The copy starts with a fresh serial.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.serial = 0;
        copy
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.vertices.is_empty() && self.normals.len() == self.vertices.len()
    }

    pub fn has_face_normals(&self) -> bool {
        !self.faces.is_empty() && self.face_normals.len() == self.faces.len()
    }

    pub fn has_colors(&self) -> bool {
        !self.vertices.is_empty() && self.colors.len() == self.vertices.len()
    }

    pub fn has_texture_coordinates(&self) -> bool {
        !self.vertices.is_empty() && self.texture_coordinates.len() == self.vertices.len()
    }

    /// Texture coordinate domain as `[s, t]` intervals.
    pub fn texture_domain(&self) -> [Interval; 2] {
        self.texture_domain
    }

    pub fn set_texture_domain(&mut self, s: Interval, t: Interval) {
        self.texture_domain = [s, t];
        self.touch();
    }

    /// Counter bumped by every mutation that changes the mesh contents.
    ///
    /// Calls that are documented as no-ops leave it untouched.
    pub fn modification_serial(&self) -> u64 {
        self.serial
    }

    /// True once the hidden-vertex flags have been created.
    pub fn hidden_list_allocated(&self) -> bool {
        self.hidden.is_some()
    }

    /// Every face valid for the vertex count and every optional array either
    /// absent or complete.
    pub fn is_valid(&self) -> bool {
        let vertex_count = self.vertices.len();
        let complete = |len: usize| len == 0 || len == vertex_count;

        self.faces.iter().all(|face| face.is_valid_for(vertex_count))
            && complete(self.normals.len())
            && complete(self.colors.len())
            && complete(self.texture_coordinates.len())
            && (self.face_normals.is_empty() || self.face_normals.len() == self.faces.len())
    }

    pub fn vertices(&self) -> VertexList<&IndexedMesh> {
        VertexList::new(self)
    }

    pub fn vertices_mut(&mut self) -> VertexList<&mut IndexedMesh> {
        VertexList::new(self)
    }

    pub fn topology_vertices(&self) -> TopologyVertexList<&IndexedMesh> {
        TopologyVertexList::new(self)
    }

    pub fn topology_vertices_mut(&mut self) -> TopologyVertexList<&mut IndexedMesh> {
        TopologyVertexList::new(self)
    }

    pub fn normals(&self) -> VertexNormalList<&IndexedMesh> {
        VertexNormalList::new(self)
    }

    pub fn normals_mut(&mut self) -> VertexNormalList<&mut IndexedMesh> {
        VertexNormalList::new(self)
    }

    pub fn faces(&self) -> FaceList<&IndexedMesh> {
        FaceList::new(self)
    }

    pub fn faces_mut(&mut self) -> FaceList<&mut IndexedMesh> {
        FaceList::new(self)
    }

    pub fn face_normals(&self) -> FaceNormalList<&IndexedMesh> {
        FaceNormalList::new(self)
    }

    pub fn face_normals_mut(&mut self) -> FaceNormalList<&mut IndexedMesh> {
        FaceNormalList::new(self)
    }

    pub fn vertex_colors(&self) -> VertexColorList<&IndexedMesh> {
        VertexColorList::new(self)
    }

    pub fn vertex_colors_mut(&mut self) -> VertexColorList<&mut IndexedMesh> {
        VertexColorList::new(self)
    }

    pub fn texture_coordinates(&self) -> TextureCoordinateList<&IndexedMesh> {
        TextureCoordinateList::new(self)
    }

    pub fn texture_coordinates_mut(&mut self) -> TextureCoordinateList<&mut IndexedMesh> {
        TextureCoordinateList::new(self)
    }

    /// Remove invalid faces and unreferenced vertices, then release spare
    /// capacity. Returns true when the mesh ends up valid.
    pub fn compact(&mut self) -> bool {
        let culled_faces = self.faces_mut().cull_degenerate_faces();
        let culled_vertices = self.vertices_mut().cull_unused();

        self.vertices.shrink_to_fit();
        self.faces.shrink_to_fit();
        self.normals.shrink_to_fit();
        self.face_normals.shrink_to_fit();
        self.colors.shrink_to_fit();
        self.texture_coordinates.shrink_to_fit();

        debug!(culled_faces, culled_vertices, "compacted mesh");
        self.is_valid()
    }

    /// Reverse the requested parts of the mesh.
    ///
    /// Face orientation is reversed with `(a, d, c, b)` so quads stay valid.
    pub fn flip(&mut self, vertex_normals: bool, face_normals: bool, face_orientation: bool) {
        if vertex_normals {
            self.normals.iter_mut().for_each(|n| *n = -*n);
        }
        if face_normals {
            self.face_normals.iter_mut().for_each(|n| *n = -*n);
        }
        if face_orientation {
            self.faces.iter_mut().for_each(|f| *f = f.reversed());
            self.invalidate_topology();
        }
        if vertex_normals || face_normals || face_orientation {
            self.touch();
        }
    }

    /// Append `other`, offsetting its face indices past the current vertices.
    ///
    /// Optional arrays survive only when both meshes carry them completely.
    pub fn append(&mut self, other: &IndexedMesh) {
        if other.is_empty() {
            return;
        }

        let vertex_count = self.vertices.len();
        let face_count = self.faces.len();
        let offset = vertex_count as i32;

        fn merge<T: Copy>(mine: &mut Vec<T>, mine_count: usize, theirs: &[T], their_count: usize) {
            if mine.len() == mine_count && theirs.len() == their_count {
                mine.extend_from_slice(theirs);
            } else {
                mine.clear();
            }
        }
        merge(&mut self.normals, vertex_count, &other.normals, other.vertices.len());
        merge(&mut self.colors, vertex_count, &other.colors, other.vertices.len());
        merge(
            &mut self.texture_coordinates,
            vertex_count,
            &other.texture_coordinates,
            other.vertices.len(),
        );
        merge(&mut self.face_normals, face_count, &other.face_normals, other.faces.len());

        if self.hidden.is_some() || other.hidden.is_some() {
            let mut hidden = self.hidden.take().unwrap_or_default();
            hidden.resize(vertex_count, false);
            match &other.hidden {
                Some(theirs) => {
                    hidden.extend_from_slice(theirs);
                    hidden.resize(vertex_count + other.vertices.len(), false);
                }
                None => hidden.resize(vertex_count + other.vertices.len(), false),
            }
            self.hidden = Some(hidden);
        }

        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(other.faces.iter().map(|face| {
            let shift = |corner: i32| if corner >= 0 { corner + offset } else { corner };
            MeshFace::quad(shift(face.a), shift(face.b), shift(face.c), shift(face.d))
        }));

        self.invalidate_topology();
        self.touch();
    }

    /// Transform points by `matrix`; normals use its inverse transpose.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            *vertex = math::to_f32(&matrix.transform_point(&math::to_f64(vertex)));
        }

        // Normals only see the linear part, so translation never leaks in
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(linear);
        let transform_normal = |n: &mut Vector3<f32>| {
            let v = normal_matrix * n.cast::<f64>();
            *n = v.try_normalize(f64::EPSILON).unwrap_or(v).cast::<f32>();
        };
        for normal in self.normals.iter_mut().chain(self.face_normals.iter_mut()) {
            transform_normal(normal);
        }

        self.invalidate_topology();
        self.touch();
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Area-weighted normal of a face valid for this mesh.
    pub(crate) fn face_area_normal(&self, face: &MeshFace) -> Option<Vector3<f32>> {
        if !face.is_valid_for(self.vertices.len()) {
            return None;
        }
        let p = |corner: i32| &self.vertices[corner as usize];
        if face.is_triangle() {
            Some(math::triangle_area_normal(p(face.a), p(face.b), p(face.c)))
        } else {
            Some(math::quad_area_normal(p(face.a), p(face.b), p(face.c), p(face.d)))
        }
    }

    pub(crate) fn touch(&mut self) {
        self.serial = self.serial.wrapping_add(1);
    }

    /// Drop the cached topology after a vertex or face change.
    pub(crate) fn invalidate_topology(&mut self) {
        self.topology.take();
    }

    pub(crate) fn topology(&self) -> &MeshTopology {
        self.topology
            .get_or_init(|| MeshTopology::build(&self.vertices, &self.faces))
    }

    /// Resize the hidden flags (when allocated) to the vertex count.
    pub(crate) fn repair_hidden(&mut self) {
        let count = self.vertices.len();
        if let Some(hidden) = &mut self.hidden {
            hidden.resize(count, false);
        }
    }

    /// Hidden flags, allocating them all visible on first use.
    pub(crate) fn ensure_hidden(&mut self) -> &mut Vec<bool> {
        let count = self.vertices.len();
        let hidden = self.hidden.get_or_insert_with(Vec::new);
        hidden.resize(count, false);
        hidden
    }

    /// Rebuild every vertex-indexed array from `survivors` (old indices in
    /// their new order) and send each face corner through `remap`.
    pub(crate) fn reindex_vertices(&mut self, survivors: &[usize], remap: &[usize]) {
        fn gather<T: Copy>(values: &mut Vec<T>, survivors: &[usize]) {
            if values.is_empty() {
                return;
            }
            *values = survivors.iter().filter_map(|&i| values.get(i).copied()).collect();
        }

        gather(&mut self.vertices, survivors);
        gather(&mut self.normals, survivors);
        gather(&mut self.colors, survivors);
        gather(&mut self.texture_coordinates, survivors);
        if let Some(hidden) = &mut self.hidden {
            gather(hidden, survivors);
        }
        self.repair_hidden();

        for face in &mut self.faces {
            *face = face.remapped(remap);
        }

        self.invalidate_topology();
        self.touch();
    }

    /// Keep only the faces flagged in `keep`, together with their face normals.
    pub(crate) fn retain_faces(&mut self, keep: &[bool]) -> usize {
        let before = self.faces.len();
        let face_normals_complete = self.face_normals.len() == before;

        let mut flags = keep.iter();
        self.faces.retain(|_| flags.next().copied().unwrap_or(true));
        if face_normals_complete {
            let mut flags = keep.iter();
            self.face_normals.retain(|_| flags.next().copied().unwrap_or(true));
        }

        let removed = before - self.faces.len();
        if removed > 0 {
            self.invalidate_topology();
            self.touch();
        }
        removed
    }
}

/// Meshes compare by content; caches and the serial are ignored.
impl PartialEq for IndexedMesh {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.faces == other.faces
            && self.normals == other.normals
            && self.face_normals == other.face_normals
            && self.colors == other.colors
            && self.texture_coordinates == other.texture_coordinates
            && self.texture_domain == other.texture_domain
            && self.hidden == other.hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices_mut().add_range([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh.faces_mut().add_triangle(0, 1, 2);
        mesh.faces_mut().add_triangle(0, 2, 3);
        mesh
    }

    #[test]
    fn test_new_mesh_is_empty_and_valid() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());
        assert!(mesh.is_valid());
        assert!(!mesh.hidden_list_allocated());
        assert_eq!(mesh.texture_domain(), [Interval::UNIT, Interval::UNIT]);
    }

    #[test]
    fn test_duplicate_is_deep() {
        let mesh = two_triangles();
        let mut copy = mesh.duplicate();
        copy.vertices_mut().set(0, Point3::new(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(mesh.vertices().get(0).unwrap(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(copy.vertex_count(), mesh.vertex_count());
    }

    #[test]
    fn test_partial_arrays_make_mesh_invalid() {
        let mut mesh = two_triangles();
        assert!(mesh.is_valid());
        mesh.normals_mut().add(Vector3::z());
        assert!(!mesh.is_valid());
        mesh.normals_mut().set_count(4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_flip_reverses_faces_and_normals() {
        let mut mesh = two_triangles();
        mesh.normals_mut().compute_normals();
        let serial = mesh.modification_serial();
        mesh.flip(true, true, true);
        assert!(mesh.modification_serial() > serial);
        assert_eq!(mesh.faces().get_face(0), MeshFace::triangle(0, 2, 1));
        assert_eq!(mesh.normals().get(0).unwrap(), -Vector3::z());
        assert_eq!(mesh.face_normals().get(0).unwrap(), -Vector3::z());

        let serial = mesh.modification_serial();
        mesh.flip(false, false, false);
        assert_eq!(mesh.modification_serial(), serial);
    }

    #[test]
    fn test_append_offsets_faces_and_drops_partial_arrays() {
        let mut a = two_triangles();
        a.normals_mut().compute_normals();
        let b = two_triangles();
        a.append(&b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.faces().get_face(3), MeshFace::triangle(4, 6, 7));
        assert_eq!(a.normals().count(), 0);
        assert!(a.is_valid());
    }

    #[test]
    fn test_transform_translates_points_not_normals() {
        let mut mesh = two_triangles();
        mesh.normals_mut().compute_normals();
        mesh.transform(&Matrix4::new_translation(&nalgebra::Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(mesh.vertices().get(0).unwrap(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.normals().get(0).unwrap(), Vector3::z());
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.max, Point3::new(2.0, 3.0, 3.0));
    }

    #[test]
    fn test_compact_removes_invalid_faces_and_orphans() {
        let mut mesh = two_triangles();
        mesh.vertices_mut().add(Point3::new(9.0, 9.0, 9.0));
        mesh.faces_mut().add_triangle(0, 0, 1);
        assert!(!mesh.is_valid());
        assert!(mesh.compact());
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
    }
}
