// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry kernel seam driven by a stand-in kernel built on the mesh analysis

use nalgebra::Point3;
use polyframe_mesh::geometry::kernel::{
    create_boolean, create_boolean_difference, create_boolean_union, create_from_brep,
    get_outlines, get_outlines_for_view, split_by_plane,
};
use polyframe_mesh::geometry::{
    BooleanOp, BooleanTolerances, BoundingBox, GeometryKernel, Plane, Polyline,
};
use polyframe_mesh::{IndexedMesh, MeshError, MeshingParameters};

/// Meshes boxes, unions by appending and answers outlines with naked edges.
struct BoxKernel;

impl GeometryKernel for BoxKernel {
    type Brep = BoundingBox;
    type Viewport = ();

    fn mesh_brep(&self, brep: &BoundingBox, _: &MeshingParameters) -> Option<Vec<IndexedMesh>> {
        IndexedMesh::create_from_box(brep).ok().map(|mesh| vec![mesh])
    }

    fn boolean_union(&self, meshes: &[IndexedMesh], _: &BooleanTolerances) -> Option<Vec<IndexedMesh>> {
        let mut combined = IndexedMesh::new();
        for mesh in meshes {
            combined.append(mesh);
        }
        Some(combined.split_disjoint_pieces())
    }

    fn boolean_difference(
        &self,
        first: &[IndexedMesh],
        _: &[IndexedMesh],
        _: &BooleanTolerances,
    ) -> Option<Vec<IndexedMesh>> {
        Some(first.to_vec())
    }

    fn boolean_intersection(
        &self,
        _: &[IndexedMesh],
        _: &[IndexedMesh],
        _: &BooleanTolerances,
    ) -> Option<Vec<IndexedMesh>> {
        None
    }

    fn boolean_split(
        &self,
        _: &[IndexedMesh],
        _: &[IndexedMesh],
        _: &BooleanTolerances,
    ) -> Option<Vec<IndexedMesh>> {
        Some(vec![IndexedMesh::new()])
    }

    fn split_by_plane(&self, mesh: &IndexedMesh, _: &Plane) -> Option<Vec<IndexedMesh>> {
        Some(mesh.explode_at_unwelded_edges())
    }

    fn outlines(&self, mesh: &IndexedMesh, _: &Plane) -> Option<Vec<Polyline>> {
        mesh.naked_edges()
    }

    fn outlines_for_view(&self, _: &IndexedMesh, _: &()) -> Option<Vec<Polyline>> {
        Some(vec![Polyline::new(vec![Point3::origin()])])
    }
}

fn unit_box(offset: f32) -> BoundingBox {
    BoundingBox::new(
        Point3::new(offset, 0.0, 0.0),
        Point3::new(offset + 1.0, 1.0, 1.0),
    )
}

fn meshed(offset: f32) -> IndexedMesh {
    create_from_brep(&BoxKernel, &unit_box(offset), &MeshingParameters::default())
        .unwrap()
        .unwrap()
        .remove(0)
}

#[test]
fn test_brep_meshing() {
    let mesh = meshed(0.0);
    assert!(mesh.is_closed());

    let empty = BoundingBox::empty();
    assert_eq!(
        create_from_brep(&BoxKernel, &empty, &MeshingParameters::coarse()).unwrap(),
        None
    );
}

#[test]
fn test_union_returns_owned_pieces() {
    let inputs = [meshed(0.0), meshed(5.0)];
    let pieces = create_boolean_union(&BoxKernel, &inputs, &BooleanTolerances::default())
        .unwrap()
        .unwrap();
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[1], inputs[1]);

    let dispatched = create_boolean(
        &BoxKernel,
        BooleanOp::Union,
        &inputs[..1],
        &inputs[1..],
        &BooleanTolerances::default(),
    )
    .unwrap()
    .unwrap();
    assert_eq!(dispatched, pieces);
}

#[test]
fn test_failures_are_none_not_errors() {
    let inputs = [meshed(0.0)];
    let tolerances = BooleanTolerances::default();
    for op in [BooleanOp::Intersection, BooleanOp::Split] {
        assert_eq!(
            create_boolean(&BoxKernel, op, &inputs, &inputs, &tolerances).unwrap(),
            None,
            "{op}"
        );
    }
    assert_eq!(get_outlines_for_view(&BoxKernel, &inputs[0], &()), None);
}

#[test]
fn test_bad_input_is_rejected_up_front() {
    let inputs = [meshed(0.0)];
    let tolerances = BooleanTolerances {
        intersection: 0.0,
        ..BooleanTolerances::default()
    };
    assert!(matches!(
        create_boolean_difference(&BoxKernel, &inputs, &inputs, &tolerances),
        Err(MeshError::InvalidInput(_))
    ));
    assert!(create_boolean_difference(&BoxKernel, &inputs, &[], &BooleanTolerances::default()).is_err());

    let mut broken = meshed(0.0);
    broken.faces_mut().add_triangle(0, 1, 99);
    assert!(split_by_plane(&BoxKernel, &broken, &Plane::world_xy()).is_err());
}

#[test]
fn test_outlines_of_open_box() {
    let mut open = meshed(0.0);
    open.faces_mut().delete_faces(&[1]);

    let outlines = get_outlines(&BoxKernel, &open, &Plane::world_xy()).unwrap().unwrap();
    assert_eq!(outlines.len(), 1);
    assert!(outlines[0].is_closed());
    assert_eq!(outlines[0].len(), 5);

    assert_eq!(get_outlines(&BoxKernel, &meshed(0.0), &Plane::world_xy()).unwrap(), None);
}

#[test]
fn test_split_by_plane_separates_unwelded_faces() {
    let pieces = split_by_plane(&BoxKernel, &meshed(0.0), &Plane::world_xy())
        .unwrap()
        .unwrap();
    assert_eq!(pieces.len(), 1);
}
