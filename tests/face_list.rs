// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face list and face value behavior through the public API

use nalgebra::Point3;
use polyframe_mesh::geometry::{Interval, Plane};
use polyframe_mesh::{IndexedMesh, MeshFace};

fn grid(x_count: usize, y_count: usize) -> IndexedMesh {
    IndexedMesh::create_from_plane(
        &Plane::world_xy(),
        Interval::new(0.0, x_count as f64),
        Interval::new(0.0, y_count as f64),
        x_count,
        y_count,
    )
    .unwrap()
}

#[test]
fn test_face_kinds_survive_flip() {
    let faces = [
        MeshFace::triangle(0, 1, 2),
        MeshFace::quad(0, 1, 2, 3),
        MeshFace::quad(4, 7, 1, 9),
    ];
    for face in faces {
        assert_eq!(face.is_triangle(), face.c == face.d);
        assert_eq!(face.flip().is_triangle(), face.is_triangle());
        assert_eq!(face.flip().is_quad(), face.is_quad());
    }

    assert_eq!(MeshFace::triangle(0, 1, 2).flip(), MeshFace::quad(0, 2, 1, 1));
    assert_eq!(MeshFace::quad(0, 1, 2, 3).flip(), MeshFace::quad(0, 3, 2, 0));
}

#[test]
fn test_face_validity() {
    assert!(!MeshFace::triangle(-1, 1, 2).is_valid());
    assert!(!MeshFace::quad(0, 1, 0, 2).is_valid());
    assert!(!MeshFace::quad(0, 1, 2, 1).is_valid());
    assert!(MeshFace::triangle(0, 1, 2).is_valid());

    let face = MeshFace::quad(0, 1, 2, 3);
    assert!(face.is_valid());
    assert!(face.is_valid_for(4));
    assert!(!face.is_valid_for(3));
    assert_eq!(face.to_string(), "Q(0, 1, 2, 3)");
}

#[test]
fn test_add_triangle_repeats_third_corner() {
    let mut mesh = grid(1, 1);
    let index = mesh.faces_mut().add_triangle(0, 1, 2);
    let face = mesh.faces().get_face(index);
    assert_eq!(face.d, face.c);
    assert!(face.is_triangle());
}

#[test]
fn test_set_face_does_not_grow() {
    let mut mesh = grid(2, 1);
    assert!(mesh.faces_mut().set_triangle(1, 0, 1, 4));
    assert!(!mesh.faces_mut().set_quad(2, 0, 1, 4, 3));
    assert_eq!(mesh.face_count(), 2);
    assert_eq!(mesh.faces().triangle_count(), 1);
    assert_eq!(mesh.faces().quad_count(), 1);
}

#[test]
fn test_set_count_pads_with_unset() {
    let mut mesh = grid(1, 1);
    mesh.faces_mut().set_count(3);
    assert_eq!(mesh.faces().get_face(2), MeshFace::UNSET);
    assert!(!mesh.is_valid());

    assert_eq!(mesh.faces_mut().cull_degenerate_faces(), 2);
    assert!(mesh.is_valid());
}

#[test]
fn test_delete_faces_counts_removed() {
    let mut mesh = grid(3, 3);
    assert_eq!(mesh.faces_mut().delete_faces(&[0, 4, 4, 100]), 2);
    assert_eq!(mesh.face_count(), 7);
}

#[test]
fn test_face_vertices_resolve_corners() {
    let mesh = grid(1, 1);
    let corners = mesh.faces().get_face_vertices(0).unwrap();
    assert_eq!(corners[0], Point3::new(0.0, 0.0, 0.0));
    assert_eq!(corners[2], Point3::new(1.0, 1.0, 0.0));
    assert!(mesh.faces().get_face_vertices(1).is_none());
}

#[test]
fn test_triangles_to_quads_and_back() {
    let mut mesh = grid(3, 2);
    assert!(mesh.faces_mut().convert_quads_to_triangles());
    assert_eq!(mesh.faces().triangle_count(), 12);
    assert!(!mesh.faces_mut().convert_quads_to_triangles());

    assert!(mesh.faces_mut().convert_triangles_to_quads(2f64.to_radians(), 0.875));
    assert_eq!(mesh.faces().quad_count(), 6);
    assert_eq!(mesh.face_count(), 6);
}

#[test]
fn test_triangles_to_quads_respects_angle() {
    let mut mesh = IndexedMesh::new();
    mesh.vertices_mut().add_range([
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.5),
        Point3::new(0.0, 1.0, 0.0),
    ]);
    mesh.faces_mut().add_triangle(0, 1, 2);
    mesh.faces_mut().add_triangle(0, 2, 3);

    assert!(!mesh.faces_mut().convert_triangles_to_quads(2f64.to_radians(), 0.875));
    assert!(mesh.faces_mut().convert_triangles_to_quads(90f64.to_radians(), 0.5));
    assert_eq!(mesh.faces().quad_count(), 1);
}

#[test]
fn test_adjacent_faces() {
    let mesh = grid(3, 1);
    let mut adjacent = mesh.faces().adjacent_faces(1).unwrap();
    adjacent.sort_unstable();
    assert_eq!(adjacent, vec![0, 2]);
    assert!(mesh.faces().adjacent_faces(10).is_none());
}
