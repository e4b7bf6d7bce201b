// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export
//!
//! STL only stores triangles, so quads are split along their shorter
//! diagonal on export and faces invalid for the mesh are skipped.

use crate::error::Result;
use crate::geometry::{IndexedMesh, MeshFace};
use crate::utils::math;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::debug;

/// Import an STL file (binary or ASCII).
///
/// Vertices are shared as the file reader indexes them; facet normals
/// become face normals.
pub fn import_stl(path: impl AsRef<Path>) -> Result<IndexedMesh> {
    let file = File::open(path.as_ref())?;
    let stl = stl_io::read_stl(&mut BufReader::new(file))?;

    let mut mesh = IndexedMesh::with_capacity(stl.vertices.len(), stl.faces.len());
    mesh.vertices_mut()
        .add_range(stl.vertices.iter().map(|v| Point3::new(v[0], v[1], v[2])));
    {
        let mut faces = mesh.faces_mut();
        for face in &stl.faces {
            let [a, b, c] = face.vertices;
            faces.add_triangle(a as i32, b as i32, c as i32);
        }
    }
    mesh.face_normals_mut().add_range(
        &stl.faces
            .iter()
            .map(|face| Vector3::new(face.normal[0], face.normal[1], face.normal[2]))
            .collect::<Vec<_>>(),
    );

    debug!(
        path = %path.as_ref().display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "imported STL"
    );
    Ok(mesh)
}

/// Export a mesh as binary STL.
pub fn export_stl(mesh: &IndexedMesh, path: impl AsRef<Path>) -> Result<()> {
    let triangles = triangulate(mesh);
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    stl_io::write_stl(&mut file, triangles.iter())?;
    file.flush()?;
    debug!(path = %path.as_ref().display(), triangles = triangles.len(), "exported binary STL");
    Ok(())
}

/// Export a mesh as ASCII STL.
pub fn export_stl_ascii(mesh: &IndexedMesh, path: impl AsRef<Path>) -> Result<()> {
    let triangles = triangulate(mesh);
    let mut file = BufWriter::new(File::create(path.as_ref())?);

    writeln!(file, "solid mesh")?;
    for triangle in &triangles {
        let n = triangle.normal;
        writeln!(file, "  facet normal {} {} {}", n[0], n[1], n[2])?;
        writeln!(file, "    outer loop")?;
        for v in &triangle.vertices {
            writeln!(file, "      vertex {} {} {}", v[0], v[1], v[2])?;
        }
        writeln!(file, "    endloop")?;
        writeln!(file, "  endfacet")?;
    }
    writeln!(file, "endsolid mesh")?;
    file.flush()?;

    debug!(path = %path.as_ref().display(), triangles = triangles.len(), "exported ASCII STL");
    Ok(())
}

fn triangulate(mesh: &IndexedMesh) -> Vec<StlTriangle> {
    let vertices = mesh.vertices();
    let points = vertices.as_slice();
    let mut triangles = Vec::with_capacity(mesh.face_count() * 2);

    let mut push = |face: MeshFace| {
        let corner = |c: i32| points[c as usize];
        let (p0, p1, p2) = (corner(face.a), corner(face.b), corner(face.c));
        let normal = math::unit(&math::triangle_area_normal(&p0, &p1, &p2)).unwrap_or_else(Vector3::zeros);
        triangles.push(StlTriangle {
            normal: Normal::new([normal.x, normal.y, normal.z]),
            vertices: [
                StlVertex::new([p0.x, p0.y, p0.z]),
                StlVertex::new([p1.x, p1.y, p1.z]),
                StlVertex::new([p2.x, p2.y, p2.z]),
            ],
        });
    };

    for face in mesh.faces().iter() {
        if !face.is_valid_for(points.len()) {
            continue;
        }
        if face.is_triangle() {
            push(face);
        } else {
            let (first, second) = crate::geometry::split_quad(points, &face);
            push(first);
            push(second);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use tempfile::NamedTempFile;

    fn cube() -> IndexedMesh {
        IndexedMesh::create_from_box(&BoundingBox::new(Point3::origin(), Point3::new(10.0, 10.0, 10.0)))
            .unwrap()
    }

    #[test]
    fn test_quads_are_triangulated() {
        assert_eq!(triangulate(&cube()).len(), 12);
    }

    #[test]
    fn test_binary_round_trip_welds_vertices() -> Result<()> {
        let file = NamedTempFile::new()?;
        export_stl(&cube(), file.path())?;

        let mesh = import_stl(file.path())?;
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.vertex_count(), 8);
        assert!(mesh.has_face_normals());
        assert!(mesh.is_closed());
        Ok(())
    }

    #[test]
    fn test_ascii_export_is_readable() -> Result<()> {
        let file = NamedTempFile::new()?;
        export_stl_ascii(&cube(), file.path())?;

        let text = std::fs::read_to_string(file.path())?;
        assert!(text.starts_with("solid mesh"));
        assert_eq!(text.matches("facet normal").count(), 12);

        let mesh = import_stl(file.path())?;
        assert_eq!(mesh.face_count(), 12);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = import_stl("/nonexistent/polymesh/part.stl");
        assert!(matches!(result, Err(crate::error::MeshError::Io(_))));
    }
}
