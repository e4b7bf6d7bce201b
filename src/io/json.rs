// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON snapshots of a mesh
//!
//! Every stored array is written, hidden flags included. Derived data
//! such as topology is rebuilt on demand after loading.

use crate::error::Result;
use crate::geometry::IndexedMesh;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub fn import_json(path: impl AsRef<Path>) -> Result<IndexedMesh> {
    let file = File::open(path.as_ref())?;
    let mesh: IndexedMesh = serde_json::from_reader(BufReader::new(file))?;
    debug!(
        path = %path.as_ref().display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "imported JSON mesh"
    );
    Ok(mesh)
}

pub fn export_json(mesh: &IndexedMesh, path: impl AsRef<Path>) -> Result<()> {
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut file, mesh)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Interval, Plane};
    use tempfile::NamedTempFile;

    #[test]
    fn test_round_trip_keeps_attributes() -> Result<()> {
        let mut mesh =
            IndexedMesh::create_from_plane(&Plane::world_xy(), Interval::UNIT, Interval::UNIT, 2, 2)?;
        mesh.vertex_colors_mut().create_monotone_mesh(Color::from_argb(0xFF10_2030));
        mesh.vertices_mut().hide(4)?;

        let file = NamedTempFile::new()?;
        export_json(&mesh, file.path())?;
        let loaded = import_json(file.path())?;

        assert_eq!(loaded, mesh);
        assert!(loaded.vertices().is_hidden(4));
        assert_eq!(loaded.topology_vertices().count(), 9);
        Ok(())
    }

    #[test]
    fn test_malformed_json_is_reported() -> Result<()> {
        let file = NamedTempFile::new()?;
        std::fs::write(file.path(), "{ \"vertices\": 3 }")?;
        assert!(matches!(
            import_json(file.path()),
            Err(crate::error::MeshError::Json(_))
        ));
        Ok(())
    }
}
