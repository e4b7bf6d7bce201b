// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - importing and exporting meshes

mod json;
mod stl;

pub use json::{export_json, import_json};
pub use stl::{export_stl, export_stl_ascii, import_stl};

use crate::error::{MeshError, Result};
use crate::geometry::IndexedMesh;
use std::path::Path;

/// Supported mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Json,
}

impl MeshFormat {
    /// Format implied by a file extension, case-insensitive.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("stl") => Ok(MeshFormat::Stl),
            Some("json") => Ok(MeshFormat::Json),
            _ => Err(MeshError::invalid(format!(
                "unsupported mesh file: {}",
                path.display()
            ))),
        }
    }
}

/// Read a mesh, choosing the format from the extension
pub fn import_mesh(path: impl AsRef<Path>) -> Result<IndexedMesh> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Stl => import_stl(path),
        MeshFormat::Json => import_json(path),
    }
}

/// Write a mesh, choosing the format from the extension
pub fn export_mesh(mesh: &IndexedMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Stl => export_stl(mesh, path),
        MeshFormat::Json => export_json(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(MeshFormat::from_path("part.STL").unwrap(), MeshFormat::Stl);
        assert_eq!(MeshFormat::from_path("dir/part.json").unwrap(), MeshFormat::Json);
        assert!(matches!(
            MeshFormat::from_path("part.obj"),
            Err(MeshError::InvalidInput(_))
        ));
        assert!(MeshFormat::from_path("no_extension").is_err());
    }
}
