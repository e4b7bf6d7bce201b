// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Mesh
//!
//! Indexed polygon meshes of triangles and quads with optional per-vertex
//! normals, colors and texture coordinates, coalesced topology queries and
//! whole-mesh analysis. Brep meshing and mesh booleans are delegated to a
//! host kernel through [`geometry::GeometryKernel`].

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod utils;

pub use config::MeshConfig;
pub use error::{MeshError, Result};
pub use geometry::{
    analyze, Color, IndexedMesh, MeshFace, MeshStats, MeshingParameters, MeshingPreset, SharedMesh,
};
pub use io::{export_mesh, import_mesh};

/// Load a mesh and remove invalid faces and unused vertices
pub fn load_clean(path: impl AsRef<std::path::Path>) -> Result<IndexedMesh> {
    let mut mesh = import_mesh(path)?;
    mesh.compact();
    Ok(mesh)
}
