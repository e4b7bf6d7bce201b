// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - indexed mesh representation and operations

mod analysis;
pub mod analytics;
mod attributes;
mod bbox;
mod bvh;
mod color;
mod face;
mod faces;
pub mod kernel;
mod mesh;
mod normals;
mod parameters;
mod plane;
mod primitives;
mod shared;
mod topology;
mod traits;
mod vertices;

pub use analysis::{ManifoldReport, MeshPoint};
pub use analytics::{analyze, MeshStats};
pub use attributes::{TextureCoordinateList, VertexColorList};
pub use bbox::BoundingBox;
pub use bvh::{BVHNode, BVH};
pub use color::{Color, Color4f};
pub use face::MeshFace;
pub use faces::FaceList;
pub(crate) use faces::split_quad;
pub use kernel::{BooleanOp, BooleanTolerances, GeometryKernel};
pub use mesh::IndexedMesh;
pub use normals::{FaceNormalList, VertexNormalList};
pub use parameters::{MeshingParameters, MeshingPreset};
pub use plane::{Interval, Plane, Polyline, Sphere};
pub use shared::SharedMesh;
pub use topology::{EdgeUse, MeshTopology, TopologyEdge, TopologyVertexList};
pub use traits::{Bounded, Duplicate, Transformable};
pub use vertices::{VertexIter, VertexList};
