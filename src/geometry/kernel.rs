// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Seam to an external geometry kernel
//!
//! Brep meshing, mesh booleans and outline extraction are not implemented
//! here. A host supplies them through [`GeometryKernel`]; the free functions
//! in this module check inputs, call the kernel and normalise its output.

use super::{IndexedMesh, MeshingParameters, Plane, Polyline};
use crate::error::{MeshError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{trace, warn};

/// Operations delegated to a host geometry kernel.
///
/// Every method returns `None` when the kernel could not compute a result.
pub trait GeometryKernel {
    /// Boundary representation the kernel can mesh
    type Brep;
    /// View projection used for silhouettes
    type Viewport;

    fn mesh_brep(&self, brep: &Self::Brep, parameters: &MeshingParameters) -> Option<Vec<IndexedMesh>>;

    fn boolean_union(&self, meshes: &[IndexedMesh], tolerances: &BooleanTolerances) -> Option<Vec<IndexedMesh>>;

    fn boolean_difference(
        &self,
        first: &[IndexedMesh],
        second: &[IndexedMesh],
        tolerances: &BooleanTolerances,
    ) -> Option<Vec<IndexedMesh>>;

    fn boolean_intersection(
        &self,
        first: &[IndexedMesh],
        second: &[IndexedMesh],
        tolerances: &BooleanTolerances,
    ) -> Option<Vec<IndexedMesh>>;

    fn boolean_split(
        &self,
        to_split: &[IndexedMesh],
        splitters: &[IndexedMesh],
        tolerances: &BooleanTolerances,
    ) -> Option<Vec<IndexedMesh>>;

    fn split_by_plane(&self, mesh: &IndexedMesh, plane: &Plane) -> Option<Vec<IndexedMesh>>;

    /// Outlines of the mesh projected onto `plane`
    fn outlines(&self, mesh: &IndexedMesh, plane: &Plane) -> Option<Vec<Polyline>>;

    /// Silhouette outlines as seen through `viewport`
    fn outlines_for_view(&self, mesh: &IndexedMesh, viewport: &Self::Viewport) -> Option<Vec<Polyline>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
    Split,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BooleanOp::Union => "union",
            BooleanOp::Difference => "difference",
            BooleanOp::Intersection => "intersection",
            BooleanOp::Split => "split",
        };
        f.write_str(name)
    }
}

/// Tolerances handed to mesh booleans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanTolerances {
    /// Distance below which surfaces are treated as intersecting
    pub intersection: f64,
    /// Distance below which coplanar faces are treated as overlapping
    pub overlap: f64,
}

impl BooleanTolerances {
    pub fn is_valid(&self) -> bool {
        [self.intersection, self.overlap]
            .iter()
            .all(|t| t.is_finite() && *t > 0.0)
    }
}

impl Default for BooleanTolerances {
    fn default() -> Self {
        let tolerance = f64::EPSILON.sqrt() * 10.0;
        Self {
            intersection: tolerance,
            overlap: tolerance,
        }
    }
}

/// Drop empty meshes; an empty result becomes `None`.
fn normalise(operation: &str, result: Option<Vec<IndexedMesh>>) -> Option<Vec<IndexedMesh>> {
    let meshes: Vec<IndexedMesh> = result
        .unwrap_or_default()
        .into_iter()
        .filter(|mesh| !mesh.is_empty())
        .collect();
    if meshes.is_empty() {
        warn!(operation, "geometry kernel returned no meshes");
        return None;
    }
    trace!(operation, meshes = meshes.len(), "geometry kernel returned meshes");
    Some(meshes)
}

fn check_tolerances(tolerances: &BooleanTolerances) -> Result<()> {
    if tolerances.is_valid() {
        Ok(())
    } else {
        Err(MeshError::invalid(format!(
            "boolean tolerances must be positive (intersection = {}, overlap = {})",
            tolerances.intersection, tolerances.overlap
        )))
    }
}

fn check_meshes(role: &str, meshes: &[IndexedMesh]) -> Result<()> {
    if meshes.is_empty() {
        return Err(MeshError::invalid(format!("no {role} meshes supplied")));
    }
    match meshes.iter().position(|mesh| !mesh.is_valid()) {
        Some(index) => Err(MeshError::invalid(format!("{role} mesh {index} is not valid"))),
        None => Ok(()),
    }
}

/// Mesh a brep with the given parameters.
///
/// Invalid parameters are rejected before the kernel is called. `Ok(None)`
/// means the kernel produced nothing.
pub fn create_from_brep<K: GeometryKernel>(
    kernel: &K,
    brep: &K::Brep,
    parameters: &MeshingParameters,
) -> Result<Option<Vec<IndexedMesh>>> {
    if !parameters.is_valid() {
        return Err(MeshError::invalid("meshing parameters are not valid"));
    }
    Ok(normalise("mesh brep", kernel.mesh_brep(brep, parameters)))
}

pub fn create_boolean_union<K: GeometryKernel>(
    kernel: &K,
    meshes: &[IndexedMesh],
    tolerances: &BooleanTolerances,
) -> Result<Option<Vec<IndexedMesh>>> {
    check_meshes("input", meshes)?;
    check_tolerances(tolerances)?;
    Ok(normalise("union", kernel.boolean_union(meshes, tolerances)))
}

pub fn create_boolean_difference<K: GeometryKernel>(
    kernel: &K,
    first: &[IndexedMesh],
    second: &[IndexedMesh],
    tolerances: &BooleanTolerances,
) -> Result<Option<Vec<IndexedMesh>>> {
    create_boolean(kernel, BooleanOp::Difference, first, second, tolerances)
}

pub fn create_boolean_intersection<K: GeometryKernel>(
    kernel: &K,
    first: &[IndexedMesh],
    second: &[IndexedMesh],
    tolerances: &BooleanTolerances,
) -> Result<Option<Vec<IndexedMesh>>> {
    create_boolean(kernel, BooleanOp::Intersection, first, second, tolerances)
}

pub fn create_boolean_split<K: GeometryKernel>(
    kernel: &K,
    to_split: &[IndexedMesh],
    splitters: &[IndexedMesh],
    tolerances: &BooleanTolerances,
) -> Result<Option<Vec<IndexedMesh>>> {
    create_boolean(kernel, BooleanOp::Split, to_split, splitters, tolerances)
}

/// Dispatch a two-operand boolean. A union combines both operand sets.
pub fn create_boolean<K: GeometryKernel>(
    kernel: &K,
    op: BooleanOp,
    first: &[IndexedMesh],
    second: &[IndexedMesh],
    tolerances: &BooleanTolerances,
) -> Result<Option<Vec<IndexedMesh>>> {
    if op == BooleanOp::Union {
        let combined: Vec<IndexedMesh> = first.iter().chain(second).cloned().collect();
        return create_boolean_union(kernel, &combined, tolerances);
    }

    check_meshes("first", first)?;
    check_meshes("second", second)?;
    check_tolerances(tolerances)?;
    let result = match op {
        BooleanOp::Difference => kernel.boolean_difference(first, second, tolerances),
        BooleanOp::Intersection => kernel.boolean_intersection(first, second, tolerances),
        BooleanOp::Split => kernel.boolean_split(first, second, tolerances),
        BooleanOp::Union => None,
    };
    Ok(normalise(&op.to_string(), result))
}

pub fn split_by_plane<K: GeometryKernel>(
    kernel: &K,
    mesh: &IndexedMesh,
    plane: &Plane,
) -> Result<Option<Vec<IndexedMesh>>> {
    if !plane.is_valid() {
        return Err(MeshError::invalid("split plane is not valid"));
    }
    check_meshes("input", std::slice::from_ref(mesh))?;
    Ok(normalise("split by plane", kernel.split_by_plane(mesh, plane)))
}

/// Outlines against a plane; `Ok(None)` when there are none.
pub fn get_outlines<K: GeometryKernel>(
    kernel: &K,
    mesh: &IndexedMesh,
    plane: &Plane,
) -> Result<Option<Vec<Polyline>>> {
    if !plane.is_valid() {
        return Err(MeshError::invalid("outline plane is not valid"));
    }
    Ok(normalise_outlines(kernel.outlines(mesh, plane)))
}

pub fn get_outlines_for_view<K: GeometryKernel>(
    kernel: &K,
    mesh: &IndexedMesh,
    viewport: &K::Viewport,
) -> Option<Vec<Polyline>> {
    normalise_outlines(kernel.outlines_for_view(mesh, viewport))
}

fn normalise_outlines(result: Option<Vec<Polyline>>) -> Option<Vec<Polyline>> {
    let outlines: Vec<Polyline> = result
        .unwrap_or_default()
        .into_iter()
        .filter(|polyline| polyline.len() >= 2)
        .collect();
    if outlines.is_empty() {
        warn!("geometry kernel returned no outlines");
        return None;
    }
    Some(outlines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use nalgebra::Point3;

    /// Kernel that echoes its inputs so calls can be observed.
    struct EchoKernel;

    impl GeometryKernel for EchoKernel {
        type Brep = BoundingBox;
        type Viewport = ();

        fn mesh_brep(&self, brep: &BoundingBox, _: &MeshingParameters) -> Option<Vec<IndexedMesh>> {
            IndexedMesh::create_from_box(brep).ok().map(|mesh| vec![mesh])
        }

        fn boolean_union(&self, meshes: &[IndexedMesh], _: &BooleanTolerances) -> Option<Vec<IndexedMesh>> {
            let mut merged = IndexedMesh::new();
            meshes.iter().for_each(|mesh| merged.append(mesh));
            Some(vec![merged])
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
            Some(vec![IndexedMesh::new()])
        }

        fn boolean_split(
            &self,
            _: &[IndexedMesh],
            _: &[IndexedMesh],
            _: &BooleanTolerances,
        ) -> Option<Vec<IndexedMesh>> {
            None
        }

        fn split_by_plane(&self, mesh: &IndexedMesh, _: &Plane) -> Option<Vec<IndexedMesh>> {
            Some(mesh.split_disjoint_pieces())
        }

        fn outlines(&self, mesh: &IndexedMesh, _: &Plane) -> Option<Vec<Polyline>> {
            mesh.naked_edges()
        }

        fn outlines_for_view(&self, _: &IndexedMesh, _: &()) -> Option<Vec<Polyline>> {
            Some(vec![Polyline::new(vec![Point3::origin()])])
        }
    }

    fn cube() -> IndexedMesh {
        IndexedMesh::create_from_box(&BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))).unwrap()
    }

    #[test]
    fn test_default_tolerances() {
        let tolerances = BooleanTolerances::default();
        assert!((tolerances.intersection - 1.4901161193847656e-7).abs() < 1e-15);
        assert_eq!(tolerances.intersection, tolerances.overlap);
        assert!(tolerances.is_valid());
    }

    #[test]
    fn test_union_merges_through_kernel() {
        let result = create_boolean_union(&EchoKernel, &[cube(), cube()], &BooleanTolerances::default())
            .unwrap()
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].face_count(), 12);
    }

    #[test]
    fn test_empty_results_become_none() {
        let tolerances = BooleanTolerances::default();
        let a = [cube()];
        assert!(create_boolean_intersection(&EchoKernel, &a, &a, &tolerances).unwrap().is_none());
        assert!(create_boolean_split(&EchoKernel, &a, &a, &tolerances).unwrap().is_none());
        assert!(get_outlines_for_view(&EchoKernel, &cube(), &()).is_none());
        assert!(get_outlines(&EchoKernel, &cube(), &Plane::world_xy()).unwrap().is_none());
    }

    #[test]
    fn test_inputs_checked_before_kernel() {
        let bad = BooleanTolerances {
            intersection: 0.0,
            overlap: 1e-6,
        };
        assert!(matches!(
            create_boolean_difference(&EchoKernel, &[cube()], &[cube()], &bad),
            Err(MeshError::InvalidInput(_))
        ));
        assert!(create_boolean_union(&EchoKernel, &[], &BooleanTolerances::default()).is_err());

        let mut params = MeshingParameters::default();
        params.relative_tolerance = 2.0;
        let brep = BoundingBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(create_from_brep(&EchoKernel, &brep, &params).is_err());
        let meshes = create_from_brep(&EchoKernel, &brep, &MeshingParameters::coarse())
            .unwrap()
            .unwrap();
        assert!(meshes[0].is_closed());
    }

    #[test]
    fn test_boolean_op_display() {
        assert_eq!(BooleanOp::Split.to_string(), "split");
    }
}
