// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) over mesh faces
//! Used to accelerate closest point queries

use super::BoundingBox;
use nalgebra::Point3;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Face indices (only for leaf nodes)
    pub face_indices: Vec<usize>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, face_indices: Vec<usize>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            face_indices,
        }
    }

    fn internal(bbox: BoundingBox, left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            face_indices: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy keyed by face index
#[derive(Debug, Clone)]
pub struct BVH {
    root: BVHNode,
}

impl BVH {
    /// Build BVH from `(face_index, bbox)` pairs
    pub fn build(faces: Vec<(usize, BoundingBox)>) -> Self {
        if faces.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
            };
        }

        let root = Self::build_recursive(faces, 0);
        Self { root }
    }

    fn build_recursive(mut faces: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        const MAX_DEPTH: usize = 32;
        const MIN_FACES: usize = 4;

        if faces.len() <= MIN_FACES || depth >= MAX_DEPTH {
            let bbox = Self::compute_union_bbox(&faces);
            let indices: Vec<usize> = faces.iter().map(|(idx, _)| *idx).collect();
            return BVHNode::leaf(bbox, indices);
        }

        // Median split along the longest axis
        let axis = Self::find_best_split_axis(&faces);
        faces.sort_by(|(_, a), (_, b)| a.center()[axis].total_cmp(&b.center()[axis]));

        let right_faces = faces.split_off(faces.len() / 2);
        let left = Box::new(Self::build_recursive(faces, depth + 1));
        let right = Box::new(Self::build_recursive(right_faces, depth + 1));
        let bbox = left.bbox.union(&right.bbox);

        BVHNode::internal(bbox, left, right)
    }

    fn find_best_split_axis(faces: &[(usize, BoundingBox)]) -> usize {
        let size = Self::compute_union_bbox(faces).size();

        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    fn compute_union_bbox(faces: &[(usize, BoundingBox)]) -> BoundingBox {
        faces
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, bbox)| acc.union(bbox))
    }

    /// Faces whose boxes intersect `bbox`
    pub fn query(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        Self::query_recursive(&self.root, bbox, &mut result);
        result
    }

    fn query_recursive(node: &BVHNode, bbox: &BoundingBox, result: &mut Vec<usize>) {
        if !node.bbox.intersects(bbox) {
            return;
        }

        if node.is_leaf() {
            result.extend_from_slice(&node.face_indices);
        } else {
            if let Some(ref left) = node.left {
                Self::query_recursive(left, bbox, result);
            }
            if let Some(ref right) = node.right {
                Self::query_recursive(right, bbox, result);
            }
        }
    }

    /// Branch-and-bound nearest search.
    ///
    /// `distance` returns the squared distance from `point` to a face together
    /// with the closest location on it, or `None` for faces that cannot be
    /// measured. Nodes farther than the best candidate (or `max_distance_sq`)
    /// are pruned. Ties keep the lowest face index.
    pub fn nearest<F>(
        &self,
        point: &Point3<f64>,
        max_distance_sq: f64,
        mut distance: F,
    ) -> Option<(usize, f64, Point3<f64>)>
    where
        F: FnMut(usize) -> Option<(f64, Point3<f64>)>,
    {
        let mut best: Option<(usize, f64, Point3<f64>)> = None;
        let mut bound = max_distance_sq;
        Self::nearest_recursive(&self.root, point, &mut bound, &mut best, &mut distance);
        best
    }

    fn nearest_recursive<F>(
        node: &BVHNode,
        point: &Point3<f64>,
        bound: &mut f64,
        best: &mut Option<(usize, f64, Point3<f64>)>,
        distance: &mut F,
    ) where
        F: FnMut(usize) -> Option<(f64, Point3<f64>)>,
    {
        if !node.bbox.is_valid() || node.bbox.distance_squared_to(point) > *bound {
            return;
        }

        if node.is_leaf() {
            for &face in &node.face_indices {
                let Some((d2, location)) = distance(face) else {
                    continue;
                };
                let better = match best {
                    Some((best_face, best_d2, _)) => {
                        d2 < *best_d2 || (d2 == *best_d2 && face < *best_face)
                    }
                    None => d2 <= *bound,
                };
                if better {
                    *bound = d2;
                    *best = Some((face, d2, location));
                }
            }
            return;
        }

        let (Some(left), Some(right)) = (node.left.as_deref(), node.right.as_deref()) else {
            return;
        };
        // Visit the nearer child first so the bound tightens early
        let (first, second) = if left.bbox.distance_squared_to(point)
            <= right.bbox.distance_squared_to(point)
        {
            (left, right)
        } else {
            (right, left)
        };
        Self::nearest_recursive(first, point, bound, best, distance);
        Self::nearest_recursive(second, point, bound, best, distance);
    }

    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}
