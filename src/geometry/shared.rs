// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Borrowed-or-owned mesh handle with copy-on-write mutation

use super::IndexedMesh;
use crate::error::{MeshError, Result};
use std::borrow::Cow;
use std::ops::Deref;
use tracing::trace;

/// A mesh that is either borrowed from its owner (a document or a parent
/// brep face) or owned outright.
///
/// Reads go straight to the underlying mesh. Writing requires
/// [`SharedMesh::make_owned`], which copies a borrowed mesh once and
/// detaches it from the owner.
#[derive(Debug, Clone)]
pub struct SharedMesh<'a> {
    mesh: Cow<'a, IndexedMesh>,
}

impl<'a> SharedMesh<'a> {
    pub fn borrowed(mesh: &'a IndexedMesh) -> Self {
        Self {
            mesh: Cow::Borrowed(mesh),
        }
    }

    pub fn owned(mesh: IndexedMesh) -> Self {
        Self {
            mesh: Cow::Owned(mesh),
        }
    }

    /// True while the mesh is still a view of geometry owned elsewhere.
    pub fn is_document_controlled(&self) -> bool {
        matches!(self.mesh, Cow::Borrowed(_))
    }

    /// Mutable access, copying a borrowed mesh first.
    pub fn make_owned(&mut self) -> &mut IndexedMesh {
        if self.is_document_controlled() {
            trace!(vertices = self.mesh.vertex_count(), "copying borrowed mesh for write");
        }
        self.mesh.to_mut()
    }

    pub fn into_owned(self) -> IndexedMesh {
        self.mesh.into_owned()
    }

    /// Hide a vertex, copying only when its state actually changes.
    pub fn hide_vertex(&mut self, index: usize) -> Result<()> {
        self.set_hidden(index, true)
    }

    /// Show a vertex, copying only when its state actually changes.
    pub fn show_vertex(&mut self, index: usize) -> Result<()> {
        self.set_hidden(index, false)
    }

    pub fn hide_all_vertices(&mut self) {
        let vertices = self.mesh.vertices();
        if vertices.hidden_count() == vertices.count() {
            return;
        }
        self.make_owned().vertices_mut().hide_all();
    }

    pub fn show_all_vertices(&mut self) {
        if self.mesh.vertices().hidden_count() == 0 {
            return;
        }
        self.make_owned().vertices_mut().show_all();
    }

    /// Unify face orientation. A borrowed mesh is left untouched when no
    /// face needs reversing.
    pub fn unify_normals(&mut self) -> usize {
        if !self.is_document_controlled() {
            return self.make_owned().unify_normals();
        }
        let mut copy = self.mesh.duplicate();
        let reversed = copy.unify_normals();
        if reversed > 0 {
            self.mesh = Cow::Owned(copy);
        }
        reversed
    }

    fn set_hidden(&mut self, index: usize, hidden: bool) -> Result<()> {
        let vertices = self.mesh.vertices();
        if index >= vertices.count() {
            return Err(MeshError::out_of_range(index, vertices.count()));
        }
        if vertices.is_hidden(index) == hidden {
            return Ok(());
        }
        let mut vertices = self.make_owned().vertices_mut();
        if hidden {
            vertices.hide(index)
        } else {
            vertices.show(index)
        }
    }
}

impl Deref for SharedMesh<'_> {
    type Target = IndexedMesh;

    fn deref(&self) -> &IndexedMesh {
        &self.mesh
    }
}

impl From<IndexedMesh> for SharedMesh<'_> {
    fn from(mesh: IndexedMesh) -> Self {
        Self::owned(mesh)
    }
}

impl<'a> From<&'a IndexedMesh> for SharedMesh<'a> {
    fn from(mesh: &'a IndexedMesh) -> Self {
        Self::borrowed(mesh)
    }
}
