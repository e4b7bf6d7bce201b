// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh access and construction

use thiserror::Error;

/// Errors raised by the mesh library.
///
/// Geometry algorithms that simply fail to produce a result (closest point,
/// normal computation, boolean operations) report that through `Option` or
/// `bool` returns instead; this enum is reserved for programmer errors and
/// malformed input.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A list accessor was called with an index outside `[0, count)`.
    #[error("index {index} is out of range (count = {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// A construction routine rejected its arguments before doing any work.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MeshError {
    pub(crate) fn out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_message() {
        let err = MeshError::out_of_range(7, 3);
        assert_eq!(err.to_string(), "index 7 is out of range (count = 3)");
    }

    #[test]
    fn test_invalid_message() {
        let err = MeshError::invalid("xCount must be positive");
        assert!(err.to_string().contains("xCount"));
    }
}
