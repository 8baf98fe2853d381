// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

use cortimap_projection::ProjectionError;
use cortimap_serialization::CacheError;
use cortimap_structures::CortimapDataError;

/// Result type for mapper operations
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors raised while building, loading or applying a mapper
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    #[error("Unknown projection kind: {0}")]
    UnknownProjection(String),

    #[error("Invalid kernel parameter: {0}")]
    InvalidKernelParameter(String),

    #[error("Data size invalid: {0}")]
    ShapeMismatch(String),

    #[error("Vertex index {index} out of range for {limit} vertices")]
    VertexIndexOutOfRange { index: f64, limit: usize },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Subject database error: {0}")]
    Database(String),

    #[error(transparent)]
    Structure(#[from] CortimapDataError),

    #[error("Projection error: {0}")]
    Projection(ProjectionError),
}

impl From<ProjectionError> for MapperError {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::UnknownKind(name) => MapperError::UnknownProjection(name),
            err @ (ProjectionError::UnexpectedParameter { .. }
            | ProjectionError::InvalidParameter { .. }) => {
                MapperError::InvalidKernelParameter(err.to_string())
            }
            other => MapperError::Projection(other),
        }
    }
}

impl From<serde_json::Error> for MapperError {
    fn from(err: serde_json::Error) -> Self {
        MapperError::Database(err.to_string())
    }
}

impl From<ndarray::ShapeError> for MapperError {
    fn from(err: ndarray::ShapeError) -> Self {
        MapperError::ShapeMismatch(err.to_string())
    }
}
