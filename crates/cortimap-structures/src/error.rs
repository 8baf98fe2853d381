use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for cortimap data structures.
///
/// Provides structured error handling for construction and validation of
/// shapes, meshes and sparse operators.
///
/// # Examples
/// ```
/// use cortimap_structures::CortimapDataError;
///
/// fn validate_count(count: usize) -> Result<(), CortimapDataError> {
///     if count == 0 {
///         return Err(CortimapDataError::BadParameters("Count must be > 0".into()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_count(0).is_err());
/// assert!(validate_count(5).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CortimapDataError {
    /// Invalid parameters provided to a function
    BadParameters(String),
    /// Array or matrix dimensions do not agree
    DimensionMismatch(String),
    /// Sparse matrix storage is structurally invalid
    InvalidSparseStructure(String),
    /// Mesh topology refers to points that do not exist
    InvalidMesh(String),
}

impl Display for CortimapDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CortimapDataError::BadParameters(msg) => write!(f, "Bad Parameters: {}", msg),
            CortimapDataError::DimensionMismatch(msg) => {
                write!(f, "Dimension Mismatch: {}", msg)
            }
            CortimapDataError::InvalidSparseStructure(msg) => {
                write!(f, "Invalid Sparse Structure: {}", msg)
            }
            CortimapDataError::InvalidMesh(msg) => write!(f, "Invalid Mesh: {}", msg),
        }
    }
}
impl Error for CortimapDataError {}
