//! Error types for GridLevels

use thiserror::Error;

/// Main error type for GridLevels operations.
///
/// Every variant is fatal for the run that produced it. Failures that only
/// affect a single cell or query are reported separately and never surface
/// through this type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Grid geometry mismatch: {what}")]
    GeometryMismatch { what: String },

    #[error("No variable levels provided")]
    NoLevels,

    #[error("Variable and height levels have to be of same number ({variables} variables, {heights} heights)")]
    LevelCountMismatch { variables: usize, heights: usize },

    #[error("Fitting a polynomial of order {order} needs more than {order} levels, got {levels}")]
    InsufficientLevels { levels: usize, order: usize },

    #[error("Target area is disjoint from the levels area")]
    DisjointExtent,

    #[error("Missing reference surface: {0}")]
    MissingReference(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Run cancelled at row {row} of {rows}")]
    Cancelled { row: usize, rows: usize },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for GridLevels operations
pub type Result<T> = std::result::Result<T, Error>;
