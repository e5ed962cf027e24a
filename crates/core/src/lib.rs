//! # GridLevels Core
//!
//! Core types and traits shared by the GridLevels tools.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid with no-data handling
//! - `GeoTransform` and `Extent`: Georeferencing and bounding boxes
//! - `ResamplingMethod`: Horizontal resampling of a raster at any (x, y)
//! - Point features with attributes for point-based tools
//! - The `Algorithm` trait every tool implements

pub mod error;
pub mod raster;
pub mod vector;

pub use error::{Error, Result};
pub use raster::{Extent, GeoTransform, Raster, RasterElement, ResamplingMethod};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{Extent, GeoTransform, Raster, RasterElement, ResamplingMethod};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
    pub use crate::Algorithm;
}

/// Core trait for all tools in GridLevels.
///
/// A tool is executed once per call: it receives its input data and its
/// already validated parameters, and either produces its output or fails
/// with a descriptive error.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
