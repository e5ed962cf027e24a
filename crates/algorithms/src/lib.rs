//! # GridLevels Algorithms
//!
//! Vertical interpolation of leveled grids for GridLevels.
//!
//! ## Available Tools
//!
//! - **levels to surface**: interpolate a level stack to the heights of a surface raster
//! - **levels to points**: interpolate a level stack to the heights of point features
//!
//! Both tools share [`levels::LevelInterpolator`], which can also be used
//! directly to query arbitrary (x, y, z) positions.

pub mod levels;
pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::levels::{
        evaluate, levels_to_points, levels_to_points_in_place, levels_to_surface,
        levels_to_surface_into, CoefficientGrids, CubicSpline, FitError, LevelHeights,
        LevelInterpolation, LevelInterpolationParams, LevelInterpolator, LevelStack,
        LevelsToPoints, LevelsToSurface, NoMonitor, PointsParams, PolynomialTrend, RowMonitor,
        VerticalError, VerticalMethod,
    };
    pub use gridlevels_core::prelude::*;
}
