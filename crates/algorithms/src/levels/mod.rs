//! Multi-level vertical interpolation
//!
//! A stack of leveled grids (one variable grid per level, heights from a
//! table or from per-level height grids) is interpolated to a target height
//! `z` at any horizontal position `(x, y)`:
//!
//! 1. each level is resampled horizontally at `(x, y)`,
//! 2. the resulting (height, value) pairs are interpolated vertically at `z`
//!    with the selected [`VerticalMethod`].
//!
//! [`LevelInterpolator::initialize`] validates the stack and precomputes
//! whatever the method needs; the returned [`LevelInterpolation`] answers
//! queries. Two drivers evaluate it over a surface raster
//! ([`levels_to_surface`]) or over point features ([`levels_to_points`]).

mod coefficients;
mod monitor;
mod points;
mod polynomial;
mod spline;
mod stack;
mod state;
mod surface;
mod vertical;

pub use coefficients::CoefficientGrids;
pub use monitor::{NoMonitor, RowMonitor};
pub use points::{levels_to_points, levels_to_points_in_place, LevelsToPoints, PointsParams};
pub use polynomial::PolynomialTrend;
pub use spline::CubicSpline;
pub use stack::{GridHandle, LevelHeights, LevelStack, LevelView};
pub use state::{LevelInterpolation, LevelInterpolationParams, LevelInterpolator};
pub use surface::{levels_to_surface, levels_to_surface_into, LevelsToSurface};
pub use vertical::{evaluate, VerticalMethod};

use thiserror::Error;

/// Failure of a curve fit through (height, value) pairs
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    #[error("Too few samples: {samples}, at least {needed} required")]
    TooFewSamples { samples: usize, needed: usize },

    #[error("Polynomial order must be at least 1")]
    InvalidOrder,

    #[error("Singular normal equations")]
    Singular,

    #[error("Duplicate knot abscissae")]
    DuplicateKnots,
}

/// Why a single vertical query produced no value.
///
/// Never fatal: drivers write no-data for the affected cell or point.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalError {
    #[error("Too few valid levels: {found}, at least {needed} required")]
    TooFewLevels { found: usize, needed: usize },

    #[error("No valid sample at level {level}")]
    InvalidSample { level: usize },

    #[error("Degenerate bracket between levels {lower} and {upper}")]
    DegenerateBracket { lower: usize, upper: usize },

    #[error("Fit failed: {0}")]
    Fit(#[from] FitError),

    #[error("No valid coefficient {index}")]
    MissingCoefficient { index: usize },
}
