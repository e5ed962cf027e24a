//! Per-cell polynomial coefficients precomputed over the level system
//!
//! The coefficient methods fit their vertical polynomial once for every cell
//! center of the level system and store coefficient `k` in grid `k`. Queries
//! resample these grids horizontally and evaluate
//!
//! ```text
//! value = c0(x,y) + c1(x,y)·z + ... + cn(x,y)·zⁿ
//! ```

use gridlevels_core::raster::{Raster, ResamplingMethod};
use gridlevels_core::{Error, Result};
use ndarray::Array2;
use tracing::debug;

use super::monitor::{collect_rows, RowMonitor};
use super::stack::LevelView;
use super::vertical::{sorted_bracket, table_bracket};
use super::{PolynomialTrend, VerticalError};

/// Coefficient grids of a pre-fitted polynomial, ascending powers
#[derive(Debug, Clone)]
pub struct CoefficientGrids {
    grids: Vec<Raster<f64>>,
}

impl CoefficientGrids {
    /// Fit a polynomial trend of `order` through the valid levels of every
    /// level-system cell. Cells where the fit fails hold no-data.
    pub fn fit_trend(levels: &LevelView<'_>, order: usize, monitor: &dyn RowMonitor) -> Result<Self> {
        Self::fit_cells(levels, order + 1, monitor, "trend", |x, y| {
            let mut trend = PolynomialTrend::new(order);
            for level in 0..levels.count() {
                if let Some((h, v)) = levels.sample(x, y, level) {
                    trend.add_sample(h, v);
                }
            }
            trend.solve().ok()?;
            Some(trend.coefficients().to_vec())
        })
    }

    /// Store, for every level-system cell, the line through the two levels
    /// bracketing the height of `reference` at that cell.
    pub fn fit_linear(
        levels: &LevelView<'_>,
        reference: &Raster<f64>,
        sorted: bool,
        monitor: &dyn RowMonitor,
    ) -> Result<Self> {
        let horizontal = levels.horizontal();
        Self::fit_cells(levels, 2, monitor, "linear", |x, y| {
            let z = reference.sample(x, y, horizontal)?;
            let ((h0, v0), (h1, v1)) = if sorted {
                sorted_bracket(levels, x, y, z).ok()?
            } else {
                table_bracket(&levels.values_table(x, y), z).ok()?
            };
            let slope = (v1 - v0) / (h1 - h0);
            Some(vec![v0 - slope * h0, slope])
        })
    }

    fn fit_cells<F>(
        levels: &LevelView<'_>,
        count: usize,
        monitor: &dyn RowMonitor,
        kind: &str,
        fit_cell: F,
    ) -> Result<Self>
    where
        F: Fn(f64, f64) -> Option<Vec<f64>> + Sync + Send,
    {
        let system = levels.system().ok_or(Error::NoLevels)?;
        let (rows, cols) = system.shape();

        let cells: Vec<Option<Vec<f64>>> = collect_rows(rows, monitor, |row| {
            (0..cols)
                .map(|col| {
                    let (x, y) = system.pixel_to_geo(col, row);
                    fit_cell(x, y)
                })
                .collect()
        })?;

        let fitted = cells.iter().filter(|c| c.is_some()).count();
        debug!(
            "{} coefficient pre-pass: {} cells fitted, {} failed",
            kind,
            fitted,
            cells.len() - fitted
        );

        let mut grids = Vec::with_capacity(count);
        for k in 0..count {
            let data: Vec<f64> = cells
                .iter()
                .map(|c| c.as_ref().map_or(f64::NAN, |c| c[k]))
                .collect();

            let mut grid = system.with_same_meta::<f64>();
            grid.set_nodata(Some(f64::NAN));
            *grid.data_mut() = Array2::from_shape_vec((rows, cols), data)
                .map_err(|e| Error::Other(e.to_string()))?;
            grids.push(grid);
        }

        Ok(Self { grids })
    }

    /// Polynomial order (number of grids minus one)
    pub fn order(&self) -> usize {
        self.grids.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Grid of coefficient `k`
    pub fn grid(&self, k: usize) -> Option<&Raster<f64>> {
        self.grids.get(k)
    }

    /// Evaluate the cached polynomial at (x, y) for height `z`
    pub fn evaluate(
        &self,
        x: f64,
        y: f64,
        z: f64,
        horizontal: ResamplingMethod,
    ) -> std::result::Result<f64, VerticalError> {
        if self.grids.is_empty() {
            return Err(VerticalError::MissingCoefficient { index: 0 });
        }

        let mut value = 0.0;
        let mut z_power = 1.0;
        for (index, grid) in self.grids.iter().enumerate() {
            let c = grid
                .sample(x, y, horizontal)
                .ok_or(VerticalError::MissingCoefficient { index })?;
            value += c * z_power;
            z_power *= z;
        }
        Ok(value)
    }
}
