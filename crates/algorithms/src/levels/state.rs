//! Run lifecycle: initialize, query, finalize

use gridlevels_core::raster::{Extent, Raster, ResamplingMethod};
use gridlevels_core::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::coefficients::CoefficientGrids;
use super::monitor::{collect_rows, NoMonitor, RowMonitor};
use super::stack::{GridHandle, HeightSource, LevelHeights, LevelStack, LevelView};
use super::vertical::{evaluate, VerticalMethod};
use super::VerticalError;

/// Parameters of a level interpolation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelInterpolationParams {
    /// Resampling inside each level grid (default: B-spline)
    pub horizontal: ResamplingMethod,
    /// Interpolation across levels (default: generic linear)
    pub vertical: VerticalMethod,
}

/// Configured interpolation over a borrowed level stack.
///
/// Nothing is computed until [`LevelInterpolator::initialize`], which
/// validates the configuration and returns the state answering queries.
pub struct LevelInterpolator<'a> {
    levels: &'a LevelStack<'a>,
    params: LevelInterpolationParams,
    monitor: &'a dyn RowMonitor,
}

impl<'a> LevelInterpolator<'a> {
    pub fn new(levels: &'a LevelStack<'a>, params: LevelInterpolationParams) -> Self {
        Self {
            levels,
            params,
            monitor: &NoMonitor,
        }
    }

    /// Report row progress of pre-passes and drivers to `monitor`
    pub fn with_monitor(mut self, monitor: &'a dyn RowMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn levels(&self) -> &'a LevelStack<'a> {
        self.levels
    }

    pub fn params(&self) -> LevelInterpolationParams {
        self.params
    }

    pub fn monitor(&self) -> &'a dyn RowMonitor {
        self.monitor
    }

    /// Check the configuration against a target area without allocating
    pub fn validate(&self, target: &Extent, reference: Option<&Raster<f64>>) -> Result<()> {
        self.levels.validate()?;

        let count = self.levels.level_count();
        if let Some(order) = self.params.vertical.order() {
            if order < 1 {
                return Err(Error::InvalidParameter {
                    name: "order",
                    value: order.to_string(),
                    reason: "polynomial order must be at least 1".into(),
                });
            }
            if count <= order {
                return Err(Error::InsufficientLevels { levels: count, order });
            }
        }

        let extent = self.levels.extent().ok_or(Error::NoLevels)?;
        if !extent.intersects(target) {
            return Err(Error::DisjointExtent);
        }

        if let VerticalMethod::LinearCoefficient { .. } = self.params.vertical {
            if reference.is_none() {
                return Err(Error::MissingReference(
                    "linear coefficients are fitted at the height of a target surface".into(),
                ));
            }
        }

        Ok(())
    }

    /// Validate and prepare a run over `target`.
    ///
    /// With height grids and a minimum height grid, masked copies of the
    /// height grids are built. The coefficient methods run their pre-pass;
    /// `LinearCoefficient` samples `reference` for the height of each cell.
    pub fn initialize(&self, target: &Extent, reference: Option<&Raster<f64>>) -> Result<LevelInterpolation<'a>> {
        self.validate(target, reference)?;

        let levels = self.levels;
        let heights = match levels.heights() {
            LevelHeights::Table(table) => RunHeights::Table(table),
            LevelHeights::Grids { grids, minimum: None } => RunHeights::Grids {
                handles: grids.iter().map(|&g| GridHandle::Borrowed(g)).collect(),
                owned: Vec::new(),
            },
            LevelHeights::Grids {
                grids,
                minimum: Some(minimum),
            } => {
                let owned = grids
                    .iter()
                    .map(|grid| mask_below(grid, minimum, self.monitor))
                    .collect::<Result<Vec<_>>>()?;
                RunHeights::Grids {
                    handles: (0..owned.len()).map(GridHandle::Owned).collect(),
                    owned,
                }
            }
        };

        let mut state = LevelInterpolation {
            params: self.params,
            variables: levels.variables(),
            heights,
            coefficients: None,
            finalized: false,
        };

        let coefficients = match (self.params.vertical, reference) {
            (VerticalMethod::TrendCoefficient { order }, _) => {
                Some(CoefficientGrids::fit_trend(&state.view(), order, self.monitor)?)
            }
            (VerticalMethod::LinearCoefficient { sorted }, Some(reference)) => Some(
                CoefficientGrids::fit_linear(&state.view(), reference, sorted, self.monitor)?,
            ),
            _ => None,
        };
        state.coefficients = coefficients;

        if let Some(system) = levels.system() {
            debug!(
                "initialized {} levels on a {}x{} level system ({:?}, {:?}, {} masked height grids)",
                levels.level_count(),
                system.cols(),
                system.rows(),
                self.params.horizontal,
                self.params.vertical,
                state.owned_height_count()
            );
        }

        Ok(state)
    }
}

#[derive(Debug)]
enum RunHeights<'a> {
    Table(&'a [f64]),
    Grids {
        handles: Vec<GridHandle<'a>>,
        owned: Vec<Raster<f64>>,
    },
}

/// State of an initialized run.
///
/// Queries take `&self` and may run concurrently. [`finalize`] releases the
/// masked height grids and coefficient grids owned by the run; afterwards
/// queries that depended on them fail.
///
/// [`finalize`]: LevelInterpolation::finalize
#[derive(Debug)]
pub struct LevelInterpolation<'a> {
    params: LevelInterpolationParams,
    variables: &'a [&'a Raster<f64>],
    heights: RunHeights<'a>,
    coefficients: Option<CoefficientGrids>,
    finalized: bool,
}

impl<'a> LevelInterpolation<'a> {
    pub fn params(&self) -> LevelInterpolationParams {
        self.params
    }

    /// Levels as resolved for this run
    pub fn view(&self) -> LevelView<'_> {
        let heights = match &self.heights {
            RunHeights::Table(table) => HeightSource::Table(table),
            RunHeights::Grids { handles, owned } => HeightSource::Grids { handles, owned },
        };
        LevelView::new(self.variables, heights, self.params.horizontal)
    }

    pub fn coefficients(&self) -> Option<&CoefficientGrids> {
        self.coefficients.as_ref()
    }

    /// Interpolated value at (x, y) for height `z`, `None` when the levels
    /// at that position do not allow it
    pub fn get_value(&self, x: f64, y: f64, z: f64) -> Option<f64> {
        self.try_value(x, y, z).ok()
    }

    /// Like [`get_value`](Self::get_value), reporting why a query failed
    pub fn try_value(&self, x: f64, y: f64, z: f64) -> std::result::Result<f64, VerticalError> {
        evaluate(
            self.params.vertical,
            &self.view(),
            self.coefficients.as_ref(),
            x,
            y,
            z,
        )
    }

    /// Release all grids owned by the run. Calling it again does nothing.
    pub fn finalize(&mut self) {
        if let RunHeights::Grids { owned, .. } = &mut self.heights {
            *owned = Vec::new();
        }
        self.coefficients = None;

        if !self.finalized {
            debug!("finalized level interpolation");
            self.finalized = true;
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of masked height grids owned by the run
    pub fn owned_height_count(&self) -> usize {
        match &self.heights {
            RunHeights::Table(_) => 0,
            RunHeights::Grids { owned, .. } => owned.len(),
        }
    }

    /// Number of grids owned by the run (masked heights and coefficients)
    pub fn owned_grid_count(&self) -> usize {
        self.owned_height_count() + self.coefficients.as_ref().map_or(0, CoefficientGrids::len)
    }
}

/// Copy of `heights` with cells below `minimum` set to no-data.
///
/// Cells where the minimum itself is no-data are kept.
fn mask_below(heights: &Raster<f64>, minimum: &Raster<f64>, monitor: &dyn RowMonitor) -> Result<Raster<f64>> {
    let (rows, cols) = heights.shape();

    let data: Vec<f64> = collect_rows(rows, monitor, |row| {
        (0..cols)
            .map(|col| {
                let (r, c) = (row as isize, col as isize);
                match (heights.valid_value(r, c), minimum.valid_value(r, c)) {
                    (Some(h), Some(min)) if h < min => f64::NAN,
                    (Some(h), _) => h,
                    (None, _) => f64::NAN,
                }
            })
            .collect()
    })?;

    let mut masked = heights.with_same_meta::<f64>();
    masked.set_nodata(Some(f64::NAN));
    *masked.data_mut() = Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| Error::Other(e.to_string()))?;
    Ok(masked)
}
