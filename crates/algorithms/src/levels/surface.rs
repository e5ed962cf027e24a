//! Levels to surface
//!
//! Interpolates a level stack to the heights given by the cells of a
//! surface raster, e.g. air temperature of pressure levels at the elevation
//! of a DEM.

use std::marker::PhantomData;

use gridlevels_core::raster::Raster;
use gridlevels_core::{Algorithm, Error, Result};
use ndarray::Array2;
use tracing::info;

use super::monitor::collect_rows;
use super::stack::LevelStack;
use super::state::{LevelInterpolationParams, LevelInterpolator};

/// Levels to surface tool
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelsToSurface<'a>(PhantomData<&'a ()>);

impl<'a> LevelsToSurface<'a> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'a> Algorithm for LevelsToSurface<'a> {
    type Input = (&'a LevelStack<'a>, &'a Raster<f64>);
    type Output = Raster<f64>;
    type Params = LevelInterpolationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Levels to Surface"
    }

    fn description(&self) -> &'static str {
        "Interpolate a stack of leveled grids to the heights of a surface raster"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (levels, surface) = input;
        levels_to_surface(levels, surface, params)
    }
}

/// Interpolate `levels` to the height of every cell of `surface`.
///
/// The result shares the surface geometry. Cells where the surface holds
/// no data, or where the levels do not allow an interpolation, are NaN.
pub fn levels_to_surface(
    levels: &LevelStack<'_>,
    surface: &Raster<f64>,
    params: LevelInterpolationParams,
) -> Result<Raster<f64>> {
    let interpolator = LevelInterpolator::new(levels, params);
    let mut result = surface.with_same_meta::<f64>();
    levels_to_surface_into(&interpolator, surface, &mut result)?;
    Ok(result)
}

/// Like [`levels_to_surface`], writing into an existing `result` raster
/// that must share the surface geometry.
///
/// On error `result` is left untouched.
pub fn levels_to_surface_into(
    interpolator: &LevelInterpolator<'_>,
    surface: &Raster<f64>,
    result: &mut Raster<f64>,
) -> Result<()> {
    if !result.same_geometry(surface) {
        return Err(Error::GeometryMismatch {
            what: "result raster differs from the surface".into(),
        });
    }

    let mut state = interpolator.initialize(&surface.extent(), Some(surface))?;
    let (rows, cols) = surface.shape();

    let values: Vec<f64> = collect_rows(rows, interpolator.monitor(), |row| {
        (0..cols)
            .map(|col| {
                let z = surface.valid_value(row as isize, col as isize)?;
                let (x, y) = surface.pixel_to_geo(col, row);
                state.get_value(x, y, z)
            })
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    })?;

    state.finalize();

    let valid = values.iter().filter(|v| !v.is_nan()).count();
    *result.data_mut() = Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| Error::Other(e.to_string()))?;
    result.set_nodata(Some(f64::NAN));

    info!(
        "levels to surface: {} of {} cells interpolated",
        valid,
        rows * cols
    );
    Ok(())
}
