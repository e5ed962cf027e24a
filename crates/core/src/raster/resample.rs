//! Horizontal resampling of a raster at arbitrary positions
//!
//! All kernels work on fractional grid coordinates relative to cell
//! centers: for a position between the centers of cells `ix` and `ix + 1`
//! the offset `dx` lies in `[0, 1)`.
//!
//! - Nearest neighbour: value of the closest cell
//! - Bilinear: weighted mean of the 4 surrounding cells, weights
//!   renormalized over the cells holding data
//! - Bicubic spline: cubic convolution over a 4×4 kernel
//! - B-spline: uniform cubic B-spline smoothing over a 4×4 kernel
//!
//! The 4×4 kernels guess missing cells from their valid neighbours before
//! interpolating, so a single no-data cell near the position does not
//! invalidate the sample.

use serde::{Deserialize, Serialize};

use super::{Raster, RasterElement};

/// Horizontal interpolation method used when sampling a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResamplingMethod {
    NearestNeighbour,
    Bilinear,
    BicubicSpline,
    #[default]
    BSpline,
}

type Kernel = [[f64; 4]; 4];

impl ResamplingMethod {
    /// Sample `raster` at geographic position (x, y).
    ///
    /// `None` when the position is outside the raster extent, when the cell
    /// nearest to the position holds no data, or when the kernel of the
    /// method cannot be completed.
    pub fn sample<T: RasterElement>(self, raster: &Raster<T>, x: f64, y: f64) -> Option<f64> {
        if !raster.extent().contains(x, y) {
            return None;
        }

        let (col, row) = raster.geo_to_pixel(x, y);
        if !col.is_finite() || !row.is_finite() {
            return None;
        }

        let gx = col - 0.5;
        let gy = row - 0.5;
        let ix = gx.floor();
        let iy = gy.floor();
        let dx = gx - ix;
        let dy = gy - iy;
        let (ix, iy) = (ix as isize, iy as isize);

        let nearest_col = ix + (0.5 + dx) as isize;
        let nearest_row = iy + (0.5 + dy) as isize;
        let nearest = raster.valid_value(nearest_row, nearest_col)?;

        match self {
            ResamplingMethod::NearestNeighbour => Some(nearest),
            ResamplingMethod::Bilinear => bilinear(raster, ix, iy, dx, dy),
            ResamplingMethod::BicubicSpline => {
                fill_kernel(raster, ix, iy).map(|k| bicubic_spline(&k, dx, dy))
            }
            ResamplingMethod::BSpline => fill_kernel(raster, ix, iy).map(|k| b_spline(&k, dx, dy)),
        }
    }
}

fn bilinear<T: RasterElement>(raster: &Raster<T>, ix: isize, iy: isize, dx: f64, dy: f64) -> Option<f64> {
    let corners = [
        (iy, ix, (1.0 - dx) * (1.0 - dy)),
        (iy, ix + 1, dx * (1.0 - dy)),
        (iy + 1, ix, (1.0 - dx) * dy),
        (iy + 1, ix + 1, dx * dy),
    ];

    let mut z = 0.0;
    let mut n = 0.0;
    for (row, col, w) in corners {
        if let Some(v) = raster.valid_value(row, col) {
            z += w * v;
            n += w;
        }
    }

    if n > 0.0 {
        Some(z / n)
    } else {
        None
    }
}

/// Collect the 4×4 cells around (ix, iy), indexed `[kx][ky]`.
///
/// Missing cells are estimated as the mean of their valid 3×3 neighbours,
/// repeated until every cell is filled or 16 passes have run.
fn fill_kernel<T: RasterElement>(raster: &Raster<T>, ix: isize, iy: isize) -> Option<Kernel> {
    let cell = |kx: isize, ky: isize| raster.valid_value(iy - 1 + ky, ix - 1 + kx);

    let mut kernel = [[None; 4]; 4];
    let mut missing = 0;
    for (kx, column) in kernel.iter_mut().enumerate() {
        for (ky, slot) in column.iter_mut().enumerate() {
            *slot = cell(kx as isize, ky as isize);
            if slot.is_none() {
                missing += 1;
            }
        }
    }

    let mut pass = 0;
    while missing > 0 && missing < 16 && pass < 16 {
        let previous = kernel;

        for kx in 0..4_isize {
            for ky in 0..4_isize {
                if previous[kx as usize][ky as usize].is_some() {
                    continue;
                }

                let mut sum = 0.0;
                let mut n = 0;
                for jx in (kx - 1)..=(kx + 1) {
                    for jy in (ky - 1)..=(ky + 1) {
                        let known = cell(jx, jy).or_else(|| {
                            let inside = (0..4).contains(&jx) && (0..4).contains(&jy);
                            if inside {
                                previous[jx as usize][jy as usize]
                            } else {
                                None
                            }
                        });
                        if let Some(v) = known {
                            sum += v;
                            n += 1;
                        }
                    }
                }

                if n > 0 {
                    kernel[kx as usize][ky as usize] = Some(sum / n as f64);
                    missing -= 1;
                }
            }
        }

        pass += 1;
    }

    if missing > 0 {
        return None;
    }

    let mut filled = [[0.0; 4]; 4];
    for kx in 0..4 {
        for ky in 0..4 {
            filled[kx][ky] = kernel[kx][ky]?;
        }
    }
    Some(filled)
}

#[inline]
fn cubic_convolution(d: f64, v: &[f64; 4]) -> f64 {
    v[1] + 0.5
        * d
        * (v[2] - v[0]
            + d * (2.0 * v[0] - 5.0 * v[1] + 4.0 * v[2] - v[3]
                + d * (3.0 * (v[1] - v[2]) + v[3] - v[0])))
}

fn bicubic_spline(kernel: &Kernel, dx: f64, dy: f64) -> f64 {
    let mut along_x = [0.0; 4];
    for (kx, column) in kernel.iter().enumerate() {
        along_x[kx] = cubic_convolution(dy, column);
    }
    cubic_convolution(dx, &along_x)
}

/// Uniform cubic B-spline basis weights for offset `d` in [0, 1)
fn b_spline_weights(d: f64) -> [f64; 4] {
    let mut weights = [0.0; 4];
    for (i, w) in weights.iter_mut().enumerate() {
        let i = i as f64;
        let mut s = 0.0;
        for (shift, factor) in [(1.0, 1.0), (0.0, -4.0), (-1.0, 6.0), (-2.0, -4.0)] {
            let t = i - d + shift;
            if t > 0.0 {
                s += factor * t * t * t;
            }
        }
        *w = s / 6.0;
    }
    weights
}

fn b_spline(kernel: &Kernel, dx: f64, dy: f64) -> f64 {
    let rx = b_spline_weights(dx);
    let ry = b_spline_weights(dy);

    let mut z = 0.0;
    for ky in 0..4 {
        for kx in 0..4 {
            z += kernel[kx][ky] * rx[kx] * ry[ky];
        }
    }
    z
}
