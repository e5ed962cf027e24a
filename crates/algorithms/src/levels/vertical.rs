//! Vertical interpolation strategies
//!
//! | method | needs |
//! |--------|-------|
//! | `Linear { sorted: true }` | level heights ascending with the level index |
//! | `Linear { sorted: false }` | two valid levels anywhere in the stack |
//! | `Spline { full: true }` | three valid levels with distinct heights |
//! | `Spline { full: false }` | two valid levels (falls back to linear) |
//! | `Trend { order }` | `order + 1` valid levels |
//! | `TrendCoefficient`, `LinearCoefficient` | coefficient grids from the pre-pass |
//!
//! Linear and local spline extrapolate beyond the outermost levels using
//! the outermost bracket.

use serde::{Deserialize, Serialize};

use super::coefficients::CoefficientGrids;
use super::stack::LevelView;
use super::{CubicSpline, FitError, PolynomialTrend, VerticalError};

/// Vertical interpolation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalMethod {
    /// Linear between the two levels bracketing `z`. With `sorted`, the
    /// stack is trusted to be ordered by height and invalid levels are not
    /// skipped.
    Linear { sorted: bool },
    /// Natural cubic spline through all valid levels (`full`) or through
    /// the up to four levels around `z`.
    Spline { full: bool },
    /// Least-squares polynomial of the given order, fitted per query
    Trend { order: usize },
    /// Least-squares polynomial of the given order, fitted once per cell of
    /// the level system
    TrendCoefficient { order: usize },
    /// Line through the levels bracketing the reference surface, fitted
    /// once per cell of the level system
    LinearCoefficient { sorted: bool },
}

impl Default for VerticalMethod {
    fn default() -> Self {
        VerticalMethod::Linear { sorted: false }
    }
}

impl VerticalMethod {
    /// Polynomial order for the polynomial methods
    pub fn order(&self) -> Option<usize> {
        match *self {
            VerticalMethod::Trend { order } | VerticalMethod::TrendCoefficient { order } => Some(order),
            _ => None,
        }
    }

    /// Whether queries read coefficient grids built by the pre-pass
    pub fn uses_coefficients(&self) -> bool {
        matches!(
            self,
            VerticalMethod::TrendCoefficient { .. } | VerticalMethod::LinearCoefficient { .. }
        )
    }
}

/// Interpolate the stack at (x, y) to height `z` with `method`.
///
/// `coefficients` must hold the pre-pass result for the coefficient
/// methods; it is ignored by the others.
pub fn evaluate(
    method: VerticalMethod,
    levels: &LevelView<'_>,
    coefficients: Option<&CoefficientGrids>,
    x: f64,
    y: f64,
    z: f64,
) -> Result<f64, VerticalError> {
    match method {
        VerticalMethod::Linear { sorted: true } => linear_sorted(levels, x, y, z),
        VerticalMethod::Linear { sorted: false } => linear(&levels.values_table(x, y), z),
        VerticalMethod::Spline { full: true } => spline_full(&levels.values_table(x, y), z),
        VerticalMethod::Spline { full: false } => spline_local(&levels.values_table(x, y), z),
        VerticalMethod::Trend { order } => trend(levels, order, x, y, z),
        VerticalMethod::TrendCoefficient { .. } | VerticalMethod::LinearCoefficient { .. } => {
            coefficients
                .ok_or(VerticalError::MissingCoefficient { index: 0 })?
                .evaluate(x, y, z, levels.horizontal())
        }
    }
}

/// Index of the upper level of the bracket around `z` among `count` levels.
///
/// The first level from 1 to `count - 2` whose height exceeds `z`, else the
/// last level. `exceeds(i)` is false for invalid levels.
fn upper_index(count: usize, mut exceeds: impl FnMut(usize) -> bool) -> usize {
    (1..count.saturating_sub(1))
        .find(|&i| exceeds(i))
        .unwrap_or(count.saturating_sub(1))
}

fn interpolate(lower: (f64, f64), upper: (f64, f64), z: f64) -> f64 {
    let (h0, v0) = lower;
    let (h1, v1) = upper;
    v0 + (z - h0) * (v1 - v0) / (h1 - h0)
}

/// Bracketing pair for `z` on a stack ordered by height
pub(crate) fn sorted_bracket(
    levels: &LevelView<'_>,
    x: f64,
    y: f64,
    z: f64,
) -> Result<((f64, f64), (f64, f64)), VerticalError> {
    let count = levels.count();
    if count < 2 {
        return Err(VerticalError::TooFewLevels { found: count, needed: 2 });
    }

    // Heights of the last two scanned levels are reused for the bracket
    let mut seen: [(usize, Option<f64>); 2] = [(usize::MAX, None); 2];
    let upper = upper_index(count, |i| {
        let h = levels.height(x, y, i);
        seen = [seen[1], (i, h)];
        h.is_some_and(|h| h > z)
    });
    let lower = upper - 1;

    let height = |level: usize| match seen.iter().find(|s| s.0 == level) {
        Some(&(_, h)) => h,
        None => levels.height(x, y, level),
    };
    let endpoint = |level: usize| {
        height(level)
            .zip(levels.variable(x, y, level))
            .ok_or(VerticalError::InvalidSample { level })
    };
    let p0 = endpoint(lower)?;
    let p1 = endpoint(upper)?;

    if !(p0.0 < p1.0) {
        return Err(VerticalError::DegenerateBracket { lower, upper });
    }
    Ok((p0, p1))
}

/// Bracketing pair for `z` in a values table sorted by height
pub(crate) fn table_bracket(
    table: &[(f64, f64)],
    z: f64,
) -> Result<((f64, f64), (f64, f64)), VerticalError> {
    let upper = bracket_index(table, z)?;
    let lower = upper - 1;
    let (p0, p1) = (table[lower], table[upper]);

    if !(p0.0 < p1.0) {
        return Err(VerticalError::DegenerateBracket { lower, upper });
    }
    Ok((p0, p1))
}

fn bracket_index(table: &[(f64, f64)], z: f64) -> Result<usize, VerticalError> {
    if table.len() < 2 {
        return Err(VerticalError::TooFewLevels {
            found: table.len(),
            needed: 2,
        });
    }
    Ok(upper_index(table.len(), |i| table[i].0 > z))
}

fn linear_sorted(levels: &LevelView<'_>, x: f64, y: f64, z: f64) -> Result<f64, VerticalError> {
    let (p0, p1) = sorted_bracket(levels, x, y, z)?;
    Ok(interpolate(p0, p1, z))
}

fn linear(table: &[(f64, f64)], z: f64) -> Result<f64, VerticalError> {
    let (p0, p1) = table_bracket(table, z)?;
    Ok(interpolate(p0, p1, z))
}

fn spline_full(table: &[(f64, f64)], z: f64) -> Result<f64, VerticalError> {
    let mut spline = CubicSpline::with_capacity(table.len());
    for &(h, v) in table {
        spline.add_point(h, v);
    }
    Ok(spline.evaluate(z)?)
}

fn spline_local(table: &[(f64, f64)], z: f64) -> Result<f64, VerticalError> {
    if table.len() < 3 {
        return linear(table, z);
    }

    let mut i = bracket_index(table, z)?;
    if i == table.len() - 1 {
        i -= 1;
    }

    let first = if i > 1 { i - 2 } else { i - 1 };
    let mut spline = CubicSpline::with_capacity(4);
    for &(h, v) in &table[first..=i + 1] {
        spline.add_point(h, v);
    }
    Ok(spline.evaluate(z)?)
}

fn trend(levels: &LevelView<'_>, order: usize, x: f64, y: f64, z: f64) -> Result<f64, VerticalError> {
    let mut fit = PolynomialTrend::new(order);
    for level in 0..levels.count() {
        if let Some((h, v)) = levels.sample(x, y, level) {
            fit.add_sample(h, v);
        }
    }
    fit.solve()?;
    fit.evaluate(z).ok_or(VerticalError::Fit(FitError::Singular))
}
