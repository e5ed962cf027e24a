//! Natural cubic spline through a set of knots

use super::FitError;

/// Natural cubic spline (zero second derivative at both ends).
///
/// Knots may be added in any order; they are sorted by abscissa when the
/// spline is fitted. Outside the knot range the boundary cubic is extended.
#[derive(Debug, Clone, Default)]
pub struct CubicSpline {
    points: Vec<(f64, f64)>,
    second_derivatives: Vec<f64>,
    fitted: bool,
}

impl CubicSpline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            second_derivatives: Vec::with_capacity(capacity),
            fitted: false,
        }
    }

    pub fn add_point(&mut self, x: f64, y: f64) {
        self.points.push((x, y));
        self.fitted = false;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.second_derivatives.clear();
        self.fitted = false;
    }

    /// Sort the knots and solve the tridiagonal system for the second
    /// derivatives.
    pub fn fit(&mut self) -> Result<(), FitError> {
        let n = self.points.len();
        if n < 3 {
            return Err(FitError::TooFewSamples { samples: n, needed: 3 });
        }

        self.points.sort_by(|a, b| a.0.total_cmp(&b.0));
        if self.points.windows(2).any(|w| !(w[1].0 > w[0].0)) {
            return Err(FitError::DuplicateKnots);
        }

        let p = &self.points;
        let mut y2 = vec![0.0; n];
        let mut u = vec![0.0; n];

        for i in 1..n - 1 {
            let sig = (p[i].0 - p[i - 1].0) / (p[i + 1].0 - p[i - 1].0);
            let q = sig * y2[i - 1] + 2.0;
            y2[i] = (sig - 1.0) / q;
            let slope_right = (p[i + 1].1 - p[i].1) / (p[i + 1].0 - p[i].0);
            let slope_left = (p[i].1 - p[i - 1].1) / (p[i].0 - p[i - 1].0);
            u[i] = (6.0 * (slope_right - slope_left) / (p[i + 1].0 - p[i - 1].0) - sig * u[i - 1]) / q;
        }

        y2[n - 1] = 0.0;
        for k in (0..n - 1).rev() {
            y2[k] = y2[k] * y2[k + 1] + u[k];
        }

        self.second_derivatives = y2;
        self.fitted = true;
        Ok(())
    }

    /// Value of the spline at `x`, fitting it first if knots changed
    pub fn evaluate(&mut self, x: f64) -> Result<f64, FitError> {
        if !self.fitted {
            self.fit()?;
        }

        let p = &self.points;
        let y2 = &self.second_derivatives;
        let n = p.len();

        // interval [lo, lo + 1], clamped to the boundary intervals
        let hi = p.partition_point(|&(px, _)| px <= x).clamp(1, n - 1);
        let lo = hi - 1;

        let h = p[hi].0 - p[lo].0;
        let a = (p[hi].0 - x) / h;
        let b = (x - p[lo].0) / h;

        Ok(a * p[lo].1
            + b * p[hi].1
            + ((a * a * a - a) * y2[lo] + (b * b * b - b) * y2[hi]) * (h * h) / 6.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_knots() {
        let knots = [(3.0, 2.0), (0.0, 1.0), (1.0, 4.0), (2.0, -1.0), (5.0, 0.5)];
        let mut spline = CubicSpline::new();
        for (x, y) in knots {
            spline.add_point(x, y);
        }
        for (x, y) in knots {
            assert_relative_eq!(spline.evaluate(x).unwrap(), y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reproduces_line() {
        let mut spline = CubicSpline::new();
        for x in [0.0, 1.0, 2.5, 4.0] {
            spline.add_point(x, 3.0 * x - 1.0);
        }
        for x in [-1.0, 0.5, 1.7, 3.9, 6.0] {
            assert_relative_eq!(spline.evaluate(x).unwrap(), 3.0 * x - 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_symmetric_hat() {
        let mut spline = CubicSpline::new();
        spline.add_point(-1.0, 0.0);
        spline.add_point(0.0, 1.0);
        spline.add_point(1.0, 0.0);

        // y2 at the middle knot is -3, so the midpoint of each half is 0.6875
        assert_relative_eq!(spline.evaluate(0.5).unwrap(), 0.6875, epsilon = 1e-12);
        assert_relative_eq!(spline.evaluate(-0.5).unwrap(), 0.6875, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_errors() {
        let mut spline = CubicSpline::new();
        spline.add_point(0.0, 1.0);
        spline.add_point(1.0, 2.0);
        assert_eq!(
            spline.evaluate(0.5),
            Err(FitError::TooFewSamples { samples: 2, needed: 3 })
        );

        spline.add_point(1.0, 3.0);
        assert_eq!(spline.evaluate(0.5), Err(FitError::DuplicateKnots));
    }
}
