//! Least-squares polynomial trend of one variable against another
//!
//! The normal equations are assembled on centred and scaled abscissae,
//! solved by Gaussian elimination with partial pivoting, and the solution is
//! expanded back into plain powers of `x`:
//!
//! ```text
//! y(x) = c0 + c1·x + c2·x² + ... + cn·xⁿ
//! ```

use super::FitError;

/// Polynomial least-squares fitter of fixed order
#[derive(Debug, Clone)]
pub struct PolynomialTrend {
    order: usize,
    xs: Vec<f64>,
    ys: Vec<f64>,
    coefficients: Vec<f64>,
    r_squared: f64,
}

impl PolynomialTrend {
    pub fn new(order: usize) -> Self {
        Self {
            order,
            xs: Vec::new(),
            ys: Vec::new(),
            coefficients: Vec::new(),
            r_squared: 0.0,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of samples added so far
    pub fn samples(&self) -> usize {
        self.xs.len()
    }

    /// Add a sample; invalidates any previous solution
    pub fn add_sample(&mut self, x: f64, y: f64) {
        self.xs.push(x);
        self.ys.push(y);
        self.coefficients.clear();
    }

    /// Remove all samples and the solution
    pub fn clear(&mut self) {
        self.xs.clear();
        self.ys.clear();
        self.coefficients.clear();
        self.r_squared = 0.0;
    }

    /// Fit the polynomial to the samples added so far.
    ///
    /// The order must be at least 1. Needs more samples than the order, and
    /// at least `order + 1` distinct abscissae for the normal equations to be
    /// regular.
    pub fn solve(&mut self) -> Result<(), FitError> {
        self.coefficients.clear();
        if self.order == 0 {
            return Err(FitError::InvalidOrder);
        }

        let n = self.order + 1;
        if self.xs.len() < n {
            return Err(FitError::TooFewSamples {
                samples: self.xs.len(),
                needed: n,
            });
        }

        let count = self.xs.len() as f64;
        let mean = self.xs.iter().sum::<f64>() / count;
        let scale = self
            .xs
            .iter()
            .map(|x| (x - mean).abs())
            .fold(0.0_f64, f64::max);

        if scale == 0.0 || !scale.is_finite() {
            return Err(FitError::Singular);
        }

        // Normal equations on t = (x - mean) / scale
        let mut mat = vec![0.0_f64; n * n];
        let mut rhs = vec![0.0_f64; n];
        let mut powers = vec![0.0_f64; 2 * n - 1];
        for (&x, &y) in self.xs.iter().zip(&self.ys) {
            let t = (x - mean) / scale;
            let mut p = 1.0;
            for (k, power) in powers.iter_mut().enumerate() {
                if k < n {
                    rhs[k] += p * y;
                }
                *power += p;
                p *= t;
            }
        }
        for i in 0..n {
            for j in 0..n {
                mat[i * n + j] = powers[i + j];
            }
        }

        let scaled = gauss_solve(n, &mut mat, &mut rhs)?;
        self.coefficients = expand(&scaled, mean, scale);
        self.update_r_squared();
        Ok(())
    }

    /// Coefficient of `x^k`, `None` before a successful solve
    pub fn coefficient(&self, k: usize) -> Option<f64> {
        self.coefficients.get(k).copied()
    }

    /// All coefficients ordered by ascending power; empty before a solve
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn is_solved(&self) -> bool {
        !self.coefficients.is_empty()
    }

    /// Evaluate the fitted polynomial at `x` (Horner's scheme)
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        if self.coefficients.is_empty() {
            return None;
        }
        Some(self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c))
    }

    /// Explained share of the variance, `SSR / (SSR + SSE)`
    pub fn r_squared(&self) -> Option<f64> {
        self.is_solved().then_some(self.r_squared)
    }

    fn update_r_squared(&mut self) {
        let mean = self.ys.iter().sum::<f64>() / self.ys.len() as f64;
        let mut ssr = 0.0;
        let mut sse = 0.0;
        for (&x, &y) in self.xs.iter().zip(&self.ys) {
            let fitted = self.evaluate(x).unwrap_or(f64::NAN);
            ssr += (fitted - mean) * (fitted - mean);
            sse += (y - fitted) * (y - fitted);
        }
        self.r_squared = if ssr + sse > 0.0 { ssr / (ssr + sse) } else { 1.0 };
    }
}

/// Rewrite `Σ a_k ((x - mean) / scale)^k` as `Σ c_j x^j`
fn expand(scaled: &[f64], mean: f64, scale: f64) -> Vec<f64> {
    let n = scaled.len();
    let mut coefficients = vec![0.0; n];

    // binomial row for the current k, reused across iterations
    let mut binomial = vec![0.0; n];
    for (k, &a) in scaled.iter().enumerate() {
        binomial[k] = 1.0;
        for j in (1..k).rev() {
            binomial[j] += binomial[j - 1];
        }

        let factor = a / scale.powi(k as i32);
        for j in 0..=k {
            coefficients[j] += factor * binomial[j] * (-mean).powi((k - j) as i32);
        }
    }
    coefficients
}

/// Gaussian elimination with partial pivoting on a row-major `n×n` system.
///
/// Pivots are compared against the largest entry of the matrix, so the
/// singularity test does not depend on the units of the samples.
fn gauss_solve(n: usize, mat: &mut [f64], rhs: &mut [f64]) -> Result<Vec<f64>, FitError> {
    let magnitude = mat.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let tolerance = magnitude * 1e-12;

    for col in 0..n {
        let mut max_val = mat[col * n + col].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = mat[row * n + col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if !(max_val > tolerance) {
            return Err(FitError::Singular);
        }

        if max_row != col {
            for j in 0..n {
                mat.swap(col * n + j, max_row * n + j);
            }
            rhs.swap(col, max_row);
        }

        let pivot = mat[col * n + col];
        for row in (col + 1)..n {
            let factor = mat[row * n + col] / pivot;
            mat[row * n + col] = 0.0;
            for j in (col + 1)..n {
                mat[row * n + j] -= factor * mat[col * n + j];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0_f64; n];
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for j in (col + 1)..n {
            sum -= mat[col * n + j] * x[j];
        }
        x[col] = sum / mat[col * n + col];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_quadratic() {
        let mut trend = PolynomialTrend::new(2);
        for x in [0.0, 1.0, 2.0, 3.0, 5.0] {
            trend.add_sample(x, 1.0 - 2.0 * x + 0.5 * x * x);
        }
        trend.solve().unwrap();

        assert_relative_eq!(trend.coefficient(0).unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(trend.coefficient(1).unwrap(), -2.0, epsilon = 1e-9);
        assert_relative_eq!(trend.coefficient(2).unwrap(), 0.5, epsilon = 1e-9);
        assert!(trend.coefficient(3).is_none());
        assert_relative_eq!(trend.evaluate(4.0).unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(trend.r_squared().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_large_abscissae() {
        // Heights in metres above sea level
        let mut trend = PolynomialTrend::new(3);
        for x in [1500.0, 1750.0, 2100.0, 2400.0, 2900.0, 3300.0] {
            let t = x / 1000.0;
            trend.add_sample(x, 4.0 + t - 2.0 * t * t + 0.25 * t * t * t);
        }
        trend.solve().unwrap();

        let t: f64 = 2.6;
        let expected = 4.0 + t - 2.0 * t * t + 0.25 * t * t * t;
        assert_relative_eq!(trend.evaluate(2600.0).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_least_squares_line() {
        let mut trend = PolynomialTrend::new(1);
        trend.add_sample(0.0, 0.0);
        trend.add_sample(1.0, 1.0);
        trend.add_sample(2.0, 1.0);
        trend.add_sample(3.0, 2.0);
        trend.solve().unwrap();

        assert_relative_eq!(trend.coefficient(1).unwrap(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(trend.coefficient(0).unwrap(), 0.1, epsilon = 1e-12);
        let r2 = trend.r_squared().unwrap();
        assert!(r2 > 0.8 && r2 < 1.0, "r² = {}", r2);
    }

    #[test]
    fn test_too_few_samples() {
        let mut trend = PolynomialTrend::new(2);
        trend.add_sample(0.0, 1.0);
        trend.add_sample(1.0, 2.0);
        assert_eq!(
            trend.solve(),
            Err(FitError::TooFewSamples { samples: 2, needed: 3 })
        );
        assert!(trend.evaluate(0.5).is_none());
    }

    #[test]
    fn test_singular_when_abscissae_repeat() {
        let mut trend = PolynomialTrend::new(2);
        trend.add_sample(1.0, 1.0);
        trend.add_sample(1.0, 2.0);
        trend.add_sample(2.0, 3.0);
        trend.add_sample(2.0, 4.0);
        assert_eq!(trend.solve(), Err(FitError::Singular));

        let mut flat = PolynomialTrend::new(1);
        flat.add_sample(3.0, 1.0);
        flat.add_sample(3.0, 2.0);
        assert_eq!(flat.solve(), Err(FitError::Singular));
    }

    #[test]
    fn test_order_zero_rejected() {
        let mut trend = PolynomialTrend::new(0);
        trend.add_sample(0.0, 1.0);
        trend.add_sample(1.0, 3.0);
        assert_eq!(trend.solve(), Err(FitError::InvalidOrder));
        assert!(!trend.is_solved());
    }

    #[test]
    fn test_add_sample_invalidates_solution() {
        let mut trend = PolynomialTrend::new(1);
        trend.add_sample(0.0, 0.0);
        trend.add_sample(1.0, 1.0);
        trend.solve().unwrap();
        assert!(trend.is_solved());

        trend.add_sample(2.0, 5.0);
        assert!(!trend.is_solved());
        trend.clear();
        assert_eq!(trend.samples(), 0);
    }
}
