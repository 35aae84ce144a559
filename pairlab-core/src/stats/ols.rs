//! Ordinary least squares via the normal equations.

use nalgebra::{DMatrix, DVector};

const RANK_TOLERANCE: f64 = 1e-10;

/// Fitted linear regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficients in design-column order.
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    pub fn t_value(&self, column: usize) -> f64 {
        self.coefficients[column] / self.std_errors[column]
    }

    /// Akaike information criterion under Gaussian errors.
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let k = self.coefficients.len() as f64;
        let llf = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0);
        -2.0 * llf + 2.0 * k
    }

    /// Coefficient of determination against the centered target.
    pub fn r_squared(&self, target: &[f64]) -> f64 {
        let n = target.len() as f64;
        let mean = target.iter().sum::<f64>() / n;
        let sst: f64 = target.iter().map(|v| (v - mean).powi(2)).sum();
        if sst == 0.0 {
            return f64::NAN;
        }
        1.0 - self.ssr / sst
    }
}

/// Fit `target ~ design`. `None` if under-determined or singular.
pub fn fit(design: &DMatrix<f64>, target: &DVector<f64>) -> Option<OlsFit> {
    let (n, k) = design.shape();
    if k == 0 || n <= k || target.len() != n {
        return None;
    }

    let xt = design.transpose();
    let xtx = &xt * design;
    let xty = &xt * target;
    let scale = xtx.diagonal();
    let chol = xtx.cholesky()?;

    // Rank check: a pivot that vanishes relative to its column norm means a
    // (numerically) collinear design.
    let l = chol.l_dirty();
    for j in 0..k {
        let pivot = l[(j, j)];
        if !(pivot * pivot > RANK_TOLERANCE * scale[j]) {
            return None;
        }
    }

    let beta = chol.solve(&xty);

    let residuals = target - design * &beta;
    let ssr = residuals.dot(&residuals);
    let sigma2 = ssr / (n - k) as f64;
    let inv = chol.inverse();

    Some(OlsFit {
        coefficients: beta.iter().copied().collect(),
        std_errors: (0..k).map(|i| (sigma2 * inv[(i, i)]).sqrt()).collect(),
        residuals: residuals.iter().copied().collect(),
        ssr,
        nobs: n,
    })
}

/// Fit `target ~ columns`, where each column is a regressor of the same
/// length as `target`. Add a column of ones for an intercept.
pub fn fit_columns(target: &[f64], columns: &[&[f64]]) -> Option<OlsFit> {
    let n = target.len();
    if columns.iter().any(|c| c.len() != n) {
        return None;
    }
    let design = DMatrix::from_fn(n, columns.len(), |r, c| columns[c][r]);
    fit(&design, &DVector::from_column_slice(target))
}
