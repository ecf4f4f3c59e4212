//! Descriptive statistics over plain `f64` slices.
//!
//! All functions expect missing values to have been dropped already and
//! return `None` when the statistic is undefined for the input.

use super::distribution::student_t_two_sided;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom.
pub fn variance(values: &[f64], ddof: usize) -> Option<f64> {
    let n = values.len();
    if n <= ddof {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (n - ddof) as f64)
}

/// Sample standard deviation (n − 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    variance(values, 1).map(f64::sqrt)
}

/// Population standard deviation (n denominator).
pub fn population_std(values: &[f64]) -> Option<f64> {
    variance(values, 0).map(f64::sqrt)
}

/// Copy and sort ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Linear-interpolated quantile of already sorted data, `q` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Linear-interpolated quantile, `q` in `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(values), q)
}

/// Pearson correlation coefficient.
///
/// `None` for fewer than two pairs, mismatched lengths or zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Autocorrelation of a series with itself shifted by `lag`.
pub fn autocorrelation(series: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || lag >= series.len() {
        return None;
    }
    pearson(&series[lag..], &series[..series.len() - lag])
}

/// Ordinary least-squares fit of `y` on `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Correlation coefficient.
    pub r: f64,
    pub r_squared: f64,
    /// Two-sided p-value for the null hypothesis of zero slope.
    pub p_value: f64,
}

/// Fit a simple linear regression. Requires at least three points and a
/// non-constant `x`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    const TINY: f64 = 1.0e-20;

    let n = x.len();
    if n != y.len() || n < 3 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx == 0.0 {
        return None;
    }

    let r = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
    };
    let slope = sxy / sxx;
    let df = (n - 2) as f64;
    let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();

    Some(LinearFit {
        slope,
        intercept: my - slope * mx,
        r,
        r_squared: r * r,
        p_value: student_t_two_sided(t, df),
    })
}
