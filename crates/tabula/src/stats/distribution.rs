//! Significance tests backed by `statrs` distributions.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-sided p-value of a Student t statistic with `df` degrees of freedom.
///
/// NaN when `df` is not positive or `t` is NaN.
pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_t_reference_values() {
        // t = 2.228, df = 10 is the two-sided 5% critical value
        assert!((student_t_two_sided(2.228, 10.0) - 0.05).abs() < 1e-3);
        // t = 12.706, df = 1 is the two-sided 5% critical value
        assert!((student_t_two_sided(12.706, 1.0) - 0.05).abs() < 1e-3);
        assert!((student_t_two_sided(3.7712, 8.0) - 0.005453).abs() < 1e-5);
        assert!((student_t_two_sided(0.0, 5.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_student_t_symmetric_in_sign() {
        let pos = student_t_two_sided(1.8, 6.0);
        let neg = student_t_two_sided(-1.8, 6.0);
        assert!((pos - neg).abs() < 1e-12);
    }

    #[test]
    fn test_student_t_degenerate_inputs() {
        assert_eq!(student_t_two_sided(f64::INFINITY, 5.0), 0.0);
        assert!(student_t_two_sided(1.0, 0.0).is_nan());
        assert!(student_t_two_sided(f64::NAN, 5.0).is_nan());
    }
}
