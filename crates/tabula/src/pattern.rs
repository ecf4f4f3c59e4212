//! Trend and cyclical pattern detection on individual numeric columns.
//!
//! Each column is examined as the sequence of its non-missing values in row
//! order, positioned `0..n`. A trend is a significant linear fit of value on
//! position. A cyclical pattern is a strong autocorrelation at some lag.
//! Both checks are independent and may fire for the same column.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input::Dataset;
use crate::schema::ColumnClassification;
use crate::stats::{autocorrelation, linear_regression};

/// Thresholds for [`PatternDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct PatternConfig {
    /// Minimum `|r|` (exclusive) for a trend.
    pub trend_r_threshold: f64,
    /// `|r|` above which a trend is "high" confidence.
    pub trend_high_confidence_r: f64,
    /// Maximum p-value (exclusive) for a trend.
    pub trend_p_value: f64,
    pub trend_min_values: usize,
    /// Minimum autocorrelation (exclusive) for a cyclical pattern.
    pub cyclical_threshold: f64,
    pub cyclical_min_values: usize,
    /// Lags are tried up to `min(n / 2, max_lag)`, exclusive.
    pub cyclical_max_lag: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            trend_r_threshold: 0.7,
            trend_high_confidence_r: 0.85,
            trend_p_value: 0.05,
            trend_min_values: 3,
            cyclical_threshold: 0.7,
            cyclical_min_values: 10,
            cyclical_max_lag: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Moderate,
}

/// A detected pattern, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Pattern {
    Trend {
        column: String,
        description: String,
        direction: TrendDirection,
        slope: f64,
        r_squared: f64,
        p_value: f64,
        confidence: Confidence,
    },
    Cyclical {
        column: String,
        description: String,
        autocorrelation: f64,
        lag: usize,
    },
}

impl Pattern {
    pub fn column(&self) -> &str {
        match self {
            Pattern::Trend { column, .. } | Pattern::Cyclical { column, .. } => column,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Pattern::Trend { description, .. } | Pattern::Cyclical { description, .. } => {
                description
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: PatternConfig,
}

impl PatternDetector {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    /// Patterns for every numeric column, in column order, trend first.
    pub fn detect(&self, dataset: &Dataset, classes: &ColumnClassification) -> Vec<Pattern> {
        let mut patterns = Vec::new();

        for column in classes.numeric_columns(dataset) {
            let series = column.numeric_series();
            if let Some(trend) = self.trend(&column.name, &series) {
                patterns.push(trend);
            }
            if let Some(cycle) = self.cyclical(&column.name, &series) {
                patterns.push(cycle);
            }
        }

        debug!(patterns = patterns.len(), "pattern detection complete");
        patterns
    }

    /// Linear trend of the series against its position.
    pub fn trend(&self, column: &str, series: &[f64]) -> Option<Pattern> {
        if series.len() < self.config.trend_min_values.max(3) {
            return None;
        }
        let positions: Vec<f64> = (0..series.len()).map(|i| i as f64).collect();
        let fit = linear_regression(&positions, series)?;

        let significant =
            fit.r.abs() > self.config.trend_r_threshold && fit.p_value < self.config.trend_p_value;
        if !significant {
            return None;
        }

        let direction = if fit.slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };
        let confidence = if fit.r.abs() > self.config.trend_high_confidence_r {
            Confidence::High
        } else {
            Confidence::Moderate
        };

        Some(Pattern::Trend {
            column: column.to_string(),
            description: match direction {
                TrendDirection::Increasing => "Increasing trend detected".to_string(),
                TrendDirection::Decreasing => "Decreasing trend detected".to_string(),
            },
            direction,
            slope: fit.slope,
            r_squared: fit.r_squared,
            p_value: fit.p_value,
            confidence,
        })
    }

    /// Strongest lag autocorrelation, if it clears the threshold.
    pub fn cyclical(&self, column: &str, series: &[f64]) -> Option<Pattern> {
        let n = series.len();
        if n < self.config.cyclical_min_values {
            return None;
        }

        let max_lag = (n / 2).min(self.config.cyclical_max_lag);
        let (lag, best) = (1..max_lag)
            .filter_map(|lag| autocorrelation(series, lag).map(|r| (lag, r)))
            .fold(None, |best: Option<(usize, f64)>, (lag, r)| match best {
                Some((_, b)) if b >= r => best,
                _ => Some((lag, r)),
            })?;

        (best > self.config.cyclical_threshold).then(|| Pattern::Cyclical {
            column: column.to_string(),
            description: "Cyclical pattern detected".to_string(),
            autocorrelation: best,
            lag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Column, Value};

    fn detector() -> PatternDetector {
        PatternDetector::default()
    }

    #[test]
    fn test_increasing_trend() {
        let series: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let Some(Pattern::Trend {
            direction,
            r_squared,
            confidence,
            description,
            ..
        }) = detector().trend("x", &series)
        else {
            panic!("expected a trend");
        };
        assert_eq!(direction, TrendDirection::Increasing);
        assert!((r_squared - 1.0).abs() < 1e-9);
        assert_eq!(confidence, Confidence::High);
        assert_eq!(description, "Increasing trend detected");
    }

    #[test]
    fn test_decreasing_moderate_trend() {
        // r is about -0.8: strong enough to report, short of "high"
        let series = [10.0, 7.0, 9.0, 5.0, 8.0, 4.0, 6.0, 2.0, 5.0, 1.0];
        match detector().trend("x", &series) {
            Some(Pattern::Trend {
                direction,
                confidence,
                ..
            }) => {
                assert_eq!(direction, TrendDirection::Decreasing);
                assert_eq!(confidence, Confidence::Moderate);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_no_trend_in_noise() {
        let series = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0];
        assert!(detector().trend("x", &series).is_none());
    }

    #[test]
    fn test_trend_needs_three_values() {
        assert!(detector().trend("x", &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_cyclical_pattern() {
        // Lags 1..6 are tried, so period 4 is the only exact repeat
        let series: Vec<f64> = (0..12).map(|i| [0.0, 5.0, 10.0, 5.0][i % 4]).collect();
        match detector().cyclical("x", &series) {
            Some(Pattern::Cyclical {
                lag,
                autocorrelation,
                ..
            }) => {
                assert_eq!(lag, 4);
                assert!((autocorrelation - 1.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_cyclical_needs_ten_values() {
        let series = [0.0, 5.0, 0.0, 5.0, 0.0, 5.0, 0.0, 5.0, 0.0];
        assert!(detector().cyclical("x", &series).is_none());
    }

    #[test]
    fn test_constant_series_has_no_patterns() {
        let series = [4.0; 15];
        assert!(detector().trend("x", &series).is_none());
        assert!(detector().cyclical("x", &series).is_none());
    }

    #[test]
    fn test_detect_uses_non_missing_positions() {
        let mut values: Vec<Value> = (0..12).map(|i| Value::Number(i as f64)).collect();
        values.insert(3, Value::Missing);
        values.insert(7, Value::Missing);
        let ds = Dataset::new(vec![Column::new("x", values)]).unwrap();
        let classes = ColumnClassification::of(&ds);

        let patterns = detector().detect(&ds, &classes);
        let trend = patterns
            .iter()
            .find(|p| matches!(p, Pattern::Trend { .. }))
            .expect("trend");
        match trend {
            Pattern::Trend { slope, .. } => assert!((slope - 1.0).abs() < 1e-9),
            Pattern::Cyclical { .. } => unreachable!(),
        }
        assert_eq!(trend.column(), "x");
    }

    #[test]
    fn test_pattern_serializes_with_type_tag() {
        let pattern = Pattern::Cyclical {
            column: "x".into(),
            description: "Cyclical pattern detected".into(),
            autocorrelation: 0.9,
            lag: 3,
        };
        let json = serde_json::to_value(&pattern).unwrap();
        assert_eq!(json["type"], "cyclical");
        assert_eq!(json["lag"], 3);
    }
}
