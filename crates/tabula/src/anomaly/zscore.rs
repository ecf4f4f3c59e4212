//! Per-column z-score outliers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnomalyDetector, AnomalyResult, DetectorInput};
use crate::error::Result;
use crate::stats::{mean, sample_std};

/// Configuration for [`ZScoreDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreConfig {
    /// Values with `|z|` strictly above this are flagged.
    pub threshold: f64,
    /// Minimum non-missing values for a column to be checked.
    pub min_values: usize,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            min_values: 2,
        }
    }
}

/// Outliers found in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreOutliers {
    /// Dataset row indices.
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
    /// Absolute z-scores.
    pub z_scores: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ZScoreDetector {
    config: ZScoreConfig,
}

impl ZScoreDetector {
    pub fn new(config: ZScoreConfig) -> Self {
        Self { config }
    }

    /// Check every numeric column; only columns with outliers are returned.
    pub fn run(&self, input: &DetectorInput<'_>) -> IndexMap<String, ZScoreOutliers> {
        let mut found = IndexMap::new();

        for column in input.numeric_columns() {
            let points = column.numeric_values();
            if points.len() < self.config.min_values.max(2) {
                continue;
            }
            if let Some(outliers) = self.column_outliers(&points) {
                debug!(column = %column.name, count = outliers.indices.len(), "z-score outliers");
                found.insert(column.name.clone(), outliers);
            }
        }

        found
    }

    fn column_outliers(&self, points: &[(usize, f64)]) -> Option<ZScoreOutliers> {
        let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        let m = mean(&values)?;
        let std = sample_std(&values)?;
        if std == 0.0 || !std.is_finite() {
            return None;
        }

        let mut outliers = ZScoreOutliers {
            indices: Vec::new(),
            values: Vec::new(),
            z_scores: Vec::new(),
        };
        for &(idx, value) in points {
            let z = ((value - m) / std).abs();
            if z > self.config.threshold {
                outliers.indices.push(idx);
                outliers.values.push(value);
                outliers.z_scores.push(z);
            }
        }

        (!outliers.indices.is_empty()).then_some(outliers)
    }
}

impl AnomalyDetector for ZScoreDetector {
    fn name(&self) -> &'static str {
        "zscore"
    }

    fn detect(&self, input: &DetectorInput<'_>) -> Result<AnomalyResult> {
        Ok(AnomalyResult::ZScore(self.run(input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Column, Dataset, Value};
    use crate::schema::ColumnClassification;

    fn detect(columns: Vec<Column>) -> IndexMap<String, ZScoreOutliers> {
        let ds = Dataset::new(columns).unwrap();
        let classes = ColumnClassification::of(&ds);
        ZScoreDetector::default().run(&DetectorInput::new(&ds, &classes))
    }

    fn spiked(len: usize, spike_at: usize) -> Vec<Value> {
        (0..len)
            .map(|i| {
                if i == spike_at {
                    Value::Number(1000.0)
                } else {
                    Value::Number((i % 3) as f64)
                }
            })
            .collect()
    }

    #[test]
    fn test_flags_spike() {
        let found = detect(vec![Column::new("x", spiked(30, 12))]);
        let x = &found["x"];
        assert_eq!(x.indices, vec![12]);
        assert_eq!(x.values, vec![1000.0]);
        assert!(x.z_scores[0] > 3.0);
    }

    #[test]
    fn test_indices_are_row_indices() {
        let mut values = spiked(30, 20);
        values[0] = Value::Missing;
        values[3] = Value::Missing;
        let found = detect(vec![Column::new("x", values)]);
        assert_eq!(found["x"].indices, vec![20]);
    }

    #[test]
    fn test_small_columns_cannot_exceed_threshold() {
        let values = [1.0, 2.0, 3.0, 100.0].map(Value::Number).to_vec();
        assert!(detect(vec![Column::new("x", values)]).is_empty());
    }

    #[test]
    fn test_constant_column_skipped() {
        assert!(detect(vec![Column::new("x", vec![Value::Number(5.0); 40])]).is_empty());
    }

    #[test]
    fn test_single_value_skipped() {
        let values = vec![Value::Number(5.0), Value::Missing];
        assert!(detect(vec![Column::new("x", values)]).is_empty());
    }

    #[test]
    fn test_only_columns_with_outliers_reported() {
        let found = detect(vec![
            Column::new("calm", (0..30).map(|i| Value::Number(i as f64)).collect()),
            Column::new("spiky", spiked(30, 5)),
        ]);
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["spiky"]);
    }
}
