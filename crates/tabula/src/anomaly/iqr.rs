//! Per-column interquartile-range fences.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnomalyDetector, AnomalyResult, DetectorInput};
use crate::error::Result;
use crate::stats::{quantile_sorted, sorted};

/// Configuration for [`IqrDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct IqrConfig {
    /// Fence distance in IQRs beyond Q1 and Q3.
    pub multiplier: f64,
    /// Minimum non-missing values for a column to be checked.
    pub min_values: usize,
}

impl Default for IqrConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.5,
            min_values: 4,
        }
    }
}

/// Values outside the fences of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqrOutliers {
    /// Dataset row indices.
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub iqr: f64,
}

#[derive(Debug, Clone, Default)]
pub struct IqrDetector {
    config: IqrConfig,
}

impl IqrDetector {
    pub fn new(config: IqrConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, input: &DetectorInput<'_>) -> IndexMap<String, IqrOutliers> {
        let mut found = IndexMap::new();

        for column in input.numeric_columns() {
            let points = column.numeric_values();
            if points.len() < self.config.min_values {
                continue;
            }
            if let Some(outliers) = self.column_outliers(&points) {
                debug!(column = %column.name, count = outliers.indices.len(), "IQR outliers");
                found.insert(column.name.clone(), outliers);
            }
        }

        found
    }

    fn column_outliers(&self, points: &[(usize, f64)]) -> Option<IqrOutliers> {
        let ordered = sorted(&points.iter().map(|(_, v)| *v).collect::<Vec<_>>());
        let q1 = quantile_sorted(&ordered, 0.25)?;
        let q3 = quantile_sorted(&ordered, 0.75)?;
        let iqr = q3 - q1;
        let lower_bound = q1 - self.config.multiplier * iqr;
        let upper_bound = q3 + self.config.multiplier * iqr;

        let (indices, values): (Vec<usize>, Vec<f64>) = points
            .iter()
            .filter(|(_, v)| *v < lower_bound || *v > upper_bound)
            .copied()
            .unzip();

        if indices.is_empty() {
            return None;
        }
        Some(IqrOutliers {
            indices,
            values,
            lower_bound,
            upper_bound,
            iqr,
        })
    }
}

impl AnomalyDetector for IqrDetector {
    fn name(&self) -> &'static str {
        "iqr"
    }

    fn detect(&self, input: &DetectorInput<'_>) -> Result<AnomalyResult> {
        Ok(AnomalyResult::Iqr(self.run(input)))
    }
}
