//! Anomaly detection over the numeric columns of a dataset.
//!
//! Three independent methods run side by side:
//!
//! - [`IsolationForestDetector`]: multivariate, row-level flags
//! - [`ZScoreDetector`]: per column, `|z| > 3`
//! - [`IqrDetector`]: per column, outside the 1.5·IQR fences
//!
//! Every detector implements [`AnomalyDetector`] and reports original
//! dataset row indices.

mod iqr;
mod isolation_forest;
mod zscore;

pub use iqr::{IqrConfig, IqrDetector, IqrOutliers};
pub use isolation_forest::{IsolationForestConfig, IsolationForestDetector, IsolationForestResult};
pub use zscore::{ZScoreConfig, ZScoreDetector, ZScoreOutliers};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::input::{Column, Dataset};
use crate::schema::ColumnClassification;

/// Shared input handed to every detector.
#[derive(Debug, Clone, Copy)]
pub struct DetectorInput<'a> {
    pub dataset: &'a Dataset,
    pub classification: &'a ColumnClassification,
}

impl<'a> DetectorInput<'a> {
    pub fn new(dataset: &'a Dataset, classification: &'a ColumnClassification) -> Self {
        Self {
            dataset,
            classification,
        }
    }

    /// Numeric columns in dataset order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &'a Column> + use<'a> {
        self.classification.numeric_columns(self.dataset)
    }
}

/// Trait for anomaly detectors.
pub trait AnomalyDetector: Send + Sync {
    /// Stage name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Run detection. Insufficient data yields an empty result, not an error.
    fn detect(&self, input: &DetectorInput<'_>) -> Result<AnomalyResult>;
}

/// Output of a single detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AnomalyResult {
    IsolationForest(IsolationForestResult),
    #[serde(rename = "zscore")]
    ZScore(IndexMap<String, ZScoreOutliers>),
    Iqr(IndexMap<String, IqrOutliers>),
}

/// Combined output of all detectors, as it appears in the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anomalies {
    pub isolation_forest: IsolationForestResult,
    pub zscore: IndexMap<String, ZScoreOutliers>,
    pub iqr: IndexMap<String, IqrOutliers>,
}

impl Anomalies {
    /// Merge one detector's output into the combined view.
    pub fn absorb(&mut self, result: AnomalyResult) {
        match result {
            AnomalyResult::IsolationForest(r) => self.isolation_forest = r,
            AnomalyResult::ZScore(r) => self.zscore = r,
            AnomalyResult::Iqr(r) => self.iqr = r,
        }
    }
}

/// Runs a set of detectors and collects their results.
pub struct AnomalyEngine {
    detectors: Vec<Box<dyn AnomalyDetector>>,
}

impl AnomalyEngine {
    /// Engine with the three standard detectors.
    pub fn new(
        forest: IsolationForestConfig,
        zscore: ZScoreConfig,
        iqr: IqrConfig,
    ) -> Self {
        Self {
            detectors: vec![
                Box::new(IsolationForestDetector::new(forest)),
                Box::new(ZScoreDetector::new(zscore)),
                Box::new(IqrDetector::new(iqr)),
            ],
        }
    }

    /// Engine with a custom detector list.
    pub fn with_detectors(detectors: Vec<Box<dyn AnomalyDetector>>) -> Self {
        Self { detectors }
    }

    /// Run every detector; the first failure aborts.
    pub fn detect(&self, input: &DetectorInput<'_>) -> Result<Anomalies> {
        let mut anomalies = Anomalies::default();
        for detector in &self.detectors {
            let result = detector.detect(input)?;
            tracing::debug!(detector = detector.name(), "detector finished");
            anomalies.absorb(result);
        }
        Ok(anomalies)
    }
}

impl Default for AnomalyEngine {
    fn default() -> Self {
        Self::new(
            IsolationForestConfig::default(),
            ZScoreConfig::default(),
            IqrConfig::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabulaError;
    use crate::input::Value;

    struct FailingDetector;

    impl AnomalyDetector for FailingDetector {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn detect(&self, _input: &DetectorInput<'_>) -> Result<AnomalyResult> {
            Err(TabulaError::analysis("failing", "boom"))
        }
    }

    fn dataset() -> Dataset {
        let mut values: Vec<Value> = (0..40).map(|i| Value::Number((i % 4) as f64)).collect();
        values[17] = Value::Number(250.0);
        Dataset::new(vec![Column::new("x", values)]).unwrap()
    }

    #[test]
    fn test_engine_runs_all_detectors() {
        let ds = dataset();
        let classes = ColumnClassification::of(&ds);
        let anomalies = AnomalyEngine::default()
            .detect(&DetectorInput::new(&ds, &classes))
            .unwrap();

        assert_eq!(anomalies.zscore["x"].indices, vec![17]);
        assert_eq!(anomalies.iqr["x"].indices, vec![17]);
        assert!(anomalies.isolation_forest.indices.contains(&17));
    }

    #[test]
    fn test_engine_aborts_on_failure() {
        let ds = dataset();
        let classes = ColumnClassification::of(&ds);
        let engine = AnomalyEngine::with_detectors(vec![
            Box::new(ZScoreDetector::default()),
            Box::new(FailingDetector),
        ]);
        let err = engine.detect(&DetectorInput::new(&ds, &classes)).unwrap_err();
        assert!(matches!(err, TabulaError::Analysis { stage: "failing", .. }));
    }

    #[test]
    fn test_result_tagged_by_method() {
        let json = serde_json::to_value(AnomalyResult::ZScore(IndexMap::new())).unwrap();
        assert_eq!(json["method"], "zscore");
    }
}
