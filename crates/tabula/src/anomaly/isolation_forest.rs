//! Multivariate anomaly detection with an isolation forest.
//!
//! Points that are isolated after few random axis-aligned splits are
//! anomalous. The forest is built over the standardized numeric columns
//! (missing cells replaced by the column mean) and scored the same way
//! scikit-learn's `score_samples` does: `-2^(-E[h(x)] / c(ψ))`, so lower
//! scores are more anomalous.
//!
//! The contamination rate adapts to the dataset size:
//! `clamp(10 / rows, 0.01, 0.1)`. The threshold is the
//! `contamination`-quantile of the scores; rows strictly below it are flagged.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AnomalyDetector, AnomalyResult, DetectorInput};
use crate::error::{Result, TabulaError};
use crate::stats::{mean, population_std, quantile};

const STAGE: &str = "isolation_forest";

/// Euler–Mascheroni constant, used by the harmonic-number approximation.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Configuration for [`IsolationForestDetector`].
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForestConfig {
    /// Number of isolation trees.
    pub trees: usize,
    /// Upper bound on the subsample drawn for each tree.
    pub max_samples: usize,
    /// Seed for the tree-building RNG.
    pub seed: u64,
    /// Numerator of the adaptive contamination rate.
    pub contamination_scale: f64,
    pub contamination_min: f64,
    pub contamination_max: f64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            max_samples: 256,
            seed: 42,
            contamination_scale: 10.0,
            contamination_min: 0.01,
            contamination_max: 0.1,
        }
    }
}

impl IsolationForestConfig {
    /// Contamination rate for a dataset with `rows` rows.
    pub fn contamination_for(&self, rows: usize) -> f64 {
        if rows == 0 {
            return self.contamination_max;
        }
        (self.contamination_scale / rows as f64)
            .clamp(self.contamination_min, self.contamination_max)
    }
}

/// Rows flagged by the isolation forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsolationForestResult {
    /// Flagged row indices, ascending.
    pub indices: Vec<usize>,
    pub count: usize,
    /// Flagged rows as a percentage of all rows.
    pub percentage: f64,
    /// One score per row; lower is more anomalous. Empty when skipped.
    pub scores: Vec<f64>,
    /// Contamination rate used, absent when detection was skipped.
    pub contamination: Option<f64>,
    /// Score cut-off, absent when detection was skipped.
    pub threshold: Option<f64>,
}

impl IsolationForestResult {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Isolation-forest detector over all numeric columns at once.
#[derive(Debug, Clone, Default)]
pub struct IsolationForestDetector {
    config: IsolationForestConfig,
}

impl IsolationForestDetector {
    pub fn new(config: IsolationForestConfig) -> Self {
        Self { config }
    }

    /// Run the forest and produce flags and scores.
    pub fn run(&self, input: &DetectorInput<'_>) -> Result<IsolationForestResult> {
        let rows = input.dataset.row_count();
        let features = feature_matrix(input)?;

        if rows < 2 || features.is_empty() {
            debug!(rows, features = features.len(), "isolation forest skipped");
            return Ok(IsolationForestResult::default());
        }

        let points = transpose(&features, rows);
        let contamination = self.config.contamination_for(rows);
        let forest = Forest::grow(&points, &self.config);

        let scores: Vec<f64> = points.iter().map(|p| forest.score(p)).collect();
        if let Some(bad) = scores.iter().position(|s| !s.is_finite()) {
            return Err(TabulaError::analysis(
                STAGE,
                format!("non-finite anomaly score for row {bad}"),
            ));
        }

        let threshold = quantile(&scores, contamination)
            .ok_or_else(|| TabulaError::analysis(STAGE, "no scores to threshold"))?;

        let indices: Vec<usize> = scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s < threshold)
            .map(|(idx, _)| idx)
            .collect();

        debug!(
            rows,
            features = features.len(),
            contamination,
            threshold,
            flagged = indices.len(),
            "isolation forest complete"
        );

        Ok(IsolationForestResult {
            count: indices.len(),
            percentage: indices.len() as f64 / rows as f64 * 100.0,
            indices,
            scores,
            contamination: Some(contamination),
            threshold: Some(threshold),
        })
    }
}

impl AnomalyDetector for IsolationForestDetector {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn detect(&self, input: &DetectorInput<'_>) -> Result<AnomalyResult> {
        self.run(input).map(AnomalyResult::IsolationForest)
    }
}

/// Standardized, mean-imputed numeric columns (column-major).
///
/// Columns without any value are left out.
fn feature_matrix(input: &DetectorInput<'_>) -> Result<Vec<Vec<f64>>> {
    let mut features = Vec::new();

    for column in input.numeric_columns() {
        let present = column.numeric_series();
        let Some(fill) = mean(&present) else {
            continue;
        };
        let std = population_std(&present).unwrap_or(0.0);
        let scale = if std > 0.0 { std } else { 1.0 };

        let standardized: Vec<f64> = column
            .values
            .iter()
            .map(|v| (v.as_f64().unwrap_or(fill) - fill) / scale)
            .collect();

        if standardized.iter().any(|v| !v.is_finite()) {
            return Err(TabulaError::analysis(
                STAGE,
                format!("column '{}' overflows when standardized", column.name),
            ));
        }
        features.push(standardized);
    }

    Ok(features)
}

fn transpose(columns: &[Vec<f64>], rows: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|row| columns.iter().map(|c| c[row]).collect())
        .collect()
}

/// Average unsuccessful-search path length in a BST of `n` nodes.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

enum Node {
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

impl Node {
    fn path_length(&self, point: &[f64], depth: usize) -> f64 {
        match self {
            Node::Leaf { size } => depth as f64 + average_path_length(*size),
            Node::Split {
                feature,
                value,
                left,
                right,
            } => {
                if point[*feature] < *value {
                    left.path_length(point, depth + 1)
                } else {
                    right.path_length(point, depth + 1)
                }
            }
        }
    }
}

struct Forest {
    trees: Vec<Node>,
    normalizer: f64,
}

impl Forest {
    fn grow(points: &[Vec<f64>], config: &IsolationForestConfig) -> Self {
        let n = points.len();
        let subsample = n.min(config.max_samples.max(1));
        let max_depth = (subsample as f64).log2().ceil() as usize;
        let mut rng = fastrand::Rng::with_seed(config.seed);

        let trees = (0..config.trees.max(1))
            .map(|_| {
                let sample: Vec<&[f64]> = sample_indices(&mut rng, n, subsample)
                    .into_iter()
                    .map(|i| points[i].as_slice())
                    .collect();
                build_tree(&mut rng, &sample, max_depth)
            })
            .collect();

        Self {
            trees,
            normalizer: average_path_length(subsample),
        }
    }

    fn score(&self, point: &[f64]) -> f64 {
        let mean_depth = self
            .trees
            .iter()
            .map(|tree| tree.path_length(point, 0))
            .sum::<f64>()
            / self.trees.len() as f64;

        if self.normalizer > 0.0 {
            -(2f64.powf(-mean_depth / self.normalizer))
        } else {
            -0.5
        }
    }
}

/// Draw `k` distinct indices from `0..n` (partial Fisher–Yates).
fn sample_indices(rng: &mut fastrand::Rng, n: usize, k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..k.min(n) {
        let j = rng.usize(i..n);
        indices.swap(i, j);
    }
    indices.truncate(k);
    indices
}

fn build_tree(rng: &mut fastrand::Rng, sample: &[&[f64]], depth_left: usize) -> Node {
    let n = sample.len();
    if n <= 1 || depth_left == 0 {
        return Node::Leaf { size: n };
    }

    // Only features that still vary can split this node.
    let dims = sample[0].len();
    let ranges: Vec<(usize, f64, f64)> = (0..dims)
        .filter_map(|f| {
            let (lo, hi) = sample.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[f]), hi.max(p[f]))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();

    if ranges.is_empty() {
        return Node::Leaf { size: n };
    }

    let (feature, lo, hi) = ranges[rng.usize(..ranges.len())];
    let value = lo + rng.f64() * (hi - lo);

    let (left, right): (Vec<&[f64]>, Vec<&[f64]>) =
        sample.iter().copied().partition(|p| p[feature] < value);

    if left.is_empty() || right.is_empty() {
        return Node::Leaf { size: n };
    }

    Node::Split {
        feature,
        value,
        left: Box::new(build_tree(rng, &left, depth_left - 1)),
        right: Box::new(build_tree(rng, &right, depth_left - 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Column, Dataset, Value};
    use crate::schema::ColumnClassification;

    fn cluster_with_outlier() -> Dataset {
        let mut x: Vec<Value> = (0..60)
            .map(|i| Value::Number(10.0 + (i % 7) as f64 * 0.1))
            .collect();
        let mut y: Vec<Value> = (0..60)
            .map(|i| Value::Number(20.0 + (i % 5) as f64 * 0.1))
            .collect();
        x.push(Value::Number(500.0));
        y.push(Value::Number(-300.0));
        Dataset::new(vec![Column::new("x", x), Column::new("y", y)]).unwrap()
    }

    fn run(ds: &Dataset) -> IsolationForestResult {
        let classes = ColumnClassification::of(ds);
        IsolationForestDetector::default()
            .run(&DetectorInput::new(ds, &classes))
            .unwrap()
    }

    #[test]
    fn test_contamination_adapts_to_size() {
        let config = IsolationForestConfig::default();
        assert_eq!(config.contamination_for(50), 0.1);
        assert_eq!(config.contamination_for(100), 0.1);
        assert!((config.contamination_for(500) - 0.02).abs() < 1e-12);
        assert_eq!(config.contamination_for(5000), 0.01);
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!(c256 > 10.0 && c256 < 11.0);
    }

    #[test]
    fn test_flags_obvious_outlier() {
        let result = run(&cluster_with_outlier());
        assert!(result.indices.contains(&60));
        assert_eq!(result.scores.len(), 61);
        assert_eq!(result.count, result.indices.len());

        let min_idx = result
            .scores
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(min_idx, Some(60));
        assert!(result.scores.iter().all(|s| *s < 0.0 && *s >= -1.0));
    }

    #[test]
    fn test_flagged_fraction_bounded_by_contamination() {
        let result = run(&cluster_with_outlier());
        let contamination = result.contamination.unwrap();
        assert!(result.count as f64 <= (contamination * 61.0).ceil());
    }

    #[test]
    fn test_deterministic() {
        let ds = cluster_with_outlier();
        assert_eq!(run(&ds), run(&ds));
    }

    #[test]
    fn test_skipped_without_numeric_columns() {
        let ds = Dataset::new(vec![Column::new(
            "c",
            vec![Value::text("a"), Value::text("b"), Value::text("c")],
        )])
        .unwrap();
        let result = run(&ds);
        assert!(result.is_empty());
        assert!(result.scores.is_empty());
        assert_eq!(result.threshold, None);
    }

    #[test]
    fn test_skipped_with_single_row() {
        let ds = Dataset::new(vec![Column::new("x", vec![Value::Number(1.0)])]).unwrap();
        assert_eq!(run(&ds), IsolationForestResult::default());
    }

    #[test]
    fn test_missing_values_imputed() {
        let mut values: Vec<Value> = (0..30).map(|i| Value::Number(i as f64)).collect();
        values[5] = Value::Missing;
        let ds = Dataset::new(vec![
            Column::new("x", values),
            Column::new("empty", vec![Value::Missing; 30]),
        ])
        .unwrap();
        let result = run(&ds);
        assert_eq!(result.scores.len(), 30);
        assert!(result.scores.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_constant_data_flags_nothing() {
        let ds = Dataset::new(vec![Column::new("x", vec![Value::Number(3.0); 20])]).unwrap();
        let result = run(&ds);
        assert_eq!(result.count, 0);
        assert_eq!(result.scores.len(), 20);
    }
}
