//! Strong pairwise correlations between numeric columns.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input::{Column, Dataset};
use crate::schema::ColumnClassification;
use crate::stats::pearson;

/// Configuration for [`CorrelationFinder`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationConfig {
    /// Minimum `|r|` for a pair to be reported.
    pub threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

/// A strongly correlated column pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub column1: String,
    pub column2: String,
    /// Pearson coefficient over rows where both columns have a value.
    pub correlation: f64,
    /// "strong positive" or "strong negative".
    pub strength: String,
}

/// Finds numeric column pairs whose Pearson correlation reaches the threshold.
#[derive(Debug, Clone, Default)]
pub struct CorrelationFinder {
    config: CorrelationConfig,
}

impl CorrelationFinder {
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    /// Pairs `(i, j)` with `i < j` in numeric column order.
    pub fn find(&self, dataset: &Dataset, classes: &ColumnClassification) -> Vec<Correlation> {
        let columns: Vec<&Column> = classes.numeric_columns(dataset).collect();
        if columns.len() < 2 {
            return Vec::new();
        }

        let mut found = Vec::new();
        for (i, a) in columns.iter().enumerate() {
            for b in &columns[i + 1..] {
                let Some(r) = pairwise_pearson(a, b) else {
                    continue;
                };
                if r.abs() >= self.config.threshold {
                    found.push(Correlation {
                        column1: a.name.clone(),
                        column2: b.name.clone(),
                        correlation: r,
                        strength: strength_label(r).to_string(),
                    });
                }
            }
        }

        debug!(pairs = found.len(), "correlations found");
        found
    }
}

fn strength_label(r: f64) -> &'static str {
    if r > 0.0 {
        "strong positive"
    } else {
        "strong negative"
    }
}

/// Pearson correlation over pairwise-complete rows.
fn pairwise_pearson(a: &Column, b: &Column) -> Option<f64> {
    let (x, y): (Vec<f64>, Vec<f64>) = a
        .values
        .iter()
        .zip(&b.values)
        .filter_map(|(u, v)| Some((u.as_f64()?, v.as_f64()?)))
        .unzip();
    pearson(&x, &y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;

    fn column(name: &str, values: &[Option<f64>]) -> Column {
        Column::new(
            name,
            values
                .iter()
                .map(|v| v.map(Value::Number).unwrap_or(Value::Missing))
                .collect(),
        )
    }

    fn find(columns: Vec<Column>) -> Vec<Correlation> {
        let ds = Dataset::new(columns).unwrap();
        let classes = ColumnClassification::of(&ds);
        CorrelationFinder::default().find(&ds, &classes)
    }

    #[test]
    fn test_identical_columns() {
        let values: Vec<Option<f64>> = (0..10).map(|i| Some((i * i) as f64)).collect();
        let found = find(vec![column("a", &values), column("b", &values)]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column1, "a");
        assert_eq!(found[0].column2, "b");
        assert!((found[0].correlation - 1.0).abs() < 1e-9);
        assert_eq!(found[0].strength, "strong positive");
    }

    #[test]
    fn test_identical_large_magnitude_columns() {
        let values: Vec<Option<f64>> = (1..=10).map(|i| Some(i as f64 * 1e100)).collect();
        let found = find(vec![column("a", &values), column("b", &values)]);
        assert_eq!(found.len(), 1);
        assert!((found[0].correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_correlation() {
        let a: Vec<Option<f64>> = (0..10).map(|i| Some(i as f64)).collect();
        let b: Vec<Option<f64>> = (0..10).map(|i| Some(-3.0 * i as f64 + 1.0)).collect();
        let found = find(vec![column("a", &a), column("b", &b)]);
        assert_eq!(found[0].strength, "strong negative");
    }

    #[test]
    fn test_weak_pairs_omitted() {
        let a = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0)];
        let b = [Some(2.0), Some(-1.0), Some(4.0), Some(0.0), Some(3.0), Some(1.0)];
        assert!(find(vec![column("a", &a), column("b", &b)]).is_empty());
    }

    #[test]
    fn test_pairwise_complete_rows() {
        let a = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
        let b = [Some(2.0), None, Some(100.0), Some(8.0), Some(10.0)];
        let found = find(vec![column("a", &a), column("b", &b)]);
        assert_eq!(found.len(), 1);
        assert!((found[0].correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_column_skipped() {
        let a = [Some(1.0), Some(2.0), Some(3.0)];
        let b = [Some(7.0), Some(7.0), Some(7.0)];
        assert!(find(vec![column("a", &a), column("b", &b)]).is_empty());
    }

    #[test]
    fn test_single_numeric_column() {
        let a = [Some(1.0), Some(2.0)];
        let c = Column::new("c", vec![Value::text("x"), Value::text("y")]);
        assert!(find(vec![column("a", &a), c]).is_empty());
    }
}
