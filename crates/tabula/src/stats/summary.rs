//! Per-column descriptive statistics and dataset overview.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::descriptive::{mean, quantile_sorted, sample_std, sorted};
use crate::input::{Column, Dataset};
use crate::schema::ColumnClassification;

/// Statistics for a numeric column with at least one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// 25th percentile.
    pub q25: f64,
    /// 75th percentile.
    pub q75: f64,
    /// Number of missing cells.
    pub missing: usize,
    /// Missing cells as a percentage of all rows.
    pub missing_percent: f64,
}

/// Statistics for a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    /// Number of distinct non-missing values.
    pub unique_values: usize,
    /// Most frequent value; ties go to the value seen first.
    pub most_common: Option<String>,
    pub most_common_count: usize,
    pub missing: usize,
    pub missing_percent: f64,
}

/// Dataset-level counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_columns: usize,
    pub categorical_columns: usize,
    /// Missing cells across the whole table.
    pub missing_values: usize,
    /// Rows identical to an earlier row.
    pub duplicate_rows: usize,
}

impl Overview {
    /// Missing cells as a percentage of all cells (0 for an empty table).
    pub fn missing_percent(&self) -> f64 {
        let cells = self.total_rows * self.total_columns;
        percent(self.missing_values, cells)
    }
}

/// Output of the statistical summarizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub overview: Overview,
    pub numeric_stats: IndexMap<String, NumericStats>,
    pub categorical_stats: IndexMap<String, CategoricalStats>,
}

/// Computes descriptive statistics for classified columns.
#[derive(Debug, Clone, Default)]
pub struct StatisticalSummarizer;

impl StatisticalSummarizer {
    pub fn new() -> Self {
        Self
    }

    /// Summarize every classified column plus the dataset overview.
    pub fn summarize(&self, dataset: &Dataset, classes: &ColumnClassification) -> Summary {
        let total_rows = dataset.row_count();

        let numeric_stats = classes
            .numeric_columns(dataset)
            .filter_map(|column| {
                self.numeric_stats(column, total_rows)
                    .map(|stats| (column.name.clone(), stats))
            })
            .collect();

        let categorical_stats = classes
            .categorical_columns(dataset)
            .map(|column| (column.name.clone(), self.categorical_stats(column, total_rows)))
            .collect();

        Summary {
            overview: self.overview(dataset, classes),
            numeric_stats,
            categorical_stats,
        }
    }

    /// Dataset-level overview counts.
    pub fn overview(&self, dataset: &Dataset, classes: &ColumnClassification) -> Overview {
        Overview {
            total_rows: dataset.row_count(),
            total_columns: dataset.column_count(),
            numeric_columns: classes.numeric.len(),
            categorical_columns: classes.categorical.len(),
            missing_values: dataset.missing_count(),
            duplicate_rows: dataset.duplicate_row_count(),
        }
    }

    /// Statistics for one numeric column; `None` when it has no values.
    pub fn numeric_stats(&self, column: &Column, total_rows: usize) -> Option<NumericStats> {
        let values = column.numeric_series();
        let ordered = sorted(&values);
        let missing = column.missing_count();

        Some(NumericStats {
            mean: mean(&values)?,
            median: quantile_sorted(&ordered, 0.5)?,
            std: sample_std(&values),
            min: *ordered.first()?,
            max: *ordered.last()?,
            q25: quantile_sorted(&ordered, 0.25)?,
            q75: quantile_sorted(&ordered, 0.75)?,
            missing,
            missing_percent: percent(missing, total_rows),
        })
    }

    /// Statistics for one categorical column.
    pub fn categorical_stats(&self, column: &Column, total_rows: usize) -> CategoricalStats {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for value in column.values.iter().filter(|v| !v.is_missing()) {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }

        // Strictly-greater keeps the earliest value on ties.
        let mut most_common: Option<(&String, usize)> = None;
        for (value, &count) in &counts {
            if most_common.is_none_or(|(_, best)| count > best) {
                most_common = Some((value, count));
            }
        }

        let missing = column.missing_count();
        CategoricalStats {
            unique_values: counts.len(),
            most_common: most_common.map(|(value, _)| value.clone()),
            most_common_count: most_common.map(|(_, count)| count).unwrap_or(0),
            missing,
            missing_percent: percent(missing, total_rows),
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;

    fn nums(values: &[Option<f64>]) -> Column {
        Column::new(
            "x",
            values
                .iter()
                .map(|v| v.map(Value::Number).unwrap_or(Value::Missing))
                .collect(),
        )
    }

    fn texts(values: &[Option<&str>]) -> Column {
        Column::new(
            "c",
            values
                .iter()
                .map(|v| v.map(Value::text).unwrap_or(Value::Missing))
                .collect(),
        )
    }

    #[test]
    fn test_numeric_stats_basic() {
        let column = nums(&[Some(1.0), Some(2.0), Some(3.0), Some(100.0)]);
        let stats = StatisticalSummarizer::new().numeric_stats(&column, 4).unwrap();

        assert!((stats.mean - 26.5).abs() < 1e-12);
        assert!((stats.median - 2.5).abs() < 1e-12);
        assert!((stats.q25 - 1.75).abs() < 1e-12);
        assert!((stats.q75 - 27.25).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 100.0);
        assert!((stats.std.unwrap() - (7205.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(stats.missing, 0);
    }

    #[test]
    fn test_numeric_stats_with_missing() {
        let column = nums(&[Some(4.0), None, None, Some(6.0)]);
        let stats = StatisticalSummarizer::new().numeric_stats(&column, 4).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.missing, 2);
        assert_eq!(stats.missing_percent, 50.0);
    }

    #[test]
    fn test_numeric_stats_single_value_has_no_std() {
        let column = nums(&[Some(4.0), None]);
        let stats = StatisticalSummarizer::new().numeric_stats(&column, 2).unwrap();
        assert_eq!(stats.std, None);
        assert_eq!(stats.q25, 4.0);
    }

    #[test]
    fn test_numeric_stats_absent_without_values() {
        let column = nums(&[None, None]);
        assert!(StatisticalSummarizer::new().numeric_stats(&column, 2).is_none());
    }

    #[test]
    fn test_categorical_most_common_tie_first_seen() {
        let column = texts(&[Some("b"), Some("a"), Some("a"), Some("b"), None]);
        let stats = StatisticalSummarizer::new().categorical_stats(&column, 5);
        assert_eq!(stats.unique_values, 2);
        assert_eq!(stats.most_common.as_deref(), Some("b"));
        assert_eq!(stats.most_common_count, 2);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.missing_percent, 20.0);
    }

    #[test]
    fn test_categorical_all_missing() {
        let column = texts(&[None, None]);
        let stats = StatisticalSummarizer::new().categorical_stats(&column, 2);
        assert_eq!(stats.unique_values, 0);
        assert_eq!(stats.most_common, None);
        assert_eq!(stats.most_common_count, 0);
    }

    #[test]
    fn test_summarize_overview() {
        let ds = Dataset::new(vec![
            Column::new("n", vec![Value::Number(1.0), Value::Number(1.0), Value::Missing]),
            Column::new("c", vec![Value::text("x"), Value::text("x"), Value::text("y")]),
        ])
        .unwrap();
        let classes = ColumnClassification::of(&ds);
        let summary = StatisticalSummarizer::new().summarize(&ds, &classes);

        assert_eq!(summary.overview.total_rows, 3);
        assert_eq!(summary.overview.numeric_columns, 1);
        assert_eq!(summary.overview.categorical_columns, 1);
        assert_eq!(summary.overview.missing_values, 1);
        assert_eq!(summary.overview.duplicate_rows, 1);
        assert!((summary.overview.missing_percent() - 100.0 / 6.0).abs() < 1e-9);
        assert!(summary.numeric_stats.contains_key("n"));
        assert!(summary.categorical_stats.contains_key("c"));
    }
}
