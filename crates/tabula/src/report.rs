//! The analysis report and its assembly.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::anomaly::Anomalies;
use crate::correlation::Correlation;
use crate::input::{Dataset, Value};
use crate::insight::Insight;
use crate::pattern::Pattern;
use crate::stats::{CategoricalStats, NumericStats, Overview, Summary};

/// One preview row, column name to cell value.
pub type PreviewRow = IndexMap<String, Value>;

/// Complete output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Always "success"; failures never produce a report.
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub overview: Overview,
    pub numeric_stats: IndexMap<String, NumericStats>,
    pub categorical_stats: IndexMap<String, CategoricalStats>,
    pub anomalies: Anomalies,
    pub correlations: Vec<Correlation>,
    pub patterns: Vec<Pattern>,
    pub insights: Vec<Insight>,
    /// The first rows of the dataset.
    pub data_preview: Vec<PreviewRow>,
    pub column_names: Vec<String>,
}

impl Report {
    pub const STATUS_SUCCESS: &'static str = "success";

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Stage outputs handed to the assembler.
#[derive(Debug, Clone)]
pub struct ReportParts {
    pub summary: Summary,
    pub anomalies: Anomalies,
    pub correlations: Vec<Correlation>,
    pub patterns: Vec<Pattern>,
    pub insights: Vec<Insight>,
}

/// Composes stage outputs and a preview of the dataset into a [`Report`].
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    preview_rows: usize,
}

impl ReportAssembler {
    pub fn new(preview_rows: usize) -> Self {
        Self { preview_rows }
    }

    pub fn assemble(&self, dataset: &Dataset, parts: ReportParts) -> Report {
        let ReportParts {
            summary,
            anomalies,
            correlations,
            patterns,
            insights,
        } = parts;

        Report {
            status: Report::STATUS_SUCCESS,
            timestamp: Utc::now(),
            overview: summary.overview,
            numeric_stats: summary.numeric_stats,
            categorical_stats: summary.categorical_stats,
            anomalies,
            correlations,
            patterns,
            insights,
            data_preview: self.preview(dataset),
            column_names: dataset.column_names().into_iter().map(String::from).collect(),
        }
    }

    fn preview(&self, dataset: &Dataset) -> Vec<PreviewRow> {
        let rows = dataset.row_count().min(self.preview_rows);
        (0..rows)
            .map(|idx| {
                dataset
                    .columns()
                    .iter()
                    .map(|c| (c.name.clone(), c.values[idx].clone()))
                    .collect()
            })
            .collect()
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(10)
    }
}
