//! Natural-language findings derived from the other pipeline stages.

use serde::{Deserialize, Serialize};

use crate::anomaly::Anomalies;
use crate::correlation::Correlation;
use crate::pattern::Pattern;
use crate::stats::Overview;

/// Kind of insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Warning,
    Info,
}

/// What an insight is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Anomalies,
    DataQuality,
    Patterns,
}

impl InsightCategory {
    pub fn label(&self) -> &'static str {
        match self {
            InsightCategory::Anomalies => "Anomalies",
            InsightCategory::DataQuality => "Data Quality",
            InsightCategory::Patterns => "Patterns",
        }
    }
}

/// Severity level of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub category: InsightCategory,
    pub message: String,
    pub severity: Severity,
}

impl Insight {
    pub fn new(
        insight_type: InsightType,
        category: InsightCategory,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            insight_type,
            category,
            message: message.into(),
            severity,
        }
    }
}

/// Severity cut-offs for [`InsightSynthesizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct InsightConfig {
    /// Flagged share of rows (percent) above which anomalies are high severity.
    pub anomaly_high_percent: f64,
    /// Missing share of cells (percent) above which missing data is high severity.
    pub missing_high_percent: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            anomaly_high_percent: 10.0,
            missing_high_percent: 10.0,
        }
    }
}

/// Everything the synthesizer reads.
#[derive(Debug, Clone, Copy)]
pub struct InsightInput<'a> {
    pub overview: &'a Overview,
    pub anomalies: &'a Anomalies,
    pub correlations: &'a [Correlation],
    pub patterns: &'a [Pattern],
}

/// Turns stage outputs into an ordered list of insights.
///
/// Only the isolation-forest flags feed the anomaly insight; per-column
/// z-score and IQR outliers are reported in the anomaly section alone.
#[derive(Debug, Clone, Default)]
pub struct InsightSynthesizer {
    config: InsightConfig,
}

impl InsightSynthesizer {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(&self, input: &InsightInput<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();

        let flagged = input.anomalies.isolation_forest.indices.len();
        if flagged > 0 {
            let rows = input.overview.total_rows as f64;
            let severity = if flagged as f64 > rows * self.config.anomaly_high_percent / 100.0 {
                Severity::High
            } else {
                Severity::Medium
            };
            insights.push(Insight::new(
                InsightType::Warning,
                InsightCategory::Anomalies,
                severity,
                format!("Detected {flagged} anomalous data points using Isolation Forest"),
            ));
        }

        let missing = input.overview.missing_values;
        if missing > 0 {
            let percent = input.overview.missing_percent();
            let severity = if percent > self.config.missing_high_percent {
                Severity::High
            } else {
                Severity::Low
            };
            insights.push(Insight::new(
                InsightType::Warning,
                InsightCategory::DataQuality,
                severity,
                format!("{missing} missing values found ({percent:.1}% of total data)"),
            ));
        }

        if !input.correlations.is_empty() {
            insights.push(Insight::new(
                InsightType::Info,
                InsightCategory::Patterns,
                Severity::Info,
                format!(
                    "Found {} strong correlations between variables",
                    input.correlations.len()
                ),
            ));
        }

        for pattern in input.patterns {
            insights.push(Insight::new(
                InsightType::Info,
                InsightCategory::Patterns,
                Severity::Info,
                format!("{} in column '{}'", pattern.description(), pattern.column()),
            ));
        }

        insights
    }
}
