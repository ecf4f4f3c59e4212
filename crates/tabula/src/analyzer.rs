//! Pipeline driver and public analysis API.

use std::path::Path;

use tracing::{debug, info};

use crate::anomaly::{
    AnomalyEngine, DetectorInput, IqrConfig, IsolationForestConfig, ZScoreConfig,
};
use crate::correlation::{CorrelationConfig, CorrelationFinder};
use crate::error::{Result, TabulaError};
use crate::input::{Dataset, Parser, ParserConfig, SourceMetadata};
use crate::insight::{InsightConfig, InsightInput, InsightSynthesizer};
use crate::pattern::{PatternConfig, PatternDetector};
use crate::report::{Report, ReportAssembler, ReportParts};
use crate::schema::ColumnClassification;
use crate::stats::{StatisticalSummarizer, Summary};

pub const ZSCORE_THRESHOLD: f64 = 3.0;
pub const IQR_MULTIPLIER: f64 = 1.5;
pub const IQR_MIN_VALUES: usize = 4;
pub const CORRELATION_THRESHOLD: f64 = 0.7;
pub const TREND_R_THRESHOLD: f64 = 0.7;
pub const TREND_HIGH_CONFIDENCE_R: f64 = 0.85;
pub const TREND_P_VALUE: f64 = 0.05;
pub const CYCLICAL_THRESHOLD: f64 = 0.7;
pub const CONTAMINATION_MIN: f64 = 0.01;
pub const CONTAMINATION_MAX: f64 = 0.1;
pub const CONTAMINATION_SCALE: f64 = 10.0;
pub const FOREST_SEED: u64 = 42;
pub const FOREST_TREES: usize = 100;
pub const PREVIEW_ROWS: usize = 10;

/// Configuration for an [`Analyzer`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Parser configuration used by [`Analyzer::analyze_file`].
    pub parser: ParserConfig,
    pub isolation_forest: IsolationForestConfig,
    pub zscore: ZScoreConfig,
    pub iqr: IqrConfig,
    pub correlation: CorrelationConfig,
    pub pattern: PatternConfig,
    pub insight: InsightConfig,
    /// Rows included in the report preview.
    pub preview_rows: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            isolation_forest: IsolationForestConfig {
                trees: FOREST_TREES,
                seed: FOREST_SEED,
                contamination_scale: CONTAMINATION_SCALE,
                contamination_min: CONTAMINATION_MIN,
                contamination_max: CONTAMINATION_MAX,
                ..IsolationForestConfig::default()
            },
            zscore: ZScoreConfig {
                threshold: ZSCORE_THRESHOLD,
                ..ZScoreConfig::default()
            },
            iqr: IqrConfig {
                multiplier: IQR_MULTIPLIER,
                min_values: IQR_MIN_VALUES,
            },
            correlation: CorrelationConfig {
                threshold: CORRELATION_THRESHOLD,
            },
            pattern: PatternConfig {
                trend_r_threshold: TREND_R_THRESHOLD,
                trend_high_confidence_r: TREND_HIGH_CONFIDENCE_R,
                trend_p_value: TREND_P_VALUE,
                cyclical_threshold: CYCLICAL_THRESHOLD,
                ..PatternConfig::default()
            },
            insight: InsightConfig::default(),
            preview_rows: PREVIEW_ROWS,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_isolation_forest(mut self, config: IsolationForestConfig) -> Self {
        self.isolation_forest = config;
        self
    }

    /// Set the z-score cut-off.
    pub fn with_zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore.threshold = threshold;
        self
    }

    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr.multiplier = multiplier;
        self
    }

    pub fn with_correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation.threshold = threshold;
        self
    }

    pub fn with_pattern(mut self, config: PatternConfig) -> Self {
        self.pattern = config;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }
}

/// The analysis pipeline.
///
/// Stages run in a fixed order: classification, summary, anomaly
/// detection, correlations, patterns, insights and finally report assembly.
/// Insufficient data for a stage leaves its result empty; any other stage
/// failure aborts the analysis with [`TabulaError::Analysis`].
///
/// ```no_run
/// use tabula::Analyzer;
///
/// let (report, source) = Analyzer::new().analyze_file("data.csv").unwrap();
/// println!("{} rows from {}", report.overview.total_rows, source.file);
/// ```
pub struct Analyzer {
    config: AnalyzerConfig,
    summarizer: StatisticalSummarizer,
    anomalies: AnomalyEngine,
    correlations: CorrelationFinder,
    patterns: PatternDetector,
    insights: InsightSynthesizer,
    assembler: ReportAssembler,
}

impl Analyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            summarizer: StatisticalSummarizer::new(),
            anomalies: AnomalyEngine::new(
                config.isolation_forest.clone(),
                config.zscore.clone(),
                config.iqr.clone(),
            ),
            correlations: CorrelationFinder::new(config.correlation.clone()),
            patterns: PatternDetector::new(config.pattern.clone()),
            insights: InsightSynthesizer::new(config.insight.clone()),
            assembler: ReportAssembler::new(config.preview_rows),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run the full pipeline over an in-memory dataset.
    pub fn analyze(&self, dataset: &Dataset) -> Result<Report> {
        let classes = ColumnClassification::of(dataset);
        debug!(
            numeric = classes.numeric.len(),
            categorical = classes.categorical.len(),
            "columns classified"
        );

        let summary = self.summarizer.summarize(dataset, &classes);
        check_summary(&summary)?;

        let anomalies = self
            .anomalies
            .detect(&DetectorInput::new(dataset, &classes))?;
        let correlations = self.correlations.find(dataset, &classes);
        let patterns = self.patterns.detect(dataset, &classes);

        let insights = self.insights.synthesize(&InsightInput {
            overview: &summary.overview,
            anomalies: &anomalies,
            correlations: &correlations,
            patterns: &patterns,
        });

        info!(
            rows = summary.overview.total_rows,
            columns = summary.overview.total_columns,
            flagged = anomalies.isolation_forest.count,
            correlations = correlations.len(),
            patterns = patterns.len(),
            insights = insights.len(),
            "analysis complete"
        );

        Ok(self.assembler.assemble(
            dataset,
            ReportParts {
                summary,
                anomalies,
                correlations,
                patterns,
                insights,
            },
        ))
    }

    /// Load a CSV or JSON file and analyze it.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<(Report, SourceMetadata)> {
        let parser = Parser::with_config(self.config.parser.clone());
        let (dataset, source) = parser.parse_file(path)?;
        let report = self.analyze(&dataset)?;
        Ok((report, source))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject statistics that overflowed.
fn check_summary(summary: &Summary) -> Result<()> {
    for (name, stats) in &summary.numeric_stats {
        let fields = [
            stats.mean,
            stats.median,
            stats.min,
            stats.max,
            stats.q25,
            stats.q75,
            stats.std.unwrap_or(0.0),
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(TabulaError::analysis(
                "summary",
                format!("numeric overflow in column '{name}'"),
            ));
        }
    }
    Ok(())
}
