//! Tabula: automated analysis of tabular datasets.
//!
//! Tabula takes a CSV or JSON table and produces a single serializable
//! report: descriptive statistics, anomalies found by three independent
//! methods, strong correlations, trend and cyclical patterns, and short
//! natural-language insights derived from all of them.
//!
//! # Pipeline
//!
//! ```text
//! Dataset ─► classify ─► summary ─┐
//!                     ├► anomalies ┤
//!                     ├► correlations ─► insights ─► Report
//!                     └► patterns ─┘
//! ```
//!
//! The pipeline is pure and synchronous. Loading is a separate step
//! ([`Parser`]) so the analysis itself never touches the file system.
//!
//! # Example
//!
//! ```no_run
//! use tabula::{Analyzer, Parser};
//!
//! let (dataset, _source) = Parser::new().parse_file("measurements.csv").unwrap();
//! let report = Analyzer::new().analyze(&dataset).unwrap();
//!
//! for insight in &report.insights {
//!     println!("[{}] {}", insight.severity.label(), insight.message);
//! }
//! ```

pub mod anomaly;
pub mod correlation;
pub mod error;
pub mod input;
pub mod insight;
pub mod pattern;
pub mod report;
pub mod schema;
pub mod stats;

mod analyzer;

pub use crate::analyzer::{Analyzer, AnalyzerConfig};
pub use anomaly::{AnomalyDetector, AnomalyResult, Anomalies, DetectorInput};
pub use correlation::Correlation;
pub use error::{DatasetError, Result, TabulaError};
pub use input::{Column, DataFormat, Dataset, Parser, ParserConfig, SourceMetadata, Value};
pub use insight::{Insight, InsightCategory, InsightType, Severity};
pub use pattern::Pattern;
pub use report::Report;
pub use schema::{ColumnClassification, ColumnKind};
pub use stats::{CategoricalStats, NumericStats, Overview};
