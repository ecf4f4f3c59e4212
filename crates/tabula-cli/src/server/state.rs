//! Application state for the web server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tabula::{Analyzer, AnalyzerConfig};

/// Shared application state.
///
/// Requests share only the immutable analyzer; every upload gets its own
/// dataset and report.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    /// When the server started.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state with the default analyzer.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            analyzer: Arc::new(Analyzer::with_config(config)),
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
