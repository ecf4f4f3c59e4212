//! Service information and health handlers.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::app::MAX_UPLOAD_BYTES;
use crate::server::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Describe the API.
pub async fn info() -> Json<Value> {
    Json(json!({
        "name": "Tabula Analysis API",
        "version": VERSION,
        "status": "running",
        "description": "Upload CSV or JSON files to detect patterns, anomalies, and insights",
        "endpoints": {
            "GET /": "API information (this page)",
            "GET /api/health": "Health check",
            "POST /api/analyze": "Upload and analyze data file (multipart/form-data)"
        },
        "supported_formats": ["CSV", "JSON"],
        "max_file_size": format!("{}MB", MAX_UPLOAD_BYTES / (1024 * 1024)),
        "features": [
            "Anomaly Detection (Isolation Forest, Z-Score, IQR)",
            "Pattern Recognition (Trends, Cycles)",
            "Correlation Analysis",
            "Statistical Insights"
        ]
    }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub uptime_seconds: i64,
}

/// Health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    Json(HealthResponse {
        status: "healthy",
        timestamp: now,
        version: VERSION,
        uptime_seconds: (now - state.started_at).num_seconds(),
    })
}
