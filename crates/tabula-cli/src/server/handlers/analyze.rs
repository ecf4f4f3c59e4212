//! Upload-and-analyze handler.

use std::path::Path;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tabula::{Parser, Report};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Extensions accepted by the upload endpoint.
const ALLOWED_EXTENSIONS: [&str; 2] = ["csv", "json"];

/// A single uploaded file held in memory.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Analyze the file sent in the `file` field of a multipart form.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Report>, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    tracing::info!(file = %upload.filename, bytes = upload.bytes.len(), "analyzing upload");

    let analyzer = state.analyzer.clone();
    let report = tokio::task::spawn_blocking(move || {
        let parser = Parser::with_config(analyzer.config().parser.clone());
        let (dataset, _source) = parser.parse_named(&upload.filename, &upload.bytes)?;
        analyzer.analyze(&dataset)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Analysis task failed: {e}")))??;

    Ok(Json(report))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::BadRequest("No file selected".to_string()));
        }
        if !has_allowed_extension(&filename) {
            return Err(ApiError::BadRequest(
                "Invalid file type. Only CSV and JSON files are allowed".to_string(),
            ));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
        return Ok(Upload { filename, bytes });
    }

    Err(ApiError::BadRequest("No file provided".to_string()))
}

fn has_allowed_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(has_allowed_extension("data.csv"));
        assert!(has_allowed_extension("DATA.JSON"));
        assert!(!has_allowed_extension("data.tsv"));
        assert!(!has_allowed_extension("data"));
        assert!(!has_allowed_extension("archive.csv.zip"));
    }
}
