//! CSV/JSON parser with delimiter and format detection.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{Column, Dataset, SourceMetadata};
use super::value::Value;
use crate::error::{Result, TabulaError};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Delimited text with a header row.
    Csv,
    /// Records, columns or nested-columns JSON.
    Json,
}

impl DataFormat {
    /// Determine the format from a file name's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            "" => Err(TabulaError::UnsupportedFormat(
                "file has no extension".to_string(),
            )),
            other => Err(TabulaError::UnsupportedFormat(format!(
                ".{other} (expected .csv or .json)"
            ))),
        }
    }
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses tabular data files into a [`Dataset`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| TabulaError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.parse_named(path, &contents)
    }

    /// Parse in-memory contents, using `name` for format detection and metadata.
    pub fn parse_named(
        &self,
        name: impl AsRef<Path>,
        contents: &[u8],
    ) -> Result<(Dataset, SourceMetadata)> {
        let name = name.as_ref();
        let format = DataFormat::from_path(name)?;

        let mut hasher = Sha256::new();
        hasher.update(contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let (dataset, label) = match format {
            DataFormat::Csv => {
                let delimiter = self.resolve_delimiter(contents)?;
                (self.parse_csv(contents, delimiter)?, delimiter_label(delimiter))
            }
            DataFormat::Json => (self.parse_json(contents)?, "json"),
        };

        debug!(
            source = %name.display(),
            format = label,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "parsed input"
        );

        let metadata = SourceMetadata::new(
            PathBuf::from(name),
            hash,
            contents.len() as u64,
            label.to_string(),
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, metadata))
    }

    /// Parse bytes in a known format.
    pub fn parse_bytes(&self, contents: &[u8], format: DataFormat) -> Result<Dataset> {
        match format {
            DataFormat::Csv => {
                let delimiter = self.resolve_delimiter(contents)?;
                self.parse_csv(contents, delimiter)
            }
            DataFormat::Json => self.parse_json(contents),
        }
    }

    fn resolve_delimiter(&self, contents: &[u8]) -> Result<u8> {
        match self.config.delimiter {
            Some(d) => Ok(d),
            None => detect_delimiter(contents),
        }
    }

    /// Parse delimited text with a header row.
    fn parse_csv(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let raw_headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
            return Err(TabulaError::EmptyData("No columns found".to_string()));
        }
        let headers = normalize_headers(raw_headers);

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if self.config.max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }
            let record = result?;
            rows.push(record.iter().map(Value::parse).collect());
        }

        Ok(Dataset::from_rows(headers, rows)?)
    }

    /// Parse JSON in records (`[{..}]`), columns (`{col: [..]}`) or
    /// nested-columns (`{col: {index: value}}`) orientation.
    fn parse_json(&self, bytes: &[u8]) -> Result<Dataset> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(TabulaError::EmptyData("No JSON content".to_string()));
        }

        let document: serde_json::Value = serde_json::from_slice(bytes)?;
        let dataset = match document {
            serde_json::Value::Array(records) => self.json_records(records)?,
            serde_json::Value::Object(columns) => self.json_columns(columns)?,
            other => {
                return Err(TabulaError::NotTabular(format!(
                    "expected a JSON array or object, found {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(dataset)
    }

    fn json_records(&self, records: Vec<serde_json::Value>) -> Result<Dataset> {
        let limit = self.config.max_rows.unwrap_or(usize::MAX);
        let mut headers: IndexSet<String> = IndexSet::new();
        let mut objects = Vec::with_capacity(records.len().min(limit));

        for (idx, record) in records.into_iter().take(limit).enumerate() {
            let map = match record {
                serde_json::Value::Object(map) => map,
                other => {
                    return Err(TabulaError::NotTabular(format!(
                        "record {idx} is {}, expected an object",
                        json_kind(&other)
                    )))
                }
            };
            headers.extend(map.keys().cloned());
            objects.push(map);
        }

        let columns = headers
            .into_iter()
            .map(|name| {
                let values = objects
                    .iter()
                    .map(|obj| obj.get(&name).map(Value::from_json).unwrap_or(Value::Missing))
                    .collect();
                Column::new(name, values)
            })
            .collect();

        Ok(Dataset::new(columns)?)
    }

    fn json_columns(&self, columns: serde_json::Map<String, serde_json::Value>) -> Result<Dataset> {
        let limit = self.config.max_rows.unwrap_or(usize::MAX);
        let nested = columns.values().any(|v| v.is_object());

        if nested {
            // Union of index labels in order of first appearance.
            let mut index: IndexSet<String> = IndexSet::new();
            for (name, column) in &columns {
                match column {
                    serde_json::Value::Object(cells) => index.extend(cells.keys().cloned()),
                    _ => {
                        return Err(TabulaError::NotTabular(format!(
                            "column '{name}' mixes nested and flat layouts"
                        )))
                    }
                }
            }
            let labels: Vec<String> = index.into_iter().take(limit).collect();

            let built = columns
                .into_iter()
                .map(|(name, column)| {
                    let values = labels
                        .iter()
                        .map(|label| {
                            column
                                .get(label.as_str())
                                .map(Value::from_json)
                                .unwrap_or(Value::Missing)
                        })
                        .collect();
                    Column::new(name, values)
                })
                .collect();
            return Ok(Dataset::new(built)?);
        }

        let mut built = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            let cells = match column {
                serde_json::Value::Array(cells) => cells,
                other => {
                    return Err(TabulaError::NotTabular(format!(
                        "column '{name}' is {}, expected an array",
                        json_kind(&other)
                    )))
                }
            };
            let values = cells.iter().take(limit).map(Value::from_json).collect();
            built.push(Column::new(name, values));
        }

        Dataset::new(built).map_err(|e| TabulaError::NotTabular(e.to_string()))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill blank header names and disambiguate repeated ones (`x`, `x.1`, ...).
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: IndexMap<String, usize> = IndexMap::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (idx, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header
        };

        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{base}.{count}");
        }
        seen.insert(name.clone(), 0);
        headers.push(name);
    }

    headers
}

fn delimiter_label(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(TabulaError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Tab gets a slight bonus as it's rare inside actual values
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
