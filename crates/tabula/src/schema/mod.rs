//! Column classification.

mod classification;
mod types;

pub use classification::{classify_column, ColumnClassification};
pub use types::ColumnKind;
