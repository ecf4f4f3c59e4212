//! Column kind definitions.

use serde::{Deserialize, Serialize};

/// Analytical kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Every non-missing value reads as a number.
    Numeric,
    /// Anything else: text, mixed content.
    Categorical,
}
