//! Numeric/categorical partition of a dataset's columns.

use serde::{Deserialize, Serialize};

use super::types::ColumnKind;
use crate::input::{Column, Dataset};

/// Disjoint, exhaustive split of column names by kind, in dataset order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClassification {
    /// Classify every column of the dataset.
    pub fn of(dataset: &Dataset) -> Self {
        let mut classification = Self::default();
        for column in dataset.columns() {
            match classify_column(column) {
                ColumnKind::Numeric => classification.numeric.push(column.name.clone()),
                ColumnKind::Categorical => classification.categorical.push(column.name.clone()),
            }
        }
        classification
    }

    /// Numeric columns resolved against the dataset.
    pub fn numeric_columns<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a Column> {
        self.numeric.iter().filter_map(move |name| dataset.column(name))
    }

    /// Categorical columns resolved against the dataset.
    pub fn categorical_columns<'a>(
        &'a self,
        dataset: &'a Dataset,
    ) -> impl Iterator<Item = &'a Column> {
        self.categorical.iter().filter_map(move |name| dataset.column(name))
    }
}

/// A column is numeric iff all of its non-missing values parse as numbers.
///
/// A column with no values at all is numeric; it simply yields no statistics.
pub fn classify_column(column: &Column) -> ColumnKind {
    let all_numeric = column
        .values
        .iter()
        .filter(|v| !v.is_missing())
        .all(|v| v.as_f64().is_some());

    if all_numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}
