//! Statistical primitives and the per-column summarizer.

mod descriptive;
mod distribution;
mod summary;

pub use descriptive::{
    autocorrelation, linear_regression, mean, pearson, population_std, quantile, quantile_sorted,
    sample_std, sorted, variance, LinearFit,
};
pub use distribution::student_t_two_sided;
pub use summary::{CategoricalStats, NumericStats, Overview, StatisticalSummarizer, Summary};
