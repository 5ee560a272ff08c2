//! Model fitting and evaluation algorithms.

pub mod classical;
pub mod evaluation;

pub use classical::LogisticRegression;
pub use evaluation::{ClassificationMetrics, ConfusionCounts, SplitIndices, train_test_split};
