// Genome-wide substitution error rates estimated from low-frequency mismatches.

mod batch;
mod config;
mod evaluator;
mod matrix;
mod table;

pub use batch::{ErrorRateBatch, ErrorRateReport};
pub use config::{ErrorRateConfig, ErrorRateConfigBuilder};
pub use evaluator::{accumulate, ErrorRateModel, LocusVerdict};
pub use matrix::{ErrorConfusionMatrix, ErrorRow};
pub use table::{write_table, HEADER};
