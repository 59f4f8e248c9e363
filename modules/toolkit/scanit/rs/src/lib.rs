pub use cache::LocusCache;
pub use config::{ReadFilter, ScanConfig, ScanConfigBuilder, TrimConfig};
pub use mapping::{map_positions, overlap_start, ReadLayout, ReadPosition};
pub use scanner::{ChromosomeContext, ChromosomeScanner, LocusModel, ScanRead, ScanState};
pub use sink::{DenseSink, Discard, LocusSink, TrackSink};
pub use stats::ScanStats;
pub use trimming::{EdgeTrimmer, TrimmedRead};

mod cache;
mod config;
pub mod error_rate;
pub mod locus;
mod mapping;
pub mod models;
pub mod run;
mod scanner;
mod sink;
mod stats;
mod trimming;
