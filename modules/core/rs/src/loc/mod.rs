pub use chromosome::Chromosome;
pub use interval::{Interval, IntervalOp};
pub use per_strand::PerStrand;
pub use strand::Strand;

mod chromosome;
mod interval;
mod per_strand;
mod strand;
