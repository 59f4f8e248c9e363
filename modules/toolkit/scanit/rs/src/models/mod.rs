// Scanner flavors producing numeric tracks.

mod coverage;
mod entropy;
mod mapq;

pub use coverage::CoverageModel;
pub use entropy::EntropyModel;
pub use mapq::MapqModel;
