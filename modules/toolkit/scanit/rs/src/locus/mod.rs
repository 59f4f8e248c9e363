// Per-locus accumulators. Each scanner flavor owns one of them per cached position.

mod composition;
mod coverage;
mod evidence;
mod mapq;

pub use composition::{Code, Composition};
pub use coverage::DepthCounter;
pub use evidence::{BaseEvidence, CoverageCounts, EvidenceFilter, EvidenceList};
pub use mapq::MapqList;
