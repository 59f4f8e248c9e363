// Only the CHROM and POS columns of VCF data lines are used: https://samtools.github.io/hts-specs/VCFv4.3.pdf

mod reader;

pub use reader::{read_region_set, Reader, Site};
