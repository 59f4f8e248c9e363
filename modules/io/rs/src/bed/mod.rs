// Format specification: https://samtools.github.io/hts-specs/BEDv1.pdf
// Only the three mandatory fields are used, any extra columns are ignored.

mod reader;
mod record;

pub use reader::{read_region_set, Reader};
pub use record::Bed3;
