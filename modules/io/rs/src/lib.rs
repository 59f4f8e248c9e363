pub mod bam;
pub mod bed;
pub mod compression;
pub mod fasta;
pub mod track;
mod traits;
pub mod vcf;

pub use traits::{ReadRecord, WriteRecord};
