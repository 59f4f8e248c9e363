use std::fmt::Display;

use derive_getters::Getters;

/// Counters collected during a single scan.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Getters)]
pub struct ScanStats {
    /// Records read from the stream.
    pub(crate) records: u64,
    /// Records rejected by the read filter or the flavor eligibility predicate.
    pub(crate) filtered: u64,
    /// Records handed over to the locus model.
    pub(crate) used: u64,
    pub(crate) chromosomes_scanned: usize,
    /// Chromosomes without eligible records, emitted with default values.
    pub(crate) chromosomes_swept: usize,
    pub(crate) loci_emitted: u64,
    pub(crate) loci_failed: u64,
    pub(crate) late_contributions: u64,
    pub(crate) malformed_ops: u64,
}

impl ScanStats {
    pub fn merge(&mut self, other: &ScanStats) {
        self.records += other.records;
        self.filtered += other.filtered;
        self.used += other.used;
        self.chromosomes_scanned += other.chromosomes_scanned;
        self.chromosomes_swept += other.chromosomes_swept;
        self.loci_emitted += other.loci_emitted;
        self.loci_failed += other.loci_failed;
        self.late_contributions += other.late_contributions;
        self.malformed_ops += other.malformed_ops;
    }
}

impl Display for ScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "records: {} (filtered {}, used {}); chromosomes: {} scanned, {} empty; loci: {} emitted, {} failed",
            self.records,
            self.filtered,
            self.used,
            self.chromosomes_scanned,
            self.chromosomes_swept,
            self.loci_emitted,
            self.loci_failed
        )?;
        if self.late_contributions > 0 || self.malformed_ops > 0 {
            write!(
                f,
                "; late contributions: {}, malformed CIGAR operations: {}",
                self.late_contributions, self.malformed_ops
            )?;
        }
        Ok(())
    }
}
