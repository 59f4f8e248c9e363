use derive_getters::Getters;
use derive_more::Constructor;

use lociscan_core_rs::loc::{PerStrand, Strand};
use lociscan_core_rs::ngs::Base;

/// A single read base observed at a locus.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Constructor, Getters)]
pub struct BaseEvidence {
    base: Base,
    strand: Strand,
    /// Phred base quality, `u8::MAX` when the read has no qualities.
    quality: u8,
    mapq: u8,
    /// Distance to the first sequenced base of the read.
    from_start: u32,
    /// Distance to the last sequenced base of the read.
    from_end: u32,
}

impl BaseEvidence {
    /// Evidence for the base at `ind` of an aligned read with `length` bases. Distances are
    /// measured in the sequencing direction, so they are swapped for reverse strand reads.
    pub fn at(base: Base, strand: Strand, quality: u8, mapq: u8, ind: usize, length: usize) -> Self {
        let left = ind as u32;
        let right = length.saturating_sub(ind + 1) as u32;
        let (from_start, from_end) = match strand {
            Strand::Forward => (left, right),
            Strand::Reverse => (right, left),
        };
        Self::new(base, strand, quality, mapq, from_start, from_end)
    }
}

/// Thresholds applied to [BaseEvidence] when a locus is finalized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Constructor, Getters)]
pub struct EvidenceFilter {
    min_base_quality: u8,
    min_mapq: u8,
    min_from_start: u32,
    min_from_end: u32,
}

impl EvidenceFilter {
    #[inline]
    pub fn passes(&self, evidence: &BaseEvidence) -> bool {
        evidence.quality >= self.min_base_quality
            && evidence.mapq >= self.min_mapq
            && evidence.from_start >= self.min_from_start
            && evidence.from_end >= self.min_from_end
    }
}

/// Filtered per-strand base counts of a locus.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CoverageCounts {
    /// Passing evidence per strand, indexed by [Base::index].
    pub counts: PerStrand<[u32; Base::COUNT]>,
    /// Largest distance from the nearest read edge among passing evidence, per base.
    pub max_edge_distance: [u32; Base::COUNT],
}

impl CoverageCounts {
    /// Strand-agnostic counts.
    pub fn combined(&self) -> [u32; Base::COUNT] {
        let mut result = self.counts.forward;
        for (slot, reverse) in result.iter_mut().zip(self.counts.reverse) {
            *slot += reverse;
        }
        result
    }

    pub fn total(&self) -> u32 {
        self.combined().iter().sum()
    }
}

/// Raw evidence list of a locus. Filtering is postponed until the locus is finalized.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct EvidenceList {
    items: Vec<BaseEvidence>,
}

impl EvidenceList {
    #[inline]
    pub fn push(&mut self, evidence: BaseEvidence) {
        self.items.push(evidence);
    }

    /// Number of reads contributing to the locus before any filtering.
    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[BaseEvidence] {
        &self.items
    }

    pub fn coverage_counts(&self, filter: &EvidenceFilter) -> CoverageCounts {
        let mut result = CoverageCounts::default();
        for evidence in self.items.iter().filter(|x| filter.passes(x)) {
            let ind = evidence.base.index();
            result.counts.get_mut(evidence.strand)[ind] += 1;

            let edge = evidence.from_start.min(evidence.from_end);
            result.max_edge_distance[ind] = result.max_edge_distance[ind].max(edge);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_distances() {
        for (strand, ind, expected) in [
            (Strand::Forward, 0, (0, 9)),
            (Strand::Forward, 3, (3, 6)),
            (Strand::Reverse, 3, (6, 3)),
            (Strand::Reverse, 9, (0, 9)),
        ] {
            let evidence = BaseEvidence::at(Base::A, strand, 30, 60, ind, 10);
            assert_eq!(
                (*evidence.from_start(), *evidence.from_end()),
                expected,
                "{strand} {ind}"
            );
        }
    }

    #[test]
    fn test_coverage_counts() {
        let mut list = EvidenceList::default();
        for (base, strand, quality, mapq, ind) in [
            (Base::A, Strand::Forward, 30, 60, 5),
            (Base::A, Strand::Reverse, 30, 60, 2),
            (Base::T, Strand::Reverse, 30, 60, 4),
            // Low base quality
            (Base::A, Strand::Forward, 10, 60, 5),
            // Low mapping quality
            (Base::G, Strand::Forward, 30, 5, 5),
            // Too close to the read start
            (Base::C, Strand::Forward, 30, 60, 0),
        ] {
            list.push(BaseEvidence::at(base, strand, quality, mapq, ind, 10));
        }
        assert_eq!(list.depth(), 6);

        let counts = list.coverage_counts(&EvidenceFilter::new(20, 10, 1, 0));
        assert_eq!(counts.counts.forward, [1, 0, 0, 0, 0]);
        assert_eq!(counts.counts.reverse, [1, 1, 0, 0, 0]);
        assert_eq!(counts.combined(), [2, 1, 0, 0, 0]);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.max_edge_distance, [4, 4, 0, 0, 0]);

        let counts = list.coverage_counts(&EvidenceFilter::default());
        assert_eq!(counts.total(), 6);
    }
}
