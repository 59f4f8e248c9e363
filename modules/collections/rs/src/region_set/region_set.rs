use ahash::AHashMap;
use derive_getters::Dissolve;

use lociscan_core_rs::loc::{Interval, IntervalOp};

/// A set of genomic regions indexed by sequence name. Regions use 0-based half-open coordinates,
/// overlapping and touching regions are merged on construction.
#[derive(Clone, PartialEq, Eq, Debug, Default, Dissolve)]
pub struct RegionSet {
    index: AHashMap<String, Vec<Interval<u64>>>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of sequences with at least one region.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Add regions for the given sequence and restore the sorted non-overlapping layout.
    pub fn extend(&mut self, seqid: &str, regions: impl IntoIterator<Item = Interval<u64>>) {
        let entry = self.index.entry(seqid.to_owned()).or_default();
        entry.extend(regions);
        let merged = Interval::merge(entry);
        if merged.is_empty() {
            self.index.remove(seqid);
        } else {
            *entry = merged;
        }
    }

    /// Sorted non-overlapping regions for the sequence, if any.
    pub fn regions(&self, seqid: &str) -> Option<&[Interval<u64>]> {
        self.index.get(seqid).map(|x| x.as_slice())
    }

    /// Whether the 0-based position lies inside any region of the sequence.
    pub fn contains(&self, seqid: &str, position: u64) -> bool {
        let Some(regions) = self.index.get(seqid) else {
            return false;
        };
        // First region that ends after the position is the only candidate
        let ind = regions.partition_point(|x| x.end() <= position);
        regions.get(ind).is_some_and(|x| x.contains(position))
    }

    /// Whether the 1-based position lies inside any region of the sequence.
    pub fn contains_one_based(&self, seqid: &str, position: u32) -> bool {
        position >= 1 && self.contains(seqid, position as u64 - 1)
    }
}

impl<S: AsRef<str>> FromIterator<(S, Interval<u64>)> for RegionSet {
    fn from_iter<T: IntoIterator<Item = (S, Interval<u64>)>>(iter: T) -> Self {
        let mut raw: AHashMap<String, Vec<Interval<u64>>> = AHashMap::new();
        for (seqid, interval) in iter {
            let seqid = seqid.as_ref();
            match raw.get_mut(seqid) {
                Some(regions) => regions.push(interval),
                None => {
                    raw.insert(seqid.to_owned(), vec![interval]);
                }
            }
        }

        let index = raw
            .into_iter()
            .map(|(seqid, mut regions)| (seqid, Interval::merge(&mut regions)))
            .collect();
        Self { index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::Result;

    #[test]
    fn test_region_set_contains() -> Result<()> {
        let regions: RegionSet = [
            ("chr1", Interval::new(10, 20)?),
            ("chr1", Interval::new(15, 30)?),
            ("chr1", Interval::new(40, 41)?),
            ("chr2", Interval::new(0, 5)?),
        ]
        .into_iter()
        .collect();

        assert_eq!(regions.len(), 2);
        assert_eq!(
            regions.regions("chr1"),
            Some([Interval::new(10, 30)?, Interval::new(40, 41)?].as_slice())
        );

        for (seqid, pos, expected) in [
            ("chr1", 9, false),
            ("chr1", 10, true),
            ("chr1", 29, true),
            ("chr1", 30, false),
            ("chr1", 40, true),
            ("chr1", 41, false),
            ("chr2", 0, true),
            ("chr2", 5, false),
            ("chr3", 0, false),
        ] {
            assert_eq!(regions.contains(seqid, pos), expected, "{seqid}:{pos}");
        }

        assert!(!regions.contains_one_based("chr2", 0));
        assert!(regions.contains_one_based("chr2", 1));
        assert!(regions.contains_one_based("chr2", 5));
        assert!(!regions.contains_one_based("chr2", 6));
        Ok(())
    }

    #[test]
    fn test_region_set_extend() -> Result<()> {
        let mut regions = RegionSet::new();
        assert!(regions.is_empty());

        regions.extend("chrM", [Interval::new(100, 200)?]);
        regions.extend("chrM", [Interval::new(0, 50)?, Interval::new(50, 100)?]);
        assert_eq!(
            regions.regions("chrM"),
            Some([Interval::new(0, 200)?].as_slice())
        );

        regions.extend("chrY", []);
        assert_eq!(regions.regions("chrY"), None);
        Ok(())
    }
}
