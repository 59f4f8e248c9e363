use derive_getters::Getters;
use eyre::Result;

use lociscan_core_rs::loc::IntervalOp;

use crate::cache::LocusCache;
use crate::locus::DepthCounter;
use crate::scanner::{ChromosomeContext, LocusModel, ScanRead};

/// Number of reads aligned to each position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Getters)]
pub struct CoverageModel {
    count_deletions: bool,
}

impl CoverageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat positions inside deletions as covered by the read.
    pub fn with_deletions(mut self, count_deletions: bool) -> Self {
        self.count_deletions = count_deletions;
        self
    }
}

impl LocusModel for CoverageModel {
    type Locus = DepthCounter;
    type Value = u32;

    fn name(&self) -> &'static str {
        "coverage"
    }

    fn default_value(&self) -> u32 {
        0
    }

    fn contribute(
        &mut self,
        _: &ChromosomeContext,
        read: &ScanRead,
        cache: &mut LocusCache<DepthCounter>,
    ) {
        for (_, position) in read.aligned() {
            cache.fill(position, |x| x.add());
        }

        if self.count_deletions {
            for deletion in read.layout.deletions() {
                for position in deletion.start()..deletion.end() {
                    if read.contributes(position) {
                        cache.fill(position, |x| x.add());
                    }
                }
            }
        }
    }

    fn finalize(
        &mut self,
        _: &ChromosomeContext,
        _: u32,
        locus: DepthCounter,
    ) -> Result<Option<u32>> {
        Ok(Some(locus.depth()))
    }
}
