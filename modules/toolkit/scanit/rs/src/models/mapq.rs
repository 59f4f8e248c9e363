use eyre::Result;

use crate::cache::LocusCache;
use crate::locus::MapqList;
use crate::scanner::{ChromosomeContext, LocusModel, ScanRead};

/// Median mapping quality of the reads aligned to each position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct MapqModel;

impl MapqModel {
    /// Mapping quality reserved for "unavailable".
    pub const UNAVAILABLE: u8 = 255;
}

impl LocusModel for MapqModel {
    type Locus = MapqList;
    type Value = f32;

    fn name(&self) -> &'static str {
        "median-mapq"
    }

    fn default_value(&self) -> f32 {
        MapqList::EMPTY
    }

    fn contribute(&mut self, _: &ChromosomeContext, read: &ScanRead, cache: &mut LocusCache<MapqList>) {
        let mapq = *read.record.mapq();
        if mapq == Self::UNAVAILABLE {
            return;
        }
        for (_, position) in read.aligned() {
            cache.fill(position, |x| x.add(mapq));
        }
    }

    fn finalize(
        &mut self,
        _: &ChromosomeContext,
        _: u32,
        mut locus: MapqList,
    ) -> Result<Option<f32>> {
        Ok(Some(locus.median()))
    }
}
