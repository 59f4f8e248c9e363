use eyre::Result;

use lociscan_core_rs::loc::IntervalOp;
use lociscan_core_rs::ngs::Base;

use crate::cache::LocusCache;
use crate::locus::{Code, Composition};
use crate::mapping::ReadPosition;
use crate::scanner::{ChromosomeContext, LocusModel, ScanRead};

/// Shannon entropy of the per-position composition: called bases, trimmed bases, insertions
/// and deletions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct EntropyModel;

impl LocusModel for EntropyModel {
    type Locus = Composition;
    type Value = f32;

    fn name(&self) -> &'static str {
        "entropy"
    }

    fn default_value(&self) -> f32 {
        0.0
    }

    fn contribute(
        &mut self,
        _: &ChromosomeContext,
        read: &ScanRead,
        cache: &mut LocusCache<Composition>,
    ) {
        let mut fill = |position: u32, code: Code| {
            if read.contributes(position) {
                cache.fill(position, |x| x.add(code));
            }
        };

        let original = read.layout.positions();
        let trimmed = read.trimmed.positions();
        let bases = read.trimmed.bases();

        let mut previous: Option<u32> = None;
        for (ind, (before, after)) in original.iter().zip(trimmed).enumerate() {
            match (before, after) {
                (ReadPosition::Reference(position), ReadPosition::Reference(_)) => {
                    fill(*position, Code::from(Base::from_ascii(bases[ind])));
                    previous = Some(*position);
                }
                (ReadPosition::Reference(position), _) => {
                    fill(*position, Code::Clip);
                    previous = Some(*position);
                }
                (ReadPosition::Inserted, _) => {
                    // Once per insertion, anchored to the preceding aligned base
                    let opens = ind == 0 || original[ind - 1] != ReadPosition::Inserted;
                    if let (true, Some(anchor)) = (opens, previous) {
                        fill(anchor, Code::Insertion);
                    }
                }
                (ReadPosition::Clipped, _) => {}
            }
        }

        for deletion in read.layout.deletions() {
            for position in deletion.start()..deletion.end() {
                fill(position, Code::Deletion);
            }
        }
    }

    fn finalize(
        &mut self,
        _: &ChromosomeContext,
        _: u32,
        locus: Composition,
    ) -> Result<Option<f32>> {
        Ok(Some(locus.entropy()))
    }
}
