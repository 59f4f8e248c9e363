use derive_getters::Getters;
use log::debug;

use lociscan_core_rs::loc::Interval;
use lociscan_io_rs::bam::{AlignmentRecord, Kind, Op};

/// Genomic placement of a single read base.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ReadPosition {
    /// Aligned to the given 1-based reference position.
    Reference(u32),
    /// Soft-clipped, trimmed, or not described by the CIGAR.
    #[default]
    Clipped,
    /// Inserted relative to the reference.
    Inserted,
}

impl ReadPosition {
    #[inline]
    pub fn reference(&self) -> Option<u32> {
        match self {
            ReadPosition::Reference(pos) => Some(*pos),
            _ => None,
        }
    }
}

/// Per-base placement of a read on the reference and facts derived from the same CIGAR walk.
#[derive(Clone, PartialEq, Eq, Debug, Default, Getters)]
pub struct ReadLayout {
    positions: Vec<ReadPosition>,
    deletions: Vec<Interval<u32>>,
    start: u32,
    end: u32,
    max_splice_gap: u32,
    has_indel: bool,
    skipped_ops: usize,
}

impl ReadLayout {
    /// Number of reference positions spanned by the alignment, gaps included.
    pub fn reference_span(&self) -> u32 {
        self.end - self.start
    }

    /// Recompute the layout for a new read, reusing the allocated buffers.
    pub fn remap(&mut self, start: u32, ops: &[Op], read_length: usize) {
        self.positions.clear();
        self.positions.resize(read_length, ReadPosition::Clipped);
        self.deletions.clear();
        self.start = start;
        self.max_splice_gap = 0;
        self.has_indel = false;
        self.skipped_ops = 0;

        let mut genomic = start;
        let mut cursor = 0usize;
        for op in ops {
            let len = op.len();
            match op.kind() {
                Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                    let fits = self.fitting(cursor, len, op);
                    for slot in &mut self.positions[cursor..cursor + fits] {
                        *slot = ReadPosition::Reference(genomic);
                        genomic = genomic.saturating_add(1);
                    }
                    // Bases that are absent from the read still occupy the reference
                    genomic = genomic.saturating_add((len - fits) as u32);
                    cursor += fits;
                }
                Kind::Insertion => {
                    self.has_indel = true;
                    let fits = self.fitting(cursor, len, op);
                    self.positions[cursor..cursor + fits].fill(ReadPosition::Inserted);
                    cursor += fits;
                }
                Kind::SoftClip => {
                    let fits = self.fitting(cursor, len, op);
                    cursor += fits;
                }
                Kind::Deletion => {
                    self.has_indel = true;
                    let end = genomic.saturating_add(len as u32);
                    if let Ok(deletion) = Interval::new(genomic, end) {
                        self.deletions.push(deletion);
                    }
                    genomic = end;
                }
                Kind::Skip => {
                    self.max_splice_gap = self.max_splice_gap.max(len as u32);
                    genomic = genomic.saturating_add(len as u32);
                }
                Kind::HardClip | Kind::Pad => {}
            }
        }
        self.end = genomic;
    }

    /// Number of read slots the operation can fill. Overrunning operations are truncated.
    fn fitting(&mut self, cursor: usize, len: usize, op: &Op) -> usize {
        let available = self.positions.len().saturating_sub(cursor);
        if len > available {
            debug!(
                "CIGAR operation {:?} overruns the read ({} of {} bases left), truncating",
                op, available, self.positions.len()
            );
            self.skipped_ops += 1;
            available
        } else {
            len
        }
    }
}

/// Map every read base to its reference position, see [ReadPosition].
pub fn map_positions(start: u32, ops: &[Op], read_length: usize) -> ReadLayout {
    let mut layout = ReadLayout::default();
    layout.remap(start, ops, read_length);
    layout
}

/// First position shared with the mate, if the mate starts inside `[start, end)` of this read.
///
/// Positions at or after the returned value are covered by the mate as well. When both mates
/// start at the same position, only the first segment reports the overlap so that the pair is
/// still counted once.
pub fn overlap_start(record: &AlignmentRecord, end: u32) -> Option<u32> {
    if !record.mate_on_same_reference() {
        return None;
    }
    let start = *record.start();
    let mate_start = (*record.mate_start())?;

    if mate_start == start {
        return record.flags().is_first_segment().then_some(mate_start);
    }
    (start < mate_start && mate_start < end).then_some(mate_start)
}
