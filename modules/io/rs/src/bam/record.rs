use derive_getters::{Dissolve, Getters};
use eyre::{ensure, OptionExt, Result};
use log::warn;
use noodles::bam;

use lociscan_core_rs::loc::Strand;

use super::cigar;
use super::{Flags, Op};

/// Quality value marking an absent quality string in BAM.
const MISSING_QUALITY: u8 = 0xFF;

/// Owned alignment record in the shape consumed by the scanners.
///
/// Coordinates are 1-based. Qualities are either empty (absent) or match the number of bases.
/// Mapping quality 255 means unavailable. CIGAR operations that could not be decoded are dropped
/// and counted in `malformed_ops`.
#[derive(Debug, Clone, PartialEq, Eq, Dissolve, Getters)]
pub struct AlignmentRecord {
    name: String,
    reference_id: Option<usize>,
    start: u32,
    cigar: Vec<Op>,
    bases: Vec<u8>,
    qualities: Vec<u8>,
    mapq: u8,
    flags: Flags,
    mate_reference_id: Option<usize>,
    mate_start: Option<u32>,
    malformed_ops: usize,
}

impl Default for AlignmentRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            reference_id: None,
            start: 0,
            cigar: Vec::new(),
            bases: Vec::new(),
            qualities: Vec::new(),
            mapq: 255,
            flags: Flags::UNMAPPED,
            mate_reference_id: None,
            mate_start: None,
            malformed_ops: 0,
        }
    }
}

impl AlignmentRecord {
    /// Mapped record on the forward strand without qualities and mate information.
    pub fn new(reference_id: usize, start: u32, cigar: Vec<Op>, bases: Vec<u8>) -> Result<Self> {
        ensure!(start >= 1, "Alignment start must be 1-based, got {start}");
        Self::validate_cigar(&cigar, bases.len())?;

        Ok(Self {
            reference_id: Some(reference_id),
            start,
            cigar,
            bases,
            flags: Flags::empty(),
            ..Default::default()
        })
    }

    /// Shortcut for tests and textual inputs: `new` with a CIGAR string.
    pub fn from_text(reference_id: usize, start: u32, cigar: &str, bases: &str) -> Result<Self> {
        Self::new(
            reference_id,
            start,
            cigar::parse(cigar),
            bases.as_bytes().to_vec(),
        )
    }

    fn validate_cigar(ops: &[Op], bases: usize) -> Result<()> {
        let expected = cigar::read_length(ops);
        ensure!(
            ops.is_empty() || bases == 0 || expected == bases,
            "CIGAR describes {expected} read bases while the record has {bases}"
        );
        Ok(())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_qualities(mut self, qualities: Vec<u8>) -> Result<Self> {
        ensure!(
            qualities.is_empty() || qualities.len() == self.bases.len(),
            "Got {} qualities for {} bases",
            qualities.len(),
            self.bases.len()
        );
        self.qualities = qualities;
        Ok(self)
    }

    pub fn with_mapq(mut self, mapq: u8) -> Self {
        self.mapq = mapq;
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_mate(mut self, reference_id: usize, start: u32) -> Self {
        self.mate_reference_id = Some(reference_id);
        self.mate_start = Some(start);
        self.flags.insert(Flags::SEGMENTED);
        self
    }

    /// Replace the content of the record with the decoded BAM record, reusing the buffers.
    pub fn fill_from(&mut self, record: &bam::Record) -> Result<()> {
        self.name.clear();
        if let Some(name) = record.name() {
            self.name.push_str(&String::from_utf8_lossy(name));
        }
        self.flags = record.flags();
        self.reference_id = record.reference_sequence_id().transpose()?;
        self.start = match record.alignment_start().transpose()? {
            Some(position) => u32::try_from(position.get())
                .ok()
                .ok_or_eyre("Alignment start does not fit into 32 bits")?,
            None => 0,
        };
        self.mapq = record.mapping_quality().map(|x| x.get()).unwrap_or(255);
        self.mate_reference_id = record.mate_reference_sequence_id().transpose()?;
        self.mate_start = match record.mate_alignment_start().transpose()? {
            Some(position) => u32::try_from(position.get()).ok(),
            None => None,
        };

        self.cigar.clear();
        self.malformed_ops = 0;
        for op in record.cigar().iter() {
            match op {
                Ok(op) => self.cigar.push(op),
                Err(err) => {
                    warn!(
                        "Skipping an undecodable CIGAR operation of {} at #{:?}:{}: {err}",
                        self.name, self.reference_id, self.start
                    );
                    self.malformed_ops += 1;
                }
            }
        }

        self.bases.clear();
        self.bases.extend(record.sequence().iter());

        let scores = record.quality_scores();
        let qualities: &[u8] = scores.as_ref();
        self.qualities.clear();
        if qualities.len() == self.bases.len() && !qualities.iter().all(|x| *x == MISSING_QUALITY)
        {
            self.qualities.extend_from_slice(qualities);
        }

        // CIGAR and sequence lengths may disagree here, the read layout truncates what overruns
        Ok(())
    }

    pub fn from_bam(record: &bam::Record) -> Result<Self> {
        let mut result = Self::default();
        result.fill_from(record)?;
        Ok(result)
    }

    pub fn is_mapped(&self) -> bool {
        !self.flags.is_unmapped() && self.reference_id.is_some() && self.start > 0
    }

    pub fn strand(&self) -> Strand {
        Strand::from_reverse_flag(self.flags.is_reverse_complemented())
    }

    pub fn has_qualities(&self) -> bool {
        !self.qualities.is_empty()
    }

    pub fn read_length(&self) -> usize {
        self.bases.len()
    }

    /// Number of reference positions spanned by the alignment, splice gaps included.
    pub fn reference_span(&self) -> u32 {
        u32::try_from(cigar::reference_span(&self.cigar)).unwrap_or(u32::MAX)
    }

    /// Whether the mate is mapped to the same chromosome.
    pub fn mate_on_same_reference(&self) -> bool {
        self.flags.is_segmented()
            && !self.flags.is_mate_unmapped()
            && self.mate_start.is_some()
            && self.mate_reference_id == self.reference_id
    }
}

impl TryFrom<&bam::Record> for AlignmentRecord {
    type Error = eyre::Report;

    fn try_from(value: &bam::Record) -> Result<Self> {
        Self::from_bam(value)
    }
}
