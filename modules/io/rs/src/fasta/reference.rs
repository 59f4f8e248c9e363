use std::path::Path;

use derive_getters::{Dissolve, Getters};
use eyre::{bail, ensure, OptionExt, Result, WrapErr};
use log::debug;

use lociscan_core_rs::ngs::Base;

use super::reader::Reader;
use super::record::Record;
use crate::traits::ReadRecord;

/// Sequence of a single chromosome with 1-based random access.
#[derive(Debug, Clone, PartialEq, Eq, Dissolve, Getters)]
pub struct ReferenceSequence {
    name: String,
    seq: Vec<u8>,
}

impl ReferenceSequence {
    pub fn new(name: impl Into<String>, seq: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            seq,
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Reference base at the 1-based position.
    pub fn base_at(&self, position: u32) -> Result<Base> {
        let symbol = position
            .checked_sub(1)
            .and_then(|ind| self.seq.get(ind as usize))
            .ok_or_eyre(format!(
                "Position {position} is outside of the reference sequence {} (length {})",
                self.name,
                self.seq.len()
            ))?;
        Ok(Base::from_ascii(*symbol))
    }
}

/// Sequential accessor over reference sequences. Chromosomes must be requested in the order they
/// appear in the underlying source, sequences in between are skipped.
pub trait ReferenceSequences {
    /// Move forward to the chromosome with the given name and verify its length.
    fn advance_to(&mut self, name: &str, length: u32) -> Result<ReferenceSequence>;
}

pub struct FastaReference {
    reader: Box<dyn ReadRecord<Record = Record> + Send + Sync + 'static>,
    buffer: Record,
}

impl FastaReference {
    pub fn new(reader: Box<dyn ReadRecord<Record = Record> + Send + Sync + 'static>) -> Self {
        Self {
            reader,
            buffer: Record::default(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Reader::from_path(path)?))
    }
}

impl ReferenceSequences for FastaReference {
    fn advance_to(&mut self, name: &str, length: u32) -> Result<ReferenceSequence> {
        loop {
            let found = self
                .reader
                .read_record(&mut self.buffer)
                .wrap_err_with(|| format!("Failed to read the reference while looking for {name}"))?;
            if !found {
                bail!("Reference sequence {name} is missing or out of order in the FASTA file");
            }

            if self.buffer.name() != name {
                debug!("Skipping reference sequence {}", self.buffer.name());
                continue;
            }

            let seq = std::mem::take(&mut self.buffer).dissolve().1;
            ensure!(
                seq.len() == length as usize,
                "Reference sequence {name} has length {} while the alignments declare {length}",
                seq.len()
            );
            return Ok(ReferenceSequence::new(name, seq));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reference(content: &'static str) -> Result<FastaReference> {
        Ok(FastaReference::new(Box::new(Reader::new(Cursor::new(
            content.as_bytes(),
        ))?)))
    }

    #[test]
    fn test_advance_in_order() -> Result<()> {
        let mut fasta = reference(">chr1 first\nACGT\nNN\n>chrUn\nA\n>chr2\nacgt\n")?;

        let chr1 = fasta.advance_to("chr1", 6)?;
        assert_eq!(chr1.name(), "chr1");
        assert_eq!(chr1.len(), 6);
        for (pos, expected) in [(1, Base::A), (4, Base::T), (5, Base::N)] {
            assert_eq!(chr1.base_at(pos)?, expected);
        }
        assert!(chr1.base_at(0).is_err());
        assert!(chr1.base_at(7).is_err());

        let chr2 = fasta.advance_to("chr2", 4)?;
        assert_eq!(chr2.base_at(2)?, Base::C);

        assert!(fasta.advance_to("chr3", 10).is_err());
        Ok(())
    }

    #[test]
    fn test_mismatched_reference() -> Result<()> {
        let mut fasta = reference(">chr1\nACGT\n>chr2\nACGT\n")?;
        assert!(fasta.advance_to("chr1", 5).is_err());

        let mut fasta = reference(">chr1\nACGT\n>chr2\nACGT\n")?;
        fasta.advance_to("chr2", 4)?;
        assert!(fasta.advance_to("chr1", 4).is_err());
        Ok(())
    }
}
