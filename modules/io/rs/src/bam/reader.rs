use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use derive_getters::Getters;
use eyre::{Result, WrapErr};
use noodles::{bam, bgzf, sam};

use lociscan_core_rs::loc::Chromosome;

use super::record::AlignmentRecord;

/// Sequential BAM reader producing owned [AlignmentRecord]s in file order.
#[derive(Getters)]
pub struct Reader<R: Read> {
    #[getter(skip)]
    inner: bam::io::Reader<bgzf::io::Reader<R>>,
    header: sam::Header,
    #[getter(skip)]
    buffer: bam::Record,
    source: PathBuf,
}

impl Reader<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).wrap_err_with(|| format!("Failed to open BAM {}", path.display()))?;
        Self::new(file, path)
    }
}

impl<R: Read> Reader<R> {
    /// Wrap a BGZF-compressed BAM stream and read its header.
    pub fn new(inner: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut inner = bam::io::Reader::new(inner);
        let header = inner
            .read_header()
            .wrap_err_with(|| format!("Failed to read BAM header from {}", source.display()))?;

        Ok(Self {
            inner,
            header,
            buffer: bam::Record::default(),
            source,
        })
    }

    /// Reference sequences declared in the header, in the header order.
    pub fn chromosomes(&self) -> Result<Vec<Chromosome>> {
        chromosomes(&self.header)
    }

    /// Read the next record into the buffer. Returns `false` at the end of the file.
    pub fn read_record(&mut self, into: &mut AlignmentRecord) -> Result<bool> {
        let read = self
            .inner
            .read_record(&mut self.buffer)
            .wrap_err_with(|| format!("Failed to read a BAM record from {}", self.source.display()))?;
        if read == 0 {
            return Ok(false);
        }
        into.fill_from(&self.buffer)?;
        Ok(true)
    }
}

/// Every item is a freshly allocated record. Use [Reader::read_record] to reuse one record's
/// buffers across reads.
impl<R: Read> Iterator for Reader<R> {
    type Item = Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = AlignmentRecord::default();
        match self.read_record(&mut record) {
            Ok(true) => Some(Ok(record)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Chromosomes listed in a SAM header.
pub fn chromosomes(header: &sam::Header) -> Result<Vec<Chromosome>> {
    header
        .reference_sequences()
        .iter()
        .map(|(name, map)| {
            let length = u32::try_from(map.length().get())
                .wrap_err_with(|| format!("Reference sequence {name} is longer than 2^32"))?;
            Chromosome::new(name.to_string(), length)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::num::NonZeroUsize;

    const SEQ_CODES: &[u8] = b"=ACMGRSVTWYHKDBN";

    // Minimal BGZF-compressed BAM with a single reference sequence. Records are
    // (name, 0-based start, raw CIGAR words, bases).
    fn raw_bam(reference: (&str, i32), records: &[(&str, i32, &[u32], &str)]) -> Result<Vec<u8>> {
        let mut data = b"BAM\x01".to_vec();
        data.extend(0i32.to_le_bytes());
        data.extend(1i32.to_le_bytes());
        data.extend((reference.0.len() as i32 + 1).to_le_bytes());
        data.extend(reference.0.as_bytes());
        data.push(0);
        data.extend(reference.1.to_le_bytes());

        for (name, start, cigar, bases) in records {
            let mut record = Vec::new();
            record.extend(0i32.to_le_bytes());
            record.extend(start.to_le_bytes());
            record.push(name.len() as u8 + 1);
            record.push(60);
            record.extend(4680u16.to_le_bytes());
            record.extend((cigar.len() as u16).to_le_bytes());
            record.extend(0u16.to_le_bytes());
            record.extend((bases.len() as u32).to_le_bytes());
            record.extend((-1i32).to_le_bytes());
            record.extend((-1i32).to_le_bytes());
            record.extend(0i32.to_le_bytes());
            record.extend(name.as_bytes());
            record.push(0);
            for op in cigar.iter() {
                record.extend(op.to_le_bytes());
            }
            let codes = bases
                .bytes()
                .map(|x| SEQ_CODES.iter().position(|c| *c == x).unwrap_or(15) as u8)
                .collect::<Vec<_>>();
            for pair in codes.chunks(2) {
                record.push((pair[0] << 4) | pair.get(1).copied().unwrap_or(0));
            }
            record.extend(std::iter::repeat_n(0xFFu8, bases.len()));

            data.extend((record.len() as u32).to_le_bytes());
            data.extend(record);
        }

        let mut writer = bgzf::io::Writer::new(Vec::new());
        writer.write_all(&data)?;
        Ok(writer.finish()?)
    }

    // 4M followed by an operation with the undefined code 9
    const UNKNOWN_OP: [u32; 2] = [0x40, 0x19];

    #[test]
    fn test_undecodable_cigar_operations_are_skipped() -> Result<()> {
        let bytes = raw_bam(
            ("chr1", 100),
            &[
                ("r1", 0, &[0x40], "ACGT"),
                ("r2", 4, &UNKNOWN_OP, "ACGT"),
                ("r3", 8, &[0x40], "ACGT"),
            ],
        )?;

        let reader = Reader::new(bytes.as_slice(), "test.bam")?;
        assert_eq!(reader.chromosomes()?, vec![Chromosome::new("chr1", 100)?]);

        let records = reader.collect::<Result<Vec<_>>>()?;
        assert_eq!(records.len(), 3);
        for (record, name, start, malformed) in
            [(&records[0], "r1", 1, 0), (&records[1], "r2", 5, 1), (&records[2], "r3", 9, 0)]
        {
            assert_eq!(record.name(), name);
            assert_eq!(*record.start(), start);
            assert_eq!(*record.malformed_ops(), malformed, "{name}");
            assert_eq!(record.cigar(), &crate::bam::cigar::parse("4M"), "{name}");
            assert_eq!(record.bases(), b"ACGT");
            assert!(!record.has_qualities());
        }
        Ok(())
    }

    #[test]
    fn test_read_record_reuses_buffers() -> Result<()> {
        let bytes = raw_bam(
            ("chr1", 100),
            &[("first", 0, &UNKNOWN_OP, "ACGT"), ("second", 10, &[0x20], "TT")],
        )?;
        let expected = Reader::new(bytes.as_slice(), "test.bam")?.collect::<Result<Vec<_>>>()?;

        let mut reader = Reader::new(bytes.as_slice(), "test.bam")?;
        let mut record = AlignmentRecord::default();
        for expected in &expected {
            assert!(reader.read_record(&mut record)?);
            assert_eq!(&record, expected);
        }
        assert!(!reader.read_record(&mut record)?);
        assert_eq!(*record.malformed_ops(), 0);
        Ok(())
    }

    #[test]
    fn test_chromosomes_from_header() -> Result<()> {
        let header = sam::Header::builder()
            .add_reference_sequence(
                "chr1",
                sam::header::record::value::Map::<
                    sam::header::record::value::map::ReferenceSequence,
                >::new(NonZeroUsize::try_from(100)?),
            )
            .add_reference_sequence(
                "chrM",
                sam::header::record::value::Map::<
                    sam::header::record::value::map::ReferenceSequence,
                >::new(NonZeroUsize::try_from(16)?),
            )
            .build();

        assert_eq!(
            chromosomes(&header)?,
            vec![Chromosome::new("chr1", 100)?, Chromosome::new("chrM", 16)?]
        );
        Ok(())
    }
}
