use std::io::BufRead;
use std::path::Path;

use derive_getters::{Dissolve, Getters};
use eyre::{ensure, OptionExt, Result, WrapErr};

use lociscan_collections_rs::region_set::RegionSet;
use lociscan_core_rs::loc::Interval;

use crate::compression::decode;
use crate::traits::ReadRecord;

/// A VCF site: chromosome and 1-based position.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Dissolve, Getters)]
pub struct Site {
    chrom: String,
    position: u64,
}

impl Site {
    pub fn new(chrom: String, position: u64) -> Result<Self> {
        ensure!(!chrom.is_empty(), "VCF CHROM cannot be empty");
        ensure!(position > 0, "VCF POS must be positive, got {position}");
        Ok(Self { chrom, position })
    }

    /// The site as a 0-based half-open interval of length 1.
    pub fn interval(&self) -> Result<Interval<u64>> {
        Interval::new(self.position.saturating_sub(1), self.position)
    }
}

pub struct Reader<R> {
    reader: R,
    buffer: String,
    line: usize,
}

impl<R> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line: 0,
        }
    }
}

impl Reader<()> {
    /// Open a VCF file, decompressing it according to the file extension.
    pub fn from_path(
        path: impl AsRef<Path>,
    ) -> Result<Box<dyn ReadRecord<Record = Site> + Send + Sync + 'static>> {
        Ok(Box::new(Reader::new(decode::open_buffered(path)?)))
    }
}

impl<R: BufRead> Reader<R> {
    fn parse(line: &str, into: &mut Site) -> Result<()> {
        let mut parts = line.split('\t');
        let chrom = parts.next().ok_or_eyre("Missing VCF CHROM")?;
        let position = parts
            .next()
            .ok_or_eyre("Missing VCF POS")?
            .parse::<u64>()
            .wrap_err("Invalid VCF POS")?;

        ensure!(!chrom.is_empty(), "VCF CHROM cannot be empty");
        ensure!(position > 0, "VCF POS must be positive");
        into.chrom.clear();
        into.chrom.push_str(chrom);
        into.position = position;
        Ok(())
    }
}

impl<R: BufRead> ReadRecord for Reader<R> {
    type Record = Site;

    fn read_record(&mut self, into: &mut Site) -> Result<bool> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(false);
            }
            self.line += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            Self::parse(line, into)
                .wrap_err_with(|| format!("Failed to parse VCF line {}: {line}", self.line))?;
            return Ok(true);
        }
    }
}

/// Load all VCF sites into a region set.
pub fn read_region_set(path: impl AsRef<Path>) -> Result<RegionSet> {
    let path = path.as_ref();
    let mut reader = Reader::from_path(path)?;
    let mut sites = Vec::new();
    reader
        .read_to_end(&mut sites)
        .wrap_err_with(|| format!("Failed to read VCF file {}", path.display()))?;

    let mut regions = Vec::with_capacity(sites.len());
    for site in sites {
        let interval = site.interval()?;
        regions.push((site.chrom, interval));
    }
    Ok(regions.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_sites() -> Result<()> {
        let content = "##fileformat=VCFv4.3\n#CHROM\tPOS\tID\tREF\tALT\nchr1\t100\t.\tA\tG\nchr2\t1\trs1\tC\tT\n";
        let mut reader = Reader::new(Cursor::new(content));
        let mut sites = Vec::new();
        reader.read_to_end(&mut sites)?;

        assert_eq!(
            sites,
            vec![Site::new("chr1".into(), 100)?, Site::new("chr2".into(), 1)?]
        );
        assert_eq!(sites[0].interval()?, Interval::new(99, 100)?);
        Ok(())
    }

    #[test]
    fn test_invalid_sites() {
        for content in ["chr1\n", "chr1\t0\n", "chr1\tX\n", "\t5\n"] {
            let mut reader = Reader::new(Cursor::new(content));
            let mut site = Site::default();
            assert!(reader.read_record(&mut site).is_err(), "{content:?}");
        }
    }
}
