use std::io::BufRead;
use std::path::Path;

use eyre::{bail, OptionExt, Result, WrapErr};

use lociscan_collections_rs::region_set::RegionSet;
use lociscan_core_rs::loc::Interval;

use super::record::Bed3;
use crate::compression::decode;
use crate::traits::ReadRecord;

pub mod parse {
    use super::*;

    pub fn seqid<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<&'a str> {
        parts.next().ok_or_eyre("Missing BED seqid")
    }

    pub fn interval<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<Interval<u64>> {
        let start = parts.next().ok_or_eyre("Missing BED start")?;
        let end = parts.next().ok_or_eyre("Missing BED end")?;

        let (start, end) = match (start.parse::<u64>(), end.parse::<u64>()) {
            (Ok(start), Ok(end)) => (start, end),
            _ => bail!("Invalid BED interval"),
        };
        Interval::new(start, end).wrap_err("Invalid BED interval")
    }

    /// Browser/track lines, comments and blank lines carry no records.
    pub fn is_header(line: &str) -> bool {
        line.is_empty()
            || line.starts_with('#')
            || line.starts_with("track")
            || line.starts_with("browser")
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
    /// Open a BED file, decompressing it according to the file extension.
    pub fn from_path(
        path: impl AsRef<Path>,
    ) -> Result<Box<dyn ReadRecord<Record = Bed3> + Send + Sync + 'static>> {
        Ok(Box::new(Reader::new(decode::open_buffered(path)?)))
    }
}

impl<R: BufRead> ReadRecord for Reader<R> {
    type Record = Bed3;

    fn read_record(&mut self, into: &mut Bed3) -> Result<bool> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(false);
            }
            self.line += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if parse::is_header(line) {
                continue;
            }

            let mut parts = line.split('\t');
            let parsed = parse::seqid(&mut parts)
                .and_then(|seqid| into.set(seqid, parse::interval(&mut parts)?).map(|_| ()));
            parsed.wrap_err_with(|| format!("Failed to parse BED line {}: {line}", self.line))?;
            return Ok(true);
        }
    }
}

/// Load all BED intervals into a region set.
pub fn read_region_set(path: impl AsRef<Path>) -> Result<RegionSet> {
    let path = path.as_ref();
    let mut reader = Reader::from_path(path)?;
    let mut records = Vec::new();
    reader
        .read_to_end(&mut records)
        .wrap_err_with(|| format!("Failed to read BED file {}", path.display()))?;

    Ok(records
        .into_iter()
        .map(|x| {
            let (seqid, interval) = x.dissolve();
            (seqid, interval)
        })
        .collect())
}
