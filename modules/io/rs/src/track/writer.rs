use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use derive_getters::Getters;
use eyre::{ensure, Result, WrapErr};
use log::debug;

use super::value::{Track, TrackValue};
use super::EXTENSION;
use crate::compression::encode;

/// Writes per-chromosome track files into a single output directory.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Writer {
    directory: PathBuf,
    level: encode::Level,
}

impl Writer {
    /// Create the writer, making the output directory if needed.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).wrap_err_with(|| {
            format!("Failed to create the output directory {}", directory.display())
        })?;
        Ok(Self {
            directory,
            level: encode::Level::default(),
        })
    }

    pub fn with_level(mut self, level: encode::Level) -> Self {
        self.level = level;
        self
    }

    /// Path of the track file for the chromosome.
    pub fn path(&self, chromosome: &str) -> PathBuf {
        path(&self.directory, chromosome)
    }

    /// Write the runs of a chromosome, replacing any existing file.
    pub fn write<V: TrackValue>(&self, chromosome: &str, track: &Track<V>) -> Result<PathBuf> {
        self.write_runs(
            chromosome,
            track.runs().map(|(value, length)| (*value, *length)),
        )
    }

    /// Run-length encode and write dense per-position values of a chromosome.
    pub fn write_dense<V: TrackValue>(&self, chromosome: &str, values: &[V]) -> Result<PathBuf> {
        let mut track = super::value::empty::<V>();
        for value in values {
            track.append(*value, 1);
        }
        self.write(chromosome, &track)
    }

    fn write_runs<V: TrackValue>(
        &self,
        chromosome: &str,
        runs: impl Iterator<Item = (V, u32)>,
    ) -> Result<PathBuf> {
        ensure!(
            !chromosome.is_empty() && !chromosome.contains(['/', '\\']),
            "Chromosome name {chromosome:?} can't be used as a file name"
        );

        let path = self.path(chromosome);
        let file = File::create(&path)
            .wrap_err_with(|| format!("Failed to create the track file {}", path.display()))?;
        let mut stream = BufWriter::new(encode::Stream::new(file, &encode::Config::Gzip(self.level))?);

        let mut total = 0u64;
        for (value, length) in runs {
            writeln!(stream, "{value}\t{length}")?;
            total += length as u64;
        }

        stream
            .into_inner()
            .map_err(|err| err.into_error())?
            .finish()
            .wrap_err_with(|| format!("Failed to finalize the track file {}", path.display()))?;
        debug!("Track for {chromosome} ({total} positions) saved to {}", path.display());
        Ok(path)
    }
}

pub(super) fn path(directory: &Path, chromosome: &str) -> PathBuf {
    directory.join(format!("{chromosome}.{EXTENSION}"))
}
