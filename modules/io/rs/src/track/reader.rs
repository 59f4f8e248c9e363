use std::io::BufRead;
use std::path::{Path, PathBuf};

use derive_getters::Getters;
use eyre::{ensure, OptionExt, Result, WrapErr};

use super::value::{empty, Track, TrackValue};
use super::writer::path;
use crate::compression::decode;

/// Reads per-chromosome track files from a directory.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Reader {
    directory: PathBuf,
}

impl Reader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path(&self, chromosome: &str) -> PathBuf {
        path(&self.directory, chromosome)
    }

    pub fn exists(&self, chromosome: &str) -> bool {
        self.path(chromosome).is_file()
    }

    /// Read the runs of a chromosome.
    pub fn read<V: TrackValue>(&self, chromosome: &str) -> Result<Track<V>> {
        let path = self.path(chromosome);
        let stream = decode::open_buffered(&path)?;
        parse(stream).wrap_err_with(|| format!("Invalid track file {}", path.display()))
    }

    /// Read the chromosome track expanded to one value per position.
    pub fn read_dense<V: TrackValue>(&self, chromosome: &str) -> Result<Vec<V>> {
        Ok(self.read::<V>(chromosome)?.to_dense())
    }

    /// Parse a track from a file at an arbitrary location.
    pub fn read_path<V: TrackValue>(path: impl AsRef<Path>) -> Result<Track<V>> {
        let path = path.as_ref();
        parse(decode::open_buffered(path)?)
            .wrap_err_with(|| format!("Invalid track file {}", path.display()))
    }
}

fn parse<V: TrackValue>(mut stream: impl BufRead) -> Result<Track<V>> {
    let mut track = empty::<V>();
    let mut buffer = String::new();
    let mut line = 0usize;
    loop {
        buffer.clear();
        if stream.read_line(&mut buffer)? == 0 {
            return Ok(track);
        }
        line += 1;

        let content = buffer.trim_end_matches(['\n', '\r']);
        let (value, length) = content
            .split_once('\t')
            .ok_or_eyre(format!("Line {line} must have two tab-separated fields"))?;
        let value = value
            .parse::<V>()
            .wrap_err_with(|| format!("Invalid value at line {line}: {value}"))?;
        let length = length
            .parse::<u32>()
            .wrap_err_with(|| format!("Invalid run length at line {line}: {length}"))?;
        ensure!(length > 0, "Empty run at line {line}");
        track.append(value, length);
    }
}
