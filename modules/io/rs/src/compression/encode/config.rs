use std::path::Path;

use derive_more::Into;
use eyre::{ensure, Result};

/// DEFLATE compression level in [0, 9].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Into)]
pub struct Level(u8);

impl Level {
    pub const FAST: Level = Level(1);
    pub const DEFAULT: Level = Level(6);
    pub const BEST: Level = Level(9);

    pub fn new(level: u8) -> Result<Self> {
        ensure!(level <= 9, "Invalid DEFLATE compression level: {level}");
        Ok(Self(level))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Config {
    #[default]
    Uncompressed,
    Gzip(Level),
}

impl Config {
    pub fn infer_from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("gz" | "gzip") => Config::Gzip(Level::default()),
            _ => Config::Uncompressed,
        }
    }
}
