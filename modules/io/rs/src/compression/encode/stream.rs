use std::io::Write;

use eyre::Result;

use super::config::Config;

pub enum Stream<W: Write + Send + Sync + 'static> {
    Raw(W),
    Gzip(flate2::write::GzEncoder<W>),
}

impl<W: Write + Send + Sync + 'static> Stream<W> {
    pub fn new(inner: W, config: &Config) -> Result<Self> {
        let stream = match config {
            Config::Uncompressed => Stream::Raw(inner),
            Config::Gzip(level) => Stream::Gzip(flate2::write::GzEncoder::new(
                inner,
                flate2::Compression::new(level.get() as u32),
            )),
        };
        Ok(stream)
    }

    /// Write the compression trailer, if any, and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        let mut inner = match self {
            Stream::Raw(w) => w,
            Stream::Gzip(encoder) => encoder.finish()?,
        };
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write + Send + Sync + 'static> Write for Stream<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Stream::Raw(w) => w.write(buf),
            Stream::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Stream::Raw(w) => w.flush(),
            Stream::Gzip(w) => w.flush(),
        }
    }
}
