use std::io::Read;

use eyre::Result;
use noodles::bgzf;

use super::config::Config;

pub enum Stream<R: Read + Send + Sync + 'static> {
    Raw(R),
    // BGZF is a valid multi-member gzip, both go through the same decoder when read sequentially
    Gzip(flate2::read::MultiGzDecoder<R>),
    Bgzf(bgzf::io::Reader<R>),
}

impl<R: Read + Send + Sync + 'static> Stream<R> {
    pub fn new(inner: R, config: &Config) -> Result<Self> {
        let stream = match config {
            Config::Uncompressed => Stream::Raw(inner),
            Config::Gzip => Stream::Gzip(flate2::read::MultiGzDecoder::new(inner)),
            Config::Bgzf => Stream::Bgzf(bgzf::io::Reader::new(inner)),
        };
        Ok(stream)
    }

    pub fn boxed(self) -> Box<dyn Read + Send + Sync + 'static> {
        match self {
            Stream::Raw(r) => Box::new(r),
            Stream::Gzip(r) => Box::new(r),
            Stream::Bgzf(r) => Box::new(r),
        }
    }
}

impl<R: Read + Send + Sync + 'static> Read for Stream<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Stream::Raw(r) => r.read(buf),
            Stream::Gzip(r) => r.read(buf),
            Stream::Bgzf(r) => r.read(buf),
        }
    }
}
