mod config;
mod stream;

use std::io::BufRead;
use std::path::Path;

pub use config::Config;
use eyre::{Result, WrapErr};
pub use stream::Stream;

/// Open the file and decompress it according to its extension.
pub fn infer_from_path(path: impl AsRef<Path>) -> Result<Stream<std::fs::File>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    Stream::new(file, &Config::infer_from_path(path))
}

/// Same as [infer_from_path], but the stream is buffered and type-erased.
pub fn open_buffered(path: impl AsRef<Path>) -> Result<Box<dyn BufRead + Send + Sync + 'static>> {
    Ok(Box::new(std::io::BufReader::new(
        infer_from_path(path)?.boxed(),
    )))
}
