use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Config {
    #[default]
    Uncompressed,
    Gzip,
    Bgzf,
}

impl Config {
    /// Guess the container from the file extension. Unknown extensions are read as is.
    pub fn infer_from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| match ext {
                "gz" | "gzip" => Config::Gzip,
                "bgz" | "bgzf" => Config::Bgzf,
                _ => Config::Uncompressed,
            })
            .unwrap_or(Config::Uncompressed)
    }
}
