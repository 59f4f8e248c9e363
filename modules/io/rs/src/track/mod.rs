// Per-chromosome run-length encoded tracks. Each chromosome is stored in `<chromosome>.txt.gz`,
// one run per line: `<value>\t<run length>`.

mod reader;
mod value;
mod writer;

pub use reader::Reader;
pub use value::{empty, Track, TrackValue};
pub use writer::Writer;

/// Extension appended to the chromosome name.
pub const EXTENSION: &str = "txt.gz";
