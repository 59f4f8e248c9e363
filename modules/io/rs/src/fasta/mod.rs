mod reader;
mod record;
mod reference;

pub use reader::Reader;
pub use record::Record;
pub use reference::{FastaReference, ReferenceSequence, ReferenceSequences};
