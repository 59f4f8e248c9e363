pub mod cigar;
mod reader;
mod record;

pub use reader::Reader;
pub use record::AlignmentRecord;

pub use noodles::sam::alignment::record::cigar::op::Kind;
pub use noodles::sam::alignment::record::cigar::Op;
pub use noodles::sam::alignment::record::Flags;
