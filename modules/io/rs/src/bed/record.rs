use derive_getters::{Dissolve, Getters};
use eyre::{ensure, Result};

use lociscan_core_rs::loc::Interval;

/// BED3 record: sequence name and a 0-based half-open interval.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Dissolve, Getters)]
pub struct Bed3 {
    seqid: String,
    interval: Interval<u64>,
}

impl Bed3 {
    pub fn new(seqid: String, interval: Interval<u64>) -> Result<Self> {
        Self::validate_seqid(&seqid)?;
        Ok(Self { seqid, interval })
    }

    pub fn validate_seqid(seqid: &str) -> Result<()> {
        ensure!(
            !seqid.is_empty() && seqid.len() <= 255,
            "BED seqid must have between 1 and 255 characters: {seqid:?}"
        );
        Ok(())
    }

    pub fn set(&mut self, seqid: &str, interval: Interval<u64>) -> Result<&mut Self> {
        Self::validate_seqid(seqid)?;
        self.seqid.clear();
        self.seqid.push_str(seqid);
        self.interval = interval;
        Ok(self)
    }
}
