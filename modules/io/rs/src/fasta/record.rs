use derive_getters::{Dissolve, Getters};
use eyre::{ensure, Result};
use std::error::Error;

/// A single FASTA record:
/// - The ID is a non-empty UTF-8 string without newline characters.
/// - The sequence is non-empty and contains only ASCII alphabetic characters.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Dissolve, Getters)]
pub struct Record {
    id: String,
    seq: Vec<u8>,
}

impl<ID, SEQ> TryFrom<(ID, SEQ)> for Record
where
    ID: TryInto<String, Error: Error + Send + Sync + 'static>,
    SEQ: TryInto<Vec<u8>, Error: Error + Send + Sync + 'static>,
{
    type Error = eyre::Report;

    fn try_from(value: (ID, SEQ)) -> Result<Self> {
        Self::new(value.0.try_into()?, value.1.try_into()?)
    }
}

impl Record {
    pub fn new(id: String, seq: Vec<u8>) -> Result<Self> {
        Self::validate_id(&id)?;
        Self::validate_seq(&seq)?;
        Ok(Self { id, seq })
    }

    pub fn validate_id(id: &str) -> Result<()> {
        ensure!(!id.is_empty(), "FASTA ID cannot be empty");
        ensure!(
            !id.contains(['\n', '\r']),
            "Newline characters are not allowed in the FASTA ID: {id}"
        );
        Ok(())
    }

    pub fn validate_seq(seq: &[u8]) -> Result<()> {
        ensure!(!seq.is_empty(), "FASTA sequence cannot be empty");
        if let Some((i, x)) = seq.iter().enumerate().find(|(_, x)| !x.is_ascii_alphabetic()) {
            eyre::bail!("Non-alphabetic character at index {i} = {x:?}");
        }
        Ok(())
    }

    /// Sequence name, i.e. the first whitespace-delimited token of the ID line.
    pub fn name(&self) -> &str {
        self.id.split_whitespace().next().unwrap_or(&self.id)
    }

    /// Mutable access to the fields. The reader validates them after filling.
    pub(super) fn raw(&mut self) -> (&mut String, &mut Vec<u8>) {
        (&mut self.id, &mut self.seq)
    }
}
