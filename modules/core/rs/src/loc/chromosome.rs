use std::fmt::Display;

use derive_getters::{Dissolve, Getters};
use eyre::{ensure, Result};

/// A named reference sequence with a known length. Positions on a chromosome are 1-based and
/// span [1, length].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Dissolve, Getters)]
pub struct Chromosome {
    name: String,
    length: u32,
}

impl Chromosome {
    pub fn new(name: impl Into<String>, length: u32) -> Result<Self> {
        let name = name.into();
        ensure!(!name.is_empty(), "Chromosome name cannot be empty");
        ensure!(length > 0, "Chromosome {name} must have a positive length");
        Ok(Self { name, length })
    }

    /// Whether the 1-based position lies on the chromosome.
    pub fn contains(&self, position: u32) -> bool {
        position >= 1 && position <= self.length
    }
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bp)", self.name, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromosome() -> Result<()> {
        let chr = Chromosome::new("chr1", 100)?;
        assert_eq!(chr.name(), "chr1");
        assert_eq!(*chr.length(), 100);
        assert!(!chr.contains(0));
        assert!(chr.contains(1));
        assert!(chr.contains(100));
        assert!(!chr.contains(101));
        assert_eq!(chr.to_string(), "chr1 (100 bp)");

        assert!(Chromosome::new("", 10).is_err());
        assert!(Chromosome::new("chrM", 0).is_err());
        Ok(())
    }
}
