use std::fmt::Display;

/// Nucleotide identity of a sequenced or reference base. Everything that is not an unambiguous
/// A/T/C/G call (IUPAC ambiguity codes, gaps, N) collapses into [Base::N], the "other" class.
///
/// The discriminants are stable and used as indices into per-base tallies (A, T, C, G, N).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(u8)]
pub enum Base {
    A = 0,
    T = 1,
    C = 2,
    G = 3,
    #[default]
    N = 4,
}

impl Base {
    /// Number of distinct base classes.
    pub const COUNT: usize = 5;
    /// All base classes in the index order.
    pub const ALL: [Base; Self::COUNT] = [Base::A, Base::T, Base::C, Base::G, Base::N];
    /// Unambiguous nucleotides only.
    pub const ACGT: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];

    /// Parse an ASCII symbol. Case-insensitive, per the SAM specification.
    #[inline]
    pub fn from_ascii(symbol: u8) -> Self {
        match symbol {
            b'A' | b'a' => Base::A,
            b'T' | b't' => Base::T,
            b'C' | b'c' => Base::C,
            b'G' | b'g' => Base::G,
            _ => Base::N,
        }
    }

    /// Index of the base in per-base arrays.
    #[inline(always)]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Watson-Crick complement, N stays N.
    pub fn complement(&self) -> Self {
        match self {
            Base::A => Base::T,
            Base::T => Base::A,
            Base::C => Base::G,
            Base::G => Base::C,
            Base::N => Base::N,
        }
    }

    pub fn is_n(&self) -> bool {
        matches!(self, Base::N)
    }

    pub fn symbol(&self) -> char {
        match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::C => 'C',
            Base::G => 'G',
            Base::N => 'N',
        }
    }
}

impl Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
