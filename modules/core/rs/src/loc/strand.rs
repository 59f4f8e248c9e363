use std::fmt::Display;

/// Strand of the reference genome a read was sequenced from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(i8)]
pub enum Strand {
    /// The forward strand, also known as the positive strand or Watson strand.
    #[default]
    Forward = 1,
    /// The reverse strand, also known as the negative strand or Crick strand.
    Reverse = -1,
}

impl Strand {
    /// Strand of an alignment given its SAM "reverse complemented" flag.
    pub fn from_reverse_flag(is_reverse_complemented: bool) -> Self {
        if is_reverse_complemented {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    /// New strand that is the opposite of the current one.
    pub fn flipped(&self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// Get the symbolic representation of the strand.
    pub fn symbol(&self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Strand {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Self::Forward),
            '-' => Ok(Self::Reverse),
            _ => Err(()),
        }
    }
}
