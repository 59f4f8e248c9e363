use derive_getters::Dissolve;
use derive_more::Constructor;

use super::strand::Strand;

/// A struct that holds data for each strand.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Dissolve, Constructor,
)]
pub struct PerStrand<T> {
    pub forward: T,
    pub reverse: T,
}

impl<T> PerStrand<T> {
    /// Gets a reference to the data for the specified strand.
    pub fn get(&self, strand: Strand) -> &T {
        match strand {
            Strand::Forward => &self.forward,
            Strand::Reverse => &self.reverse,
        }
    }

    /// Gets a mutable reference to the data for the specified strand.
    pub fn get_mut(&mut self, strand: Strand) -> &mut T {
        match strand {
            Strand::Forward => &mut self.forward,
            Strand::Reverse => &mut self.reverse,
        }
    }

    /// Iterate over (strand, data) pairs, forward strand first.
    pub fn iter(&self) -> impl Iterator<Item = (Strand, &T)> {
        [(Strand::Forward, &self.forward), (Strand::Reverse, &self.reverse)].into_iter()
    }

    /// Apply a function to the data of each strand, producing a new [PerStrand].
    pub fn map<R>(self, mut f: impl FnMut(Strand, T) -> R) -> PerStrand<R> {
        PerStrand {
            forward: f(Strand::Forward, self.forward),
            reverse: f(Strand::Reverse, self.reverse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_strand_access() {
        let mut data = PerStrand::new(1, 2);
        assert_eq!(*data.get(Strand::Forward), 1);
        assert_eq!(*data.get(Strand::Reverse), 2);

        *data.get_mut(Strand::Reverse) += 10;
        assert_eq!(data.reverse, 12);

        let strands: Vec<_> = data.iter().map(|(s, x)| (s, *x)).collect();
        assert_eq!(strands, vec![(Strand::Forward, 1), (Strand::Reverse, 12)]);
    }

    #[test]
    fn test_per_strand_map() {
        let data = PerStrand::new(vec![1, 2], vec![3]);
        let lengths = data.map(|_, x| x.len());
        assert_eq!(lengths, PerStrand::new(2, 1));
    }
}
