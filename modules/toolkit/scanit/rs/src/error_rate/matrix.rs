use derive_getters::Getters;
use itertools::Itertools;

use lociscan_core_rs::ngs::Base;

/// Reference base to observed base tallies: how many base calls were eligible for each reference
/// base and how many of them disagreed with it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ErrorConfusionMatrix {
    eligible: [u64; Base::COUNT],
    errors: [[u64; Base::COUNT]; Base::COUNT],
}

/// A single substitution of the error-rate table.
#[derive(Clone, Copy, PartialEq, Debug, Getters)]
pub struct ErrorRow {
    reference: Base,
    alternative: Base,
    eligible: u64,
    errors: u64,
    /// NaN when there were no eligible calls.
    rate: f64,
}

impl ErrorConfusionMatrix {
    /// Add base counts (indexed by [Base::index]) observed at a locus with the given reference.
    /// Ambiguous calls are not eligible.
    pub fn add(&mut self, reference: Base, counts: &[u32; Base::COUNT]) {
        let row = reference.index();
        for base in Base::ACGT {
            let count = counts[base.index()] as u64;
            self.eligible[row] += count;
            if base != reference {
                self.errors[row][base.index()] += count;
            }
        }
    }

    pub fn merge(&mut self, other: &ErrorConfusionMatrix) {
        for row in 0..Base::COUNT {
            self.eligible[row] += other.eligible[row];
            for col in 0..Base::COUNT {
                self.errors[row][col] += other.errors[row][col];
            }
        }
    }

    pub fn eligible(&self, reference: Base) -> u64 {
        self.eligible[reference.index()]
    }

    pub fn errors(&self, reference: Base, alternative: Base) -> u64 {
        self.errors[reference.index()][alternative.index()]
    }

    pub fn rate(&self, reference: Base, alternative: Base) -> f64 {
        let eligible = self.eligible(reference);
        if eligible == 0 {
            return f64::NAN;
        }
        self.errors(reference, alternative) as f64 / eligible as f64
    }

    /// All substitutions between unambiguous bases in the A, T, C, G order.
    pub fn rows(&self) -> impl Iterator<Item = ErrorRow> + '_ {
        Base::ACGT
            .into_iter()
            .cartesian_product(Base::ACGT)
            .filter(|(reference, alternative)| reference != alternative)
            .map(move |(reference, alternative)| ErrorRow {
                reference,
                alternative,
                eligible: self.eligible(reference),
                errors: self.errors(reference, alternative),
                rate: self.rate(reference, alternative),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_rate() {
        let mut matrix = ErrorConfusionMatrix::default();
        matrix.add(Base::A, &[18, 2, 0, 0, 3]);
        assert_eq!(matrix.eligible(Base::A), 20);
        assert_eq!(matrix.errors(Base::A, Base::T), 2);
        assert_eq!(matrix.errors(Base::A, Base::A), 0);
        assert_eq!(matrix.errors(Base::A, Base::N), 0);
        assert_eq!(matrix.rate(Base::A, Base::T), 0.1);
        assert!(matrix.rate(Base::C, Base::G).is_nan());

        let mut other = ErrorConfusionMatrix::default();
        other.add(Base::A, &[20, 0, 0, 0, 0]);
        matrix.merge(&other);
        assert_eq!(matrix.eligible(Base::A), 40);
        assert_eq!(matrix.rate(Base::A, Base::T), 0.05);
    }

    #[test]
    fn test_rows() {
        let matrix = ErrorConfusionMatrix::default();
        let rows: Vec<_> = matrix
            .rows()
            .map(|x| format!("{}>{}", x.reference(), x.alternative()))
            .collect();
        assert_eq!(
            rows,
            vec![
                "A>T", "A>C", "A>G", "T>A", "T>C", "T>G", "C>A", "C>T", "C>G", "G>A", "G>T", "G>C"
            ]
        );
    }
}
