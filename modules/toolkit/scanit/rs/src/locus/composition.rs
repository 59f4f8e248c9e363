use lociscan_core_rs::ngs::Base;

/// Observation classes tallied by [Composition].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum Code {
    A = 0,
    T = 1,
    C = 2,
    G = 3,
    N = 4,
    Clip = 5,
    Insertion = 6,
    Deletion = 7,
}

impl Code {
    pub const COUNT: usize = 8;

    #[inline(always)]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl From<Base> for Code {
    fn from(value: Base) -> Self {
        match value {
            Base::A => Code::A,
            Base::T => Code::T,
            Base::C => Code::C,
            Base::G => Code::G,
            Base::N => Code::N,
        }
    }
}

/// Structural composition of a locus: called bases plus clipped, inserted and deleted events.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Composition {
    counts: [u32; Code::COUNT],
}

impl Composition {
    #[inline]
    pub fn add(&mut self, code: Code) {
        let slot = &mut self.counts[code.index()];
        *slot = slot.saturating_add(1);
    }

    pub fn count(&self, code: Code) -> u32 {
        self.counts[code.index()]
    }

    pub fn counts(&self) -> &[u32; Code::COUNT] {
        &self.counts
    }

    pub fn depth(&self) -> u64 {
        self.counts.iter().map(|x| *x as u64).sum()
    }

    /// Shannon entropy of the code distribution in bits, 0 for an empty locus.
    pub fn entropy(&self) -> f32 {
        let depth = self.depth();
        if depth == 0 {
            return 0.0;
        }

        let depth = depth as f64;
        let entropy: f64 = self
            .counts
            .iter()
            .filter(|x| **x > 0)
            .map(|x| {
                let p = *x as f64 / depth;
                -p * p.log2()
            })
            .sum();
        // -0.0 for single-code loci
        entropy.abs() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composition(codes: &[(Code, u32)]) -> Composition {
        let mut result = Composition::default();
        for (code, times) in codes {
            for _ in 0..*times {
                result.add(*code);
            }
        }
        result
    }

    #[test]
    fn test_entropy() {
        for (codes, expected) in [
            (vec![], 0.0),
            (vec![(Code::A, 10)], 0.0),
            (vec![(Code::A, 5), (Code::T, 5)], 1.0),
            (vec![(Code::A, 2), (Code::Clip, 2), (Code::Insertion, 2), (Code::Deletion, 2)], 2.0),
            (vec![(Code::G, 3), (Code::N, 1)], 0.811_278),
        ] {
            let entropy = composition(&codes).entropy();
            assert!((entropy - expected).abs() < 1e-5, "{codes:?}: {entropy}");
        }
    }

    #[test]
    fn test_counts() {
        let locus = composition(&[(Code::from(Base::C), 2), (Code::Deletion, 1)]);
        assert_eq!(locus.count(Code::C), 2);
        assert_eq!(locus.count(Code::Deletion), 1);
        assert_eq!(locus.count(Code::A), 0);
        assert_eq!(locus.depth(), 3);
    }
}
