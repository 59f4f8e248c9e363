use derive_getters::Getters;

use crate::config::TrimConfig;
use crate::mapping::ReadPosition;

/// Private copy of a read's per-base arrays after edge trimming. Trimmed bases are marked as
/// [ReadPosition::Clipped].
#[derive(Clone, PartialEq, Eq, Debug, Default, Getters)]
pub struct TrimmedRead {
    bases: Vec<u8>,
    qualities: Vec<u8>,
    positions: Vec<ReadPosition>,
}

impl TrimmedRead {
    pub fn new(bases: &[u8], qualities: &[u8], positions: &[ReadPosition]) -> Self {
        let mut read = Self::default();
        read.reset(bases, qualities, positions);
        read
    }

    fn reset(&mut self, bases: &[u8], qualities: &[u8], positions: &[ReadPosition]) {
        debug_assert_eq!(bases.len(), positions.len());
        self.bases.clear();
        self.bases.extend_from_slice(bases);
        self.qualities.clear();
        self.qualities.extend_from_slice(qualities);
        self.positions.clear();
        self.positions.extend_from_slice(positions);
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Quality of the base or `None` if the read has no qualities.
    #[inline]
    pub fn quality(&self, ind: usize) -> Option<u8> {
        self.qualities.get(ind).copied()
    }

    #[inline]
    fn clip(&mut self, ind: usize) {
        self.positions[ind] = ReadPosition::Clipped;
    }

    /// Clip leading and trailing bases with the sentinel quality or an N call. Clipped bases are
    /// normalized to 'N'.
    pub fn trim_low_quality_tails(&mut self, sentinel: u8) {
        let length = self.len();
        if length < 2 {
            return;
        }

        let is_low = |read: &Self, ind: usize| {
            read.quality(ind) == Some(sentinel) || read.bases[ind].eq_ignore_ascii_case(&b'N')
        };

        let mut head = 0;
        while head < length && is_low(self, head) {
            self.clip(head);
            self.bases[head] = b'N';
            head += 1;
        }

        let mut tail = length;
        while tail > head && is_low(self, tail - 1) {
            self.clip(tail - 1);
            self.bases[tail - 1] = b'N';
            tail -= 1;
        }
    }

    /// Clip homopolymer runs at both read edges. A run is clipped only when the first two edge
    /// bases are identical, and then extends while bases equal the edge base.
    pub fn trim_homopolymer_edges(&mut self) {
        let length = self.len();
        if length < 2 {
            return;
        }

        let same = |a: u8, b: u8| a.eq_ignore_ascii_case(&b);

        let first = self.bases[0];
        let mut head = 0;
        if same(self.bases[1], first) {
            while head < length && same(self.bases[head], first) {
                self.clip(head);
                head += 1;
            }
        }

        let last = self.bases[length - 1];
        if same(self.bases[length - 2], last) {
            let mut tail = length;
            while tail > head && same(self.bases[tail - 1], last) {
                self.clip(tail - 1);
                tail -= 1;
            }
        }
    }
}

/// Applies the configured edge trimming heuristics to reads.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct EdgeTrimmer {
    config: TrimConfig,
}

impl EdgeTrimmer {
    pub fn new(config: TrimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrimConfig {
        &self.config
    }

    /// Copy the read into the buffer and trim it there. The input arrays are never modified.
    pub fn trim_into(
        &self,
        bases: &[u8],
        qualities: &[u8],
        positions: &[ReadPosition],
        into: &mut TrimmedRead,
    ) {
        into.reset(bases, qualities, positions);
        if *self.config.low_quality_tails() {
            into.trim_low_quality_tails(*self.config.low_quality_sentinel());
        }
        if *self.config.homopolymer_edges() {
            into.trim_homopolymer_edges();
        }
    }

    pub fn trim(&self, bases: &[u8], qualities: &[u8], positions: &[ReadPosition]) -> TrimmedRead {
        let mut read = TrimmedRead::default();
        self.trim_into(bases, qualities, positions, &mut read);
        read
    }
}
