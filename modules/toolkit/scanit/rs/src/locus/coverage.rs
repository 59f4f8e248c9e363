/// Number of reads covering a locus.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct DepthCounter {
    depth: u32,
}

impl DepthCounter {
    #[inline]
    pub fn add(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}
