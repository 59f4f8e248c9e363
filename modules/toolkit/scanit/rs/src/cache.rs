use ahash::AHashMap;
use derive_getters::Getters;
use eyre::Result;

/// Sparse per-position cache of locus accumulators for a single chromosome.
///
/// Positions are filled while records are consumed in coordinate order and drained (finalized
/// and evicted) once no upcoming record can reach them. Positions below the drain frontier are
/// never present in the cache.
#[derive(Clone, Debug, Getters)]
pub struct LocusCache<A> {
    #[getter(skip)]
    loci: AHashMap<u32, A>,
    window: u32,
    observed_span: u32,
    length: u32,
    fill_frontier: u32,
    drain_frontier: u32,
    late: usize,
    #[getter(skip)]
    keys: Vec<u32>,
}

impl<A: Default> LocusCache<A> {
    /// Margin added to the longest observed alignment span.
    pub const SPAN_MARGIN: u32 = 16;
    // Ranges up to this many positions per cached locus are drained by probing each position
    const DENSE_DRAIN_FACTOR: usize = 4;

    pub fn new(window: u32) -> Self {
        Self {
            loci: AHashMap::new(),
            window,
            observed_span: 0,
            length: 0,
            fill_frontier: 1,
            drain_frontier: 1,
            late: 0,
            keys: Vec::new(),
        }
    }

    /// Clear the cache and prepare it for a chromosome of the given length.
    pub fn reset(&mut self, length: u32) {
        self.loci.clear();
        self.length = length;
        self.observed_span = 0;
        self.fill_frontier = 1;
        self.drain_frontier = 1;
        self.late = 0;
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    pub fn contains(&self, position: u32) -> bool {
        self.loci.contains_key(&position)
    }

    pub fn get(&self, position: u32) -> Option<&A> {
        self.loci.get(&position)
    }

    /// Apply a contribution to the locus at the 1-based position, creating it if needed.
    ///
    /// Returns `false` if the position lies outside the chromosome or was already drained. The
    /// latter is counted as a late contribution.
    #[inline]
    pub fn fill(&mut self, position: u32, contribute: impl FnOnce(&mut A)) -> bool {
        if position == 0 || position > self.length {
            return false;
        }
        if position < self.drain_frontier {
            self.late += 1;
            return false;
        }

        contribute(self.loci.entry(position).or_default());
        self.fill_frontier = self.fill_frontier.max(position);
        true
    }

    /// Register the reference span of a consumed alignment to widen the drain window if needed.
    #[inline]
    pub fn observe_span(&mut self, span: u32) {
        self.observed_span = self.observed_span.max(span);
    }

    /// Distance kept between the fill and drain frontiers.
    pub fn effective_window(&self) -> u32 {
        self.window
            .max(self.observed_span.saturating_add(Self::SPAN_MARGIN))
    }

    /// Whether an opportunistic drain is worth running. Drains start once the frontiers are more
    /// than two windows apart, so each one evicts at least a window of positions. Close to the
    /// chromosome end everything is left for the final drain.
    pub fn should_drain(&self) -> bool {
        let window = self.effective_window();
        self.fill_frontier.saturating_sub(self.drain_frontier) > window.saturating_mul(2)
            && self.length.saturating_sub(self.fill_frontier) > window
    }

    /// Exclusive upper bound for a safe opportunistic drain.
    pub fn drain_bound(&self) -> u32 {
        self.fill_frontier
            .saturating_sub(self.effective_window())
            .max(self.drain_frontier)
    }

    /// Finalize every cached locus in `[drain_frontier, upto)` in ascending order and move the
    /// drain frontier to `upto`. Returns the number of finalized loci.
    pub fn drain(
        &mut self,
        upto: u32,
        mut finalize: impl FnMut(u32, A) -> Result<()>,
    ) -> Result<usize> {
        if upto <= self.drain_frontier {
            return Ok(0);
        }

        let span = (upto - self.drain_frontier) as usize;
        let mut drained = 0;
        if span <= self.loci.len().saturating_mul(Self::DENSE_DRAIN_FACTOR) {
            for position in self.drain_frontier..upto {
                if let Some(locus) = self.loci.remove(&position) {
                    finalize(position, locus)?;
                    drained += 1;
                }
            }
        } else {
            self.keys.clear();
            self.keys
                .extend(self.loci.keys().copied().filter(|x| *x < upto));
            self.keys.sort_unstable();
            for position in self.keys.drain(..) {
                if let Some(locus) = self.loci.remove(&position) {
                    finalize(position, locus)?;
                    drained += 1;
                }
            }
        }

        self.drain_frontier = upto;
        self.fill_frontier = self.fill_frontier.max(upto);
        Ok(drained)
    }

    /// Finalize all remaining loci of the chromosome.
    pub fn drain_all(&mut self, finalize: impl FnMut(u32, A) -> Result<()>) -> Result<usize> {
        let upto = self.length.saturating_add(1).max(self.drain_frontier);
        let drained = self.drain(upto, finalize)?;
        debug_assert!(self.loci.is_empty());
        Ok(drained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;

    fn cache(window: u32, length: u32) -> LocusCache<u32> {
        let mut cache = LocusCache::new(window);
        cache.reset(length);
        cache
    }

    #[test]
    fn test_fill() {
        let mut cache = cache(10, 100);
        assert!(cache.fill(5, |x| *x += 1));
        assert!(cache.fill(5, |x| *x += 1));
        assert!(cache.fill(100, |x| *x += 1));
        assert!(!cache.fill(0, |x| *x += 1));
        assert!(!cache.fill(101, |x| *x += 1));

        assert_eq!(cache.get(5), Some(&2));
        assert_eq!(cache.len(), 2);
        assert_eq!(*cache.fill_frontier(), 100);
        assert_eq!(*cache.late(), 0);
    }

    #[test]
    fn test_drain_evicts_everything_below_bound() -> Result<()> {
        let positions = [17u32, 3, 250, 42, 3, 99, 1, 180, 42, 1000, 64, 2];
        // Small ranges probe every position, large ones sort the cached keys
        for upto in [1, 2, 20, 50, 200, 5000] {
            let mut cache = cache(10, 1000);
            for pos in positions {
                cache.fill(pos, |x| *x += 1);
            }
            let before: AHashSet<u32> = cache.loci.keys().copied().collect();

            let mut seen = Vec::new();
            let drained = cache.drain(upto, |pos, _| {
                seen.push(pos);
                Ok(())
            })?;

            let mut expected: Vec<u32> = before.iter().copied().filter(|x| *x < upto).collect();
            expected.sort();
            assert_eq!(seen, expected, "{upto}");
            assert_eq!(drained, expected.len());
            assert!(cache.loci.keys().all(|x| *x >= upto), "{upto}");
            assert_eq!(*cache.drain_frontier(), upto);
        }
        Ok(())
    }

    #[test]
    fn test_late_contributions() -> Result<()> {
        let mut cache = cache(10, 100);
        cache.fill(20, |x| *x += 1);
        cache.fill(30, |x| *x += 1);
        cache.drain(25, |_, _| Ok(()))?;

        assert!(!cache.fill(24, |x| *x += 1));
        assert!(cache.fill(25, |x| *x += 1));
        assert_eq!(*cache.late(), 1);
        assert!(!cache.contains(24));
        Ok(())
    }

    #[test]
    fn test_drain_policy() {
        let mut cache = cache(10, 100);
        cache.fill(5, |_| {});
        assert!(!cache.should_drain());

        // The window is never narrower than the span margin
        assert_eq!(cache.effective_window(), 16);
        cache.fill(30, |_| {});
        assert!(!cache.should_drain());
        cache.fill(50, |_| {});
        assert!(cache.should_drain());
        assert_eq!(cache.drain_bound(), 34);

        // Near the chromosome end everything is left for the final drain
        cache.fill(95, |_| {});
        assert!(!cache.should_drain());

        // Long alignments widen the window
        cache.observe_span(30);
        assert_eq!(cache.effective_window(), 46);
        assert_eq!(cache.drain_bound(), 49);
    }

    #[test]
    fn test_drains_are_occasional() -> Result<()> {
        let mut cache = cache(10, 1000);
        let window = cache.effective_window();
        let mut spans = Vec::new();
        for position in 1..=900 {
            cache.fill(position, |x| *x += 1);
            if cache.should_drain() {
                let before = *cache.drain_frontier();
                let bound = cache.drain_bound();
                cache.drain(bound, |_, _| Ok(()))?;
                spans.push(bound - before);
            }
            assert!(*cache.fill_frontier() - *cache.drain_frontier() <= 2 * window);
        }

        assert!(spans.len() < 60, "{} drains", spans.len());
        assert!(spans.iter().all(|x| *x > window), "{spans:?}");
        assert_eq!(*cache.late(), 0);
        Ok(())
    }

    #[test]
    fn test_drain_all_and_reset() -> Result<()> {
        let mut cache = cache(10, 100);
        for pos in [1, 50, 100] {
            cache.fill(pos, |x| *x += pos);
        }
        let mut seen = Vec::new();
        assert_eq!(
            cache.drain_all(|pos, value| {
                seen.push((pos, value));
                Ok(())
            })?,
            3
        );
        assert_eq!(seen, vec![(1, 1), (50, 50), (100, 100)]);
        assert!(cache.is_empty());
        assert_eq!(*cache.drain_frontier(), 101);

        cache.reset(10);
        assert_eq!((*cache.fill_frontier(), *cache.drain_frontier()), (1, 1));
        assert!(cache.fill(1, |_| {}));
        Ok(())
    }

    #[test]
    fn test_failed_finalization_propagates() {
        let mut cache = cache(10, 100);
        cache.fill(7, |_| {});
        assert!(cache
            .drain(50, |_, _| Err(eyre::eyre!("finalization failed")))
            .is_err());
    }
}
