use std::fmt::{Debug, Display};
use std::rc::Rc;
use std::sync::Arc;

use crate::num::PrimInt;
use derive_getters::Dissolve;
use eyre::{eyre, Report, Result};
use impl_tools::autoimpl;

/// Interval is a half-open genomic region [start, end).
/// It's not represented as a Rust-native Range to prohibit 'empty' intervals (start == end) and
/// intervals with negative length (start > end).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Dissolve)]
pub struct Interval<Idx: PrimInt> {
    start: Idx,
    end: Idx,
}

/// Trait for types that can be generally viewed as half-open genomic intervals [start, end).
#[autoimpl(for <T: trait + ?Sized> &T, Box<T>, Rc<T>, Arc<T>)]
#[allow(clippy::len_without_is_empty)]
pub trait IntervalOp {
    type Idx: PrimInt;

    /// Start position of the interval-like object.
    fn start(&self) -> Self::Idx;

    /// End position of the interval-like object.
    fn end(&self) -> Self::Idx;

    /// Length of the interval-like object.
    fn len(&self) -> Self::Idx {
        self.end() - self.start()
    }

    /// Check if the interval-like object contains a given position.
    fn contains(&self, pos: Self::Idx) -> bool {
        self.start() <= pos && pos < self.end()
    }

    /// Check if the interval-like object intersects with another interval-like object.
    /// The condition is strict and doesn't allow touching intervals.
    fn intersects(&self, other: &Self) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }
}

impl<T: PrimInt> IntervalOp for Interval<T> {
    type Idx = T;

    #[inline(always)]
    fn start(&self) -> Self::Idx {
        self.start
    }
    #[inline(always)]
    fn end(&self) -> Self::Idx {
        self.end
    }
}

impl<Idx: PrimInt> Interval<Idx> {
    pub fn new(start: Idx, end: Idx) -> Result<Self> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(eyre!("Invalid interval: start >= end ({start:?} >= {end:?})"))
        }
    }

    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Sort the intervals and merge all overlapping or touching ones.
    pub fn merge(intervals: &mut [Self]) -> Vec<Self> {
        intervals.sort_by_key(|x| x.start);

        let mut merged: Vec<Self> = Vec::with_capacity(intervals.len());
        for current in intervals.iter() {
            match merged.last_mut() {
                Some(last) if current.start <= last.end => {
                    last.end = last.end.max(current.end);
                }
                _ => merged.push(*current),
            }
        }
        merged
    }

    pub fn cast<T: PrimInt>(&self) -> Option<Interval<T>> {
        match (T::from(self.start), T::from(self.end)) {
            (Some(start), Some(end)) => Some(Interval { start, end }),
            _ => None,
        }
    }
}

impl<Idx: PrimInt> Default for Interval<Idx> {
    fn default() -> Self {
        Self {
            start: Idx::zero(),
            end: Idx::one(),
        }
    }
}

impl<Idx: PrimInt + Display> Display for Interval<Idx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl<Idx: PrimInt> TryFrom<(Idx, Idx)> for Interval<Idx> {
    type Error = Report;

    fn try_from(value: (Idx, Idx)) -> Result<Self, Self::Error> {
        Self::new(value.0, value.1)
    }
}
