use std::iter::Zip;
use std::vec::IntoIter;

use derive_getters::Dissolve;
use eyre::{eyre, Result};

use lociscan_core_rs::num::PrimUInt;

use super::identical::Identical;

pub struct RleVecBuilder<V, L: PrimUInt, I: Identical<V>> {
    values: Option<Vec<V>>,
    lengths: Option<Vec<L>>,
    identical: I,
}

impl<V, L: PrimUInt, I: Identical<V>> RleVecBuilder<V, L, I> {
    pub fn new(identical: I) -> Self {
        Self {
            values: None,
            lengths: None,
            identical,
        }
    }

    pub fn with_capacity(mut self, runs: usize) -> Self {
        self.values = Some(Vec::with_capacity(runs));
        self.lengths = Some(Vec::with_capacity(runs));
        self
    }

    /// Use pre-encoded runs as is. Runs are not re-merged, but zero-length runs are rejected.
    pub fn with_rle_values(mut self, values: Vec<V>, lengths: Vec<L>) -> Result<Self> {
        if values.len() != lengths.len() {
            return Err(eyre!(
                "Values and lengths must have the same length, got {} and {}",
                values.len(),
                lengths.len()
            ));
        }
        if lengths.iter().any(|x| x.is_zero()) {
            return Err(eyre!("Runs of zero length are not allowed"));
        }

        self.values = Some(values);
        self.lengths = Some(lengths);
        Ok(self)
    }

    /// Encode a dense array of values, merging consecutive identical values into runs.
    pub fn with_dense_values(mut self, dense: &[V]) -> Result<Self>
    where
        V: Clone,
    {
        let mut values = self.values.take().unwrap_or_default();
        let mut lengths = self.lengths.take().unwrap_or_default();
        values.clear();
        lengths.clear();

        let mut iter = dense.iter();
        if let Some(first) = iter.next() {
            let mut current = first;
            let mut length = L::one();
            for value in iter {
                if self.identical.identical(current, value) {
                    length = length
                        .checked_add(&L::one())
                        .ok_or_else(|| eyre!("Run length overflow at {:?}", L::max_value()))?;
                } else {
                    values.push(current.clone());
                    lengths.push(length);
                    current = value;
                    length = L::one();
                }
            }
            values.push(current.clone());
            lengths.push(length);
        }

        self.values = Some(values);
        self.lengths = Some(lengths);
        Ok(self)
    }

    pub fn build(self) -> RleVec<V, L, I> {
        RleVec {
            values: self.values.unwrap_or_default(),
            lengths: self.lengths.unwrap_or_default(),
            identical: self.identical,
        }
    }
}

#[derive(Debug, Clone, Dissolve)]
pub struct RleVec<V, L: PrimUInt, I: Identical<V>> {
    values: Vec<V>,
    lengths: Vec<L>,
    identical: I,
}

impl<V, L: PrimUInt, I: Identical<V>> RleVec<V, L, I> {
    pub fn builder(identical: I) -> RleVecBuilder<V, L, I> {
        RleVecBuilder::new(identical)
    }

    /// Reuse the allocated buffers to build a new vector.
    pub fn rebuild(mut self) -> RleVecBuilder<V, L, I> {
        self.clear();

        RleVecBuilder {
            values: Some(self.values),
            lengths: Some(self.lengths),
            identical: self.identical,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Number of values encoded by all runs.
    pub fn total_length(&self) -> u64 {
        self.lengths
            .iter()
            .map(|x| x.to_u64().unwrap_or(u64::MAX))
            .fold(0u64, |acc, x| acc.saturating_add(x))
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.lengths.clear();
    }

    /// Push a new run without merging it with the last one.
    pub fn push(&mut self, value: V, length: L) {
        self.values.push(value);
        self.lengths.push(length);
    }

    /// Append a run, extending the last run when the values are identical. Zero-length runs are
    /// ignored. Runs that would overflow `L` are split.
    pub fn append(&mut self, value: V, length: L) {
        if length.is_zero() {
            return;
        }
        if let (Some(last), Some(last_len)) = (self.values.last(), self.lengths.last_mut()) {
            if self.identical.identical(last, &value) {
                match last_len.checked_add(&length) {
                    Some(merged) => {
                        *last_len = merged;
                        return;
                    }
                    None => {
                        let room = L::max_value() - *last_len;
                        *last_len = L::max_value();
                        self.values.push(value);
                        self.lengths.push(length - room);
                        return;
                    }
                }
            }
        }
        self.push(value, length);
    }

    pub fn runs(&self) -> impl Iterator<Item = (&V, &L)> {
        self.values.iter().zip(self.lengths.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }

    /// Expand the runs back into a dense array.
    pub fn to_dense(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut dense = Vec::with_capacity(self.total_length() as usize);
        for (value, length) in self.runs() {
            let length = length.to_usize().unwrap_or(0);
            dense.extend(std::iter::repeat_n(value.clone(), length));
        }
        dense
    }
}

impl<V, L: PrimUInt, I: Identical<V>> IntoIterator for RleVec<V, L, I> {
    type Item = (V, L);
    type IntoIter = Zip<IntoIter<V>, IntoIter<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter().zip(self.lengths)
    }
}
