/// Mapping qualities of all reads covering a locus, in arrival order.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct MapqList {
    values: Vec<u8>,
}

impl MapqList {
    /// Returned by [MapqList::median] for loci without reads.
    pub const EMPTY: f32 = -1.0;

    #[inline]
    pub fn add(&mut self, mapq: u8) {
        self.values.push(mapq);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Median mapping quality. The two middle values are averaged for even-sized lists.
    pub fn median(&mut self) -> f32 {
        let length = self.values.len();
        if length == 0 {
            return Self::EMPTY;
        }

        self.values.sort_unstable();
        let middle = length / 2;
        if length % 2 == 1 {
            self.values[middle] as f32
        } else {
            (self.values[middle - 1] as f32 + self.values[middle] as f32) / 2.0
        }
    }
}

impl FromIterator<u8> for MapqList {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
