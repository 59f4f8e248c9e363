use std::error::Error;
use std::fmt::{Debug, Display};
use std::str::FromStr;

use lociscan_collections_rs::rle_vec::RleVec;

/// Values that can be stored in a track file.
pub trait TrackValue:
    Copy + PartialEq + Debug + Display + FromStr<Err: Error + Send + Sync + 'static> + Send + Sync
{
}

impl<T> TrackValue for T where
    T: Copy
        + PartialEq
        + Debug
        + Display
        + FromStr<Err: Error + Send + Sync + 'static>
        + Send
        + Sync
{
}

/// Run-length encoded values of a single chromosome, runs are merged by equality.
pub type Track<V> = RleVec<V, u32, fn(&V, &V) -> bool>;

fn identical<V: PartialEq>(first: &V, second: &V) -> bool {
    first == second
}

/// Empty track ready to accept runs.
pub fn empty<V: TrackValue>() -> Track<V> {
    Track::<V>::builder(identical::<V> as fn(&V, &V) -> bool).build()
}
