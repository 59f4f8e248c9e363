use std::cmp::Ordering;
use std::thread::available_parallelism;

use eyre::{Result, WrapErr};

/// Normalize the requested number of threads against the number of available cores:
/// * positive values are capped at `max`;
/// * zero means a single thread;
/// * negative values count back from `max`, i.e. -1 is all cores, -2 is all cores but one, etc.
fn normalize(requested: isize, max: isize) -> usize {
    match requested.cmp(&0) {
        Ordering::Less => (max + requested + 1).max(1) as usize,
        Ordering::Equal => 1,
        Ordering::Greater => requested.min(max) as usize,
    }
}

/// Number of worker threads to use for the `requested` value (see [normalize] for the rules).
pub fn threads(requested: isize) -> Result<usize> {
    let max = available_parallelism()
        .wrap_err("Failed to query the number of available cores")?
        .get() as isize;
    Ok(normalize(requested, max))
}
