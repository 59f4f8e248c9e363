pub use region_set::RegionSet;

#[allow(clippy::module_inception)]
mod region_set;
