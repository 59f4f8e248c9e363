pub mod region_set;
pub mod rle_vec;
