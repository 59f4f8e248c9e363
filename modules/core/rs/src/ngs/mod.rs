pub use base::Base;

mod base;
