mod config;
mod stream;

pub use config::{Config, Level};
pub use stream::Stream;
