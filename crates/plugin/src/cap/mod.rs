pub mod configurator;
pub mod initializer;

pub use configurator::*;
pub use initializer::*;
