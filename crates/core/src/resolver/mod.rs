//! Class-space resolution for web units.

pub mod class_space;

pub use class_space::{ClassSpace, ClassSpaceEntry, ClassSpaceResolver, LookupGroup, Origin};
