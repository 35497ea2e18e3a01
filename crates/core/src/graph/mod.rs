//! Module graph access.
//!
//! - [`GraphSnapshot`]: immutable arena copy of modules, attachments and
//!   wiring taken at the start of a deployment pass.
//! - [`InMemoryModuleRegistry`]: mutable reference runtime implementing both
//!   collaborator traits.

pub mod registry;
pub mod snapshot;

pub use registry::InMemoryModuleRegistry;
pub use snapshot::{GraphSnapshot, ModuleLink, SnapshotProvider};
