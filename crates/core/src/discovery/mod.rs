//! Initializer discovery and dispatch.
//!
//! Initializers are found only through provider files, never by scanning
//! classes; each is mapped to an instance through the [`ProviderRegistry`]
//! and invoked once with the classes its contract asks for.
//!
//! [`ProviderRegistry`]: wabscope_plugin::ProviderRegistry

pub mod engine;

pub use engine::{DiscoveryReport, InitializerDiscovery, InvokedInitializer};
