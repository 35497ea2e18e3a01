//! Capabilities of providers discovered inside a web unit's class space.
//!
//! Providers are never instantiated reflectively: a discovered class name is
//! mapped to an instance through an explicit [`ProviderRegistry`] factory.

pub mod cap;
pub mod contract;
pub mod registration;

pub use cap::*;
pub use contract::{InitializerContract, TypeMarker};
pub use registration::{
    BoxError, ConfiguratorFactory, InitializerFactory, InitializerRegistration, ProviderRegistry,
};
