pub mod descriptor;
pub mod error;
pub mod graph;
pub mod models;
pub mod server;

// Re-export commonly used types
pub use descriptor::{DescriptorParser, WebFragmentDescriptor};
pub use error::{LookupError, LookupResult, ParseError, RegistrationError};
pub use graph::{ModuleResources, WiringGraph};
pub use models::*;
pub use server::{EndpointContainer, ServerContext};
