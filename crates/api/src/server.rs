use crate::error::RegistrationError;
use crate::models::{ClassInfo, EndpointConfig, ModuleId};
use std::sync::Arc;

/// Server-side endpoint registry of a running web context.
pub trait EndpointContainer: Send + Sync {
    fn register_endpoint(&self, config: &EndpointConfig) -> Result<(), RegistrationError>;

    /// Register a self-describing (annotated) endpoint class.
    fn register_endpoint_class(&self, class: &ClassInfo) -> Result<(), RegistrationError>;
}

/// Handle to the server-side context an initializer runs against.
pub trait ServerContext: Send + Sync {
    /// The web unit being deployed.
    fn unit(&self) -> ModuleId;

    /// Context path the unit is published under.
    fn context_path(&self) -> &str;

    /// Endpoint container, when the server supports endpoint registration.
    fn endpoint_container(&self) -> Option<Arc<dyn EndpointContainer>> {
        None
    }
}
