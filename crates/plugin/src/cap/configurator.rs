use wabscope_api::{ClassSet, EndpointConfig};

/// Application-provided reconciliation of candidate endpoints.
///
/// Returning `None` means "no answer" and contributes nothing.
pub trait Configurator: Send + Sync {
    /// Build registrations for classes implementing the endpoint type.
    fn endpoint_configs(&self, endpoint_classes: &ClassSet) -> Option<Vec<EndpointConfig>>;

    /// Pick the annotated endpoint classes that should be deployed.
    fn annotated_endpoint_classes(&self, annotated: &ClassSet) -> Option<ClassSet>;
}
