use super::merger::{EndpointCandidates, merge_endpoint_configuration};
use std::sync::Arc;
use tracing::{debug, info, warn};
use wabscope_api::{ClassInfo, ClassSet, ServerContext};
use wabscope_plugin::{
    Configurator, Initializer, InitializerContract, InitializerError, ProviderRegistry, TypeMarker,
};

/// Provider class name the built-in endpoint initializer is registered under.
pub const ENDPOINT_INITIALIZER: &str = "org.wabscope.endpoint.EndpointInitializer";
pub const ENDPOINT_TYPE: &str = "jakarta.websocket.Endpoint";
pub const SERVER_APPLICATION_CONFIG: &str = "jakarta.websocket.server.ServerApplicationConfig";
pub const SERVER_ENDPOINT: &str = "jakarta.websocket.server.ServerEndpoint";

/// Registers connection endpoints found in the unit's class space.
///
/// Endpoints and configurators are taken directly from the classes handed to
/// [`Initializer::on_startup`].
pub struct EndpointInitializer {
    configurators: ProviderRegistry,
    excluded_package_prefixes: Vec<String>,
}

impl EndpointInitializer {
    /// `configurators` resolves configurator class names to instances.
    pub fn new(configurators: ProviderRegistry, excluded_package_prefixes: Vec<String>) -> Self {
        Self {
            configurators,
            excluded_package_prefixes,
        }
    }

    pub fn contract() -> InitializerContract {
        InitializerContract::new(ENDPOINT_INITIALIZER)
            .handles(TypeMarker::supertype(ENDPOINT_TYPE))
            .handles(TypeMarker::supertype(SERVER_APPLICATION_CONFIG))
            .handles(TypeMarker::annotation(SERVER_ENDPOINT))
    }

    fn is_candidate(&self, class: &ClassInfo) -> bool {
        let package = class.package();
        class.is_instantiable()
            && !self
                .excluded_package_prefixes
                .iter()
                .any(|prefix| package.starts_with(prefix.as_str()))
    }

    /// Split `classes` into endpoint candidates and configurator instances.
    pub fn classify(&self, classes: &ClassSet) -> (EndpointCandidates, Vec<Arc<dyn Configurator>>) {
        let mut candidates = EndpointCandidates::default();
        let mut configurators = Vec::new();

        for class in classes.iter().filter(|c| self.is_candidate(c)) {
            if class.is_assignable_to(ENDPOINT_TYPE) {
                candidates.endpoint_classes.insert(class.clone());
            }
            if class.is_assignable_to(SERVER_APPLICATION_CONFIG) {
                match self.configurators.instantiate_configurator(&class.name) {
                    Some(Ok(configurator)) => configurators.push(configurator),
                    Some(Err(e)) => {
                        warn!("Problem instantiating configurator {}: {}. Skipping", class.name, e)
                    }
                    None => warn!("No configurator registered for {}. Skipping", class.name),
                }
            }
            if class.has_annotation(SERVER_ENDPOINT) {
                candidates.annotated_classes.insert(class.clone());
            }
        }

        (candidates, configurators)
    }
}

impl Initializer for EndpointInitializer {
    fn on_startup(
        &self,
        classes: &ClassSet,
        ctx: &dyn ServerContext,
    ) -> Result<(), InitializerError> {
        let Some(container) = ctx.endpoint_container() else {
            warn!(
                unit = %ctx.unit(),
                "No endpoint container available in server context. Skipping endpoint registration."
            );
            return Ok(());
        };

        let (candidates, configurators) = self.classify(classes);
        debug!(
            unit = %ctx.unit(),
            endpoints = candidates.endpoint_classes.len(),
            annotated = candidates.annotated_classes.len(),
            configurators = configurators.len(),
            "endpoint candidates classified"
        );

        let registrations = merge_endpoint_configuration(&candidates, &configurators);
        let registered = registrations.deploy(container.as_ref())?;
        info!(
            unit = %ctx.unit(),
            context = ctx.context_path(),
            registered,
            "endpoints registered"
        );
        Ok(())
    }
}
