use std::path::Path;
use std::sync::Arc;
use wabscope_api::ModuleResources;
use wabscope_core::endpoint::{ENDPOINT_INITIALIZER, EndpointInitializer};
use wabscope_core::{Deployer, DeploymentConfig, SnapshotProvider};
use wabscope_plugin::ProviderRegistry;

/// Bootstraps a deployer with the built-in endpoint initializer registered.
///
/// `providers` carries the application's own initializers; `configurators`
/// resolves endpoint configurator classes found in deployed units. A
/// provider already registered under the endpoint initializer's name wins.
pub fn build_default_deployer(
    graph: Arc<dyn SnapshotProvider>,
    resources: Arc<dyn ModuleResources>,
    config: DeploymentConfig,
    providers: ProviderRegistry,
    configurators: ProviderRegistry,
) -> Deployer {
    let providers = if providers.initializer(ENDPOINT_INITIALIZER).is_some() {
        tracing::warn!("{} is overridden by the application", ENDPOINT_INITIALIZER);
        providers
    } else {
        providers.with_initializer(
            ENDPOINT_INITIALIZER,
            EndpointInitializer::contract(),
            Arc::new(EndpointInitializer::new(
                configurators,
                config.excluded_package_prefixes.clone(),
            )),
        )
    };

    Deployer::builder(graph, resources)
        .with_registry(providers)
        .with_config(config)
        .build()
}

/// Load the deployment configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> wabscope_core::Result<DeploymentConfig> {
    match path {
        Some(path) => DeploymentConfig::load(path),
        None => Ok(DeploymentConfig::default()),
    }
}

/// Initializes the logging system for a specific component.
/// This delegates to the core logging module; `None` if logging is already set up.
pub fn init_logging(component: &str, to_stderr: bool) -> Option<impl Drop> {
    wabscope_core::logging::init_logging(component, to_stderr)
}
