use indexmap::IndexSet;
use std::sync::Arc;
use tracing::debug;
use wabscope_api::{ClassSet, EndpointConfig, EndpointContainer, RegistrationError};
use wabscope_plugin::Configurator;

/// Endpoint classes found in a unit's class space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointCandidates {
    /// Classes implementing the endpoint type; need a configurator to deploy.
    pub endpoint_classes: ClassSet,
    /// Classes carrying the endpoint annotation; self-describing.
    pub annotated_classes: ClassSet,
}

/// What ends up registered with the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalRegistrationSet {
    configs: IndexSet<EndpointConfig>,
    classes: ClassSet,
}

impl FinalRegistrationSet {
    pub fn configs(&self) -> impl Iterator<Item = &EndpointConfig> {
        self.configs.iter()
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.configs.len() + self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty() && self.classes.is_empty()
    }

    /// Register configured endpoints, then annotated classes. Stops at the
    /// first rejected registration.
    pub fn deploy(&self, container: &dyn EndpointContainer) -> Result<usize, RegistrationError> {
        let mut registered = 0;
        for config in &self.configs {
            container.register_endpoint(config)?;
            registered += 1;
        }
        for class in self.classes.iter() {
            container.register_endpoint_class(class)?;
            registered += 1;
        }
        Ok(registered)
    }
}

/// Without configurators every annotated class is deployed as is and
/// implementing classes are not deployed at all.
pub fn auto_deploy_when_no_configurator(candidates: &EndpointCandidates) -> FinalRegistrationSet {
    FinalRegistrationSet {
        configs: IndexSet::new(),
        classes: candidates.annotated_classes.clone(),
    }
}

/// With configurators only what some configurator produced or claimed is
/// deployed; everything else is dropped.
pub fn drop_unclaimed_when_configurator_present(
    candidates: &EndpointCandidates,
    configurators: &[Arc<dyn Configurator>],
) -> FinalRegistrationSet {
    let mut set = FinalRegistrationSet::default();
    for configurator in configurators {
        if let Some(configs) = configurator.endpoint_configs(&candidates.endpoint_classes) {
            set.configs.extend(configs);
        }
        let claimed = configurator.annotated_endpoint_classes(&candidates.annotated_classes);
        if let Some(claimed) = claimed {
            set.classes.extend_from(&claimed);
        }
    }
    set
}

pub fn merge_endpoint_configuration(
    candidates: &EndpointCandidates,
    configurators: &[Arc<dyn Configurator>],
) -> FinalRegistrationSet {
    let set = if configurators.is_empty() {
        auto_deploy_when_no_configurator(candidates)
    } else {
        drop_unclaimed_when_configurator_present(candidates, configurators)
    };
    debug!(
        configurators = configurators.len(),
        configs = set.configs.len(),
        classes = set.classes.len(),
        "endpoint configuration merged"
    );
    set
}
