use crate::cap::{Configurator, Initializer};
use crate::contract::InitializerContract;
use std::collections::HashMap;
use std::sync::Arc;

/// Error type for provider construction
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type InitializerFactory =
    Arc<dyn Fn() -> Result<Arc<dyn Initializer>, BoxError> + Send + Sync>;
pub type ConfiguratorFactory =
    Arc<dyn Fn() -> Result<Arc<dyn Configurator>, BoxError> + Send + Sync>;

/// An initializer implementation known to the engine.
#[derive(Clone)]
pub struct InitializerRegistration {
    pub class_name: String,
    pub contract: InitializerContract,
    factory: InitializerFactory,
}

impl InitializerRegistration {
    pub fn instantiate(&self) -> Result<Arc<dyn Initializer>, BoxError> {
        (self.factory)()
    }
}

/// Maps discovered provider class names to factories.
///
/// Provider files only name classes; this registry is the single place where
/// a name becomes an instance.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    initializers: HashMap<String, InitializerRegistration>,
    configurators: HashMap<String, ConfiguratorFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_initializer(
        &mut self,
        class_name: impl Into<String>,
        contract: InitializerContract,
        factory: InitializerFactory,
    ) -> &mut Self {
        let class_name = class_name.into();
        self.initializers.insert(
            class_name.clone(),
            InitializerRegistration {
                class_name,
                contract,
                factory,
            },
        );
        self
    }

    pub fn register_configurator(
        &mut self,
        class_name: impl Into<String>,
        factory: ConfiguratorFactory,
    ) -> &mut Self {
        self.configurators.insert(class_name.into(), factory);
        self
    }

    /// Register an initializer that is constructed once and shared.
    pub fn with_initializer(
        mut self,
        class_name: impl Into<String>,
        contract: InitializerContract,
        instance: Arc<dyn Initializer>,
    ) -> Self {
        self.register_initializer(class_name, contract, Arc::new(move || Ok(instance.clone())));
        self
    }

    pub fn with_configurator(
        mut self,
        class_name: impl Into<String>,
        instance: Arc<dyn Configurator>,
    ) -> Self {
        self.register_configurator(class_name, Arc::new(move || Ok(instance.clone())));
        self
    }

    pub fn initializer(&self, class_name: &str) -> Option<&InitializerRegistration> {
        self.initializers.get(class_name)
    }

    pub fn is_configurator(&self, class_name: &str) -> bool {
        self.configurators.contains_key(class_name)
    }

    /// `None` when no factory is registered under `class_name`.
    pub fn instantiate_configurator(
        &self,
        class_name: &str,
    ) -> Option<Result<Arc<dyn Configurator>, BoxError>> {
        self.configurators.get(class_name).map(|factory| factory())
    }

    pub fn initializer_count(&self) -> usize {
        self.initializers.len()
    }

    pub fn configurator_count(&self) -> usize {
        self.configurators.len()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut initializers: Vec<_> = self.initializers.keys().collect();
        initializers.sort();
        let mut configurators: Vec<_> = self.configurators.keys().collect();
        configurators.sort();
        f.debug_struct("ProviderRegistry")
            .field("initializers", &initializers)
            .field("configurators", &configurators)
            .finish()
    }
}
