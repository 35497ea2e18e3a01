use crate::collector::providers::{ProviderDeclaration, read_provider_declarations};
use crate::collector::Contributions;
use crate::error::{DeployError, Result};
use crate::resolver::ClassSpace;
use tracing::{debug, info, warn};
use wabscope_api::{ClassSet, ModuleId, ModuleResources, ServerContext};
use wabscope_plugin::ProviderRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokedInitializer {
    pub class_name: String,
    pub contract: String,
    /// Module whose provider file declared the initializer.
    pub module: ModuleId,
    /// Number of classes handed to the initializer.
    pub classes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// In invocation order.
    pub invoked: Vec<InvokedInitializer>,
    /// Declared providers that were not invoked (unknown or not constructible).
    pub skipped: Vec<String>,
}

pub struct InitializerDiscovery<'a> {
    resources: &'a dyn ModuleResources,
    registry: &'a ProviderRegistry,
}

impl<'a> InitializerDiscovery<'a> {
    pub fn new(resources: &'a dyn ModuleResources, registry: &'a ProviderRegistry) -> Self {
        Self {
            resources,
            registry,
        }
    }

    /// Read the collected provider files and invoke every known initializer.
    pub fn run(
        &self,
        space: &ClassSpace,
        contributions: &Contributions,
        classes: &ClassSet,
        ctx: &dyn ServerContext,
    ) -> Result<DiscoveryReport> {
        let declarations = read_provider_declarations(self.resources, space, contributions);
        self.invoke(&declarations, classes, ctx)
    }

    /// Invoke initializers in declaration order.
    ///
    /// The first failing initializer aborts the run; initializers that already
    /// ran are not rolled back.
    pub fn invoke(
        &self,
        declarations: &[ProviderDeclaration],
        classes: &ClassSet,
        ctx: &dyn ServerContext,
    ) -> Result<DiscoveryReport> {
        let mut report = DiscoveryReport::default();

        for declaration in declarations {
            let Some(registration) = self.registry.initializer(&declaration.class_name) else {
                warn!(
                    module = %declaration.module,
                    "no initializer registered for {}, skipping",
                    declaration.class_name
                );
                report.skipped.push(declaration.class_name.clone());
                continue;
            };

            let initializer = match registration.instantiate() {
                Ok(initializer) => initializer,
                Err(e) => {
                    warn!(
                        module = %declaration.module,
                        "cannot instantiate initializer {}: {}",
                        declaration.class_name,
                        e
                    );
                    report.skipped.push(declaration.class_name.clone());
                    continue;
                }
            };

            let handled = registration.contract.filter(classes);
            debug!(
                unit = %ctx.unit(),
                initializer = %declaration.class_name,
                classes = handled.len(),
                "invoking initializer"
            );
            initializer
                .on_startup(&handled, ctx)
                .map_err(|source| DeployError::Initializer {
                    contract: registration.contract.name.clone(),
                    source,
                })?;

            report.invoked.push(InvokedInitializer {
                class_name: declaration.class_name.clone(),
                contract: registration.contract.name.clone(),
                module: declaration.module,
                classes: handled.len(),
            });
        }

        info!(
            unit = %ctx.unit(),
            invoked = report.invoked.len(),
            skipped = report.skipped.len(),
            "initializers complete"
        );
        Ok(report)
    }
}
