//! Deployment driver for web units.
//!
//! One pass per unit: snapshot → resolve → collect → scan → initialize.
//! Passes for the same unit (deploy or undeploy) are serialized; distinct
//! units run concurrently.

use crate::collector::{Contributions, ResourceCollector};
use crate::config::DeploymentConfig;
use crate::discovery::{DiscoveryReport, InitializerDiscovery};
use crate::error::{DeployError, Result};
use crate::graph::SnapshotProvider;
use crate::resolver::{ClassSpace, ClassSpaceResolver};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use wabscope_api::{
    DescriptorParser, ModuleId, ModuleResources, ServerContext, WebFragmentDescriptor,
};
use wabscope_plugin::ProviderRegistry;

/// Outcome of a successful deployment pass.
#[derive(Debug, Clone)]
pub struct DeploymentRecord {
    pub unit: ModuleId,
    pub class_space: ClassSpace,
    pub contributions: Contributions,
    /// Parsed fragment descriptors; empty when no parser is configured.
    pub descriptors: Vec<WebFragmentDescriptor>,
    /// Number of classes found in the class space.
    pub classes: usize,
    pub report: DiscoveryReport,
}

type UnitSlot = Arc<Mutex<Option<Arc<DeploymentRecord>>>>;

pub struct Deployer {
    graph: Arc<dyn SnapshotProvider>,
    resources: Arc<dyn ModuleResources>,
    registry: Arc<ProviderRegistry>,
    parser: Option<Arc<dyn DescriptorParser>>,
    config: DeploymentConfig,
    units: DashMap<ModuleId, UnitSlot>,
}

pub struct DeployerBuilder {
    graph: Arc<dyn SnapshotProvider>,
    resources: Arc<dyn ModuleResources>,
    registry: ProviderRegistry,
    parser: Option<Arc<dyn DescriptorParser>>,
    config: DeploymentConfig,
}

impl DeployerBuilder {
    pub fn new(graph: Arc<dyn SnapshotProvider>, resources: Arc<dyn ModuleResources>) -> Self {
        Self {
            graph,
            resources,
            registry: ProviderRegistry::new(),
            parser: None,
            config: DeploymentConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_descriptor_parser(mut self, parser: Arc<dyn DescriptorParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_config(mut self, config: DeploymentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Deployer {
        Deployer {
            graph: self.graph,
            resources: self.resources,
            registry: Arc::new(self.registry),
            parser: self.parser,
            config: self.config,
            units: DashMap::new(),
        }
    }
}

impl Deployer {
    pub fn builder(
        graph: Arc<dyn SnapshotProvider>,
        resources: Arc<dyn ModuleResources>,
    ) -> DeployerBuilder {
        DeployerBuilder::new(graph, resources)
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolve the class space of `unit` against a fresh snapshot.
    pub fn resolve_class_space(&self, unit: ModuleId) -> Result<ClassSpace> {
        let snapshot = self.graph.snapshot();
        ClassSpaceResolver::new(&snapshot).resolve(unit)
    }

    pub fn collect_descriptors_and_providers(
        &self,
        space: &ClassSpace,
        provider_contract: &str,
    ) -> Result<Contributions> {
        ResourceCollector::new(self.resources.as_ref(), &self.config)
            .collect_descriptors_and_providers(space, provider_contract)
    }

    /// Deploy (or redeploy) `unit` into `ctx`.
    ///
    /// On failure the unit is left undeployed; side effects of initializers
    /// that already ran are not undone.
    pub fn deploy(&self, unit: ModuleId, ctx: &dyn ServerContext) -> Result<Arc<DeploymentRecord>> {
        loop {
            let slot = self.slot(unit);
            let mut guard = lock(&slot);
            // An undeploy may have retired this slot while we waited.
            if !self.is_current(unit, &slot) {
                continue;
            }
            *guard = None;
            return match self.run_pass(unit, ctx) {
                Ok(record) => {
                    *guard = Some(record.clone());
                    Ok(record)
                }
                Err(e) => {
                    self.retire(unit, &slot);
                    Err(e)
                }
            };
        }
    }

    fn run_pass(&self, unit: ModuleId, ctx: &dyn ServerContext) -> Result<Arc<DeploymentRecord>> {
        info!(unit = %unit, context = ctx.context_path(), "deploying web unit");

        let space = self.resolve_class_space(unit)?;
        let collector = ResourceCollector::new(self.resources.as_ref(), &self.config);
        let contributions =
            collector.collect_descriptors_and_providers(&space, &self.config.initializer_contract)?;
        let descriptors = self.parse_descriptors(&contributions)?;
        let classes = collector.collect_classes(&space)?;

        // Nothing may be registered for a unit that is gone.
        if !self.graph.snapshot().contains(unit) {
            return Err(DeployError::NotFound(unit));
        }

        let report = InitializerDiscovery::new(self.resources.as_ref(), &self.registry).run(
            &space,
            &contributions,
            &classes,
            ctx,
        )?;

        let record = Arc::new(DeploymentRecord {
            unit,
            class_space: space,
            contributions,
            descriptors,
            classes: classes.len(),
            report,
        });
        info!(
            unit = %unit,
            modules = record.class_space.len(),
            initializers = record.report.invoked.len(),
            "web unit deployed"
        );
        Ok(record)
    }

    /// Remove the deployment of `unit`. Returns `None` if it was not deployed.
    pub fn undeploy(&self, unit: ModuleId) -> Result<Option<Arc<DeploymentRecord>>> {
        let Some(slot) = self.units.get(&unit).map(|s| s.value().clone()) else {
            return Ok(None);
        };
        let mut guard = lock(&slot);
        let record = guard.take();
        self.retire(unit, &slot);
        if record.is_some() {
            info!(unit = %unit, "web unit undeployed");
        }
        Ok(record)
    }

    pub fn deployment(&self, unit: ModuleId) -> Option<Arc<DeploymentRecord>> {
        let slot = self.units.get(&unit).map(|s| s.value().clone())?;
        let guard = lock(&slot);
        guard.clone()
    }

    pub fn is_deployed(&self, unit: ModuleId) -> bool {
        self.deployment(unit).is_some()
    }

    fn slot(&self, unit: ModuleId) -> UnitSlot {
        // Clone out so the map shard is not held while the unit lock is.
        self.units.entry(unit).or_default().value().clone()
    }

    fn is_current(&self, unit: ModuleId, slot: &UnitSlot) -> bool {
        self.units
            .get(&unit)
            .is_some_and(|current| Arc::ptr_eq(current.value(), slot))
    }

    /// Drop the map entry for `unit`. Called with the unit lock held.
    fn retire(&self, unit: ModuleId, slot: &UnitSlot) {
        self.units.remove_if(&unit, |_, current| Arc::ptr_eq(current, slot));
    }

    fn parse_descriptors(
        &self,
        contributions: &Contributions,
    ) -> Result<Vec<WebFragmentDescriptor>> {
        let Some(parser) = &self.parser else {
            return Ok(Vec::new());
        };
        contributions
            .descriptors()
            .iter()
            .map(|url| {
                debug!("parsing descriptor {}", url);
                parser.parse(url).map_err(|source| DeployError::Descriptor {
                    url: url.to_string(),
                    source,
                })
            })
            .collect()
    }
}

fn lock(slot: &UnitSlot) -> MutexGuard<'_, Option<Arc<DeploymentRecord>>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
