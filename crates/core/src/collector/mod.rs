//! Resource, descriptor and class collection over a resolved class space.
//!
//! Content of a fragment is never queried on the fragment itself: the unit's
//! fragments are reached through the unit, a wired module's fragments through
//! that module. Results are attributed back to the owning module.

pub mod classes;
pub mod contribution;
pub mod providers;

pub use contribution::{Contributions, ModuleContribution};
pub use providers::{ProviderDeclaration, parse_provider_file};

use crate::config::DeploymentConfig;
use crate::error::{DeployError, Result};
use crate::resolver::{ClassSpace, LookupGroup};
use indexmap::IndexMap;
use tracing::{debug, warn};
use wabscope_api::{LookupError, LookupResult, ModuleId, ModuleResources, ResourceEntry};

pub struct ResourceCollector<'a> {
    resources: &'a dyn ModuleResources,
    config: &'a DeploymentConfig,
}

impl<'a> ResourceCollector<'a> {
    pub fn new(resources: &'a dyn ModuleResources, config: &'a DeploymentConfig) -> Self {
        Self { resources, config }
    }

    /// Collect fragment descriptors and provider files for `provider_contract`.
    ///
    /// Fails with [`DeployError::NotFound`] if the web unit disappeared from
    /// the runtime after its class space was resolved.
    pub fn collect_descriptors_and_providers(
        &self,
        space: &ClassSpace,
        provider_contract: &str,
    ) -> Result<Contributions> {
        let mut modules: IndexMap<ModuleId, ModuleContribution> = space
            .ids()
            .into_iter()
            .map(|id| (id, ModuleContribution::new(id)))
            .collect();

        for group in space.groups() {
            for entry in self.descriptor_entries(&group)? {
                let owner = attribute(&group, &entry);
                if let Some(contribution) = modules.get_mut(&owner) {
                    contribution.add_descriptor(entry.url);
                }
            }
            for entry in self.provider_entries(&group, provider_contract)? {
                let owner = attribute(&group, &entry);
                if let Some(contribution) = modules.get_mut(&owner) {
                    contribution.add_provider_file(entry.url);
                }
            }
        }

        let contributions = Contributions::new(modules.into_values().collect());
        debug!(
            unit = %space.unit(),
            descriptors = contributions.descriptors().len(),
            provider_files = contributions.provider_files().len(),
            "collected descriptors and provider files"
        );
        Ok(contributions)
    }

    fn descriptor_entries(&self, group: &LookupGroup) -> Result<Vec<ResourceEntry>> {
        let name = &self.config.descriptor_name;
        if group.is_unit {
            let mut entries = self.query(group, "descriptor", || {
                self.resources
                    .find_entries(group.host, &self.config.unit_descriptor_dir, name, false)
            })?;
            entries.extend(self.query(group, "descriptor", || {
                self.resources.find_entries(
                    group.host,
                    &self.config.fragment_descriptor_dir,
                    name,
                    false,
                )
            })?);
            Ok(entries)
        } else {
            self.query(group, "descriptor", || {
                self.resources.wiring_find_entries(
                    group.host,
                    &self.config.wired_descriptor_dir,
                    name,
                    false,
                )
            })
        }
    }

    fn provider_entries(
        &self,
        group: &LookupGroup,
        contract: &str,
    ) -> Result<Vec<ResourceEntry>> {
        let mut entries = Vec::new();
        if group.is_unit {
            entries.extend(self.query(group, "provider", || {
                self.resources
                    .find_entries(group.host, &self.config.unit_services_dir, contract, false)
            })?);
        }
        entries.extend(self.query(group, "provider", || {
            self.resources
                .find_entries(group.host, &self.config.services_dir, contract, false)
        })?);
        Ok(entries)
    }

    /// Run one lookup against `group`. A failing wired module contributes
    /// nothing; a web unit that is no longer installed aborts the pass.
    fn query(
        &self,
        group: &LookupGroup,
        what: &str,
        lookup: impl FnOnce() -> LookupResult<Vec<ResourceEntry>>,
    ) -> Result<Vec<ResourceEntry>> {
        match lookup() {
            Ok(entries) => Ok(entries),
            Err(e) => {
                check_unit_present(group, &e)?;
                warn!(module = %group.host, "{} lookup failed, skipping: {}", what, e);
                Ok(Vec::new())
            }
        }
    }
}

/// A vanished web unit is fatal; any other lookup failure is not.
fn check_unit_present(group: &LookupGroup, error: &LookupError) -> Result<()> {
    match error {
        LookupError::NoSuchModule(_) if group.is_unit => {
            warn!(unit = %group.host, "web unit uninstalled during deployment");
            Err(DeployError::NotFound(group.host))
        }
        _ => Ok(()),
    }
}

/// Owner of `entry` within `group`, falling back to the queried host.
fn attribute(group: &LookupGroup, entry: &ResourceEntry) -> ModuleId {
    if group.members.contains(&entry.module) {
        entry.module
    } else {
        group.host
    }
}
