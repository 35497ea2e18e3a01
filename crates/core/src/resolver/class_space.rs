use crate::error::{DeployError, Result};
use indexmap::IndexMap;
use tracing::debug;
use wabscope_api::{ContentRoot, ModuleId, ModuleInfo, WiringGraph, WiringKind};

/// Why a module is part of a class space. Drives how its content is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The web unit itself.
    Unit,
    /// Fragment attached to the web unit.
    UnitFragment,
    /// Module wired (one hop) from the unit or one of its fragments.
    Wired(WiringKind),
    /// Fragment attached to a wired module.
    WiredFragment { host: ModuleId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpaceEntry {
    pub module: ModuleInfo,
    pub origin: Origin,
    /// Classpath roots as reported by the wiring graph.
    pub content_roots: Vec<ContentRoot>,
}

/// Modules visible to one web unit, unique by id, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpace {
    unit: ModuleId,
    entries: IndexMap<ModuleId, ClassSpaceEntry>,
}

/// A host plus the class-space fragments whose content is reached through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupGroup {
    pub host: ModuleId,
    /// `true` for the web unit's own group.
    pub is_unit: bool,
    /// Host first, then its fragments in class-space order.
    pub members: Vec<ModuleId>,
}

impl ClassSpace {
    fn new(unit: ModuleInfo, content_roots: Vec<ContentRoot>) -> Self {
        let id = unit.id;
        let mut entries = IndexMap::new();
        entries.insert(
            id,
            ClassSpaceEntry {
                module: unit,
                origin: Origin::Unit,
                content_roots,
            },
        );
        Self { unit: id, entries }
    }

    /// Returns `false` if the module was already present.
    fn push(&mut self, module: ModuleInfo, origin: Origin, graph: &dyn WiringGraph) -> bool {
        if self.entries.contains_key(&module.id) {
            return false;
        }
        let content_roots = graph.content_entries(module.id);
        self.entries.insert(
            module.id,
            ClassSpaceEntry {
                module,
                origin,
                content_roots,
            },
        );
        true
    }

    pub fn unit(&self) -> ModuleId {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: ModuleId) -> Option<&ClassSpaceEntry> {
        self.entries.get(&id)
    }

    pub fn ids(&self) -> Vec<ModuleId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassSpaceEntry> {
        self.entries.values()
    }

    /// Host through which the content of `id` is queried.
    pub fn lookup_host(&self, id: ModuleId) -> Option<ModuleId> {
        self.entries.get(&id).map(|entry| match entry.origin {
            Origin::Unit | Origin::UnitFragment => self.unit,
            Origin::Wired(_) => id,
            Origin::WiredFragment { host } => host,
        })
    }

    /// Lookup groups in the order their hosts appear in the class space.
    pub fn groups(&self) -> Vec<LookupGroup> {
        let mut groups: IndexMap<ModuleId, LookupGroup> = IndexMap::new();
        for id in self.entries.keys() {
            let Some(host) = self.lookup_host(*id) else {
                continue;
            };
            groups
                .entry(host)
                .or_insert_with(|| LookupGroup {
                    host,
                    is_unit: host == self.unit,
                    members: Vec::new(),
                })
                .members
                .push(*id);
        }
        groups.into_values().collect()
    }
}

/// Computes the class space of a web unit over a read-only wiring graph.
pub struct ClassSpaceResolver<'a> {
    graph: &'a dyn WiringGraph,
}

impl<'a> ClassSpaceResolver<'a> {
    pub fn new(graph: &'a dyn WiringGraph) -> Self {
        Self { graph }
    }

    /// Resolve the class space of `unit`.
    ///
    /// Order: the unit, its fragments (attachment order), modules wired from
    /// the unit or its fragments (enumeration order), then the fragments of
    /// each wired module. Wiring is followed one hop only.
    pub fn resolve(&self, unit: ModuleId) -> Result<ClassSpace> {
        let unit_info = self
            .graph
            .module_by_id(unit)
            .ok_or(DeployError::NotFound(unit))?;
        if unit_info.is_fragment() {
            return Err(DeployError::NotAHost(unit));
        }

        let mut space = ClassSpace::new(unit_info, self.graph.content_entries(unit));

        let unit_fragments = self.graph.fragments_of(unit);
        let mut consumers = vec![unit];
        for fragment in unit_fragments {
            consumers.push(fragment.id);
            space.push(fragment, Origin::UnitFragment, self.graph);
        }

        // Edges declared by the unit's fragments count as the unit's own.
        let mut wired = Vec::new();
        for consumer in consumers {
            for (provider, edge) in self.graph.wired_modules_of(consumer) {
                let Some(provider) = self.provider_host(provider) else {
                    continue;
                };
                if provider.id == unit {
                    continue;
                }
                let id = provider.id;
                if space.push(provider, Origin::Wired(edge.kind), self.graph) {
                    debug!(unit = %unit, module = %id, kind = %edge.kind, "wired module visible");
                    wired.push(id);
                }
            }
        }

        for host in wired {
            for fragment in self.graph.fragments_of(host) {
                space.push(fragment, Origin::WiredFragment { host }, self.graph);
            }
        }

        debug!(unit = %unit, modules = space.len(), "class space resolved");
        Ok(space)
    }

    /// Wiring to a fragment resolves to the fragment's host.
    fn provider_host(&self, provider: ModuleInfo) -> Option<ModuleInfo> {
        if !provider.is_fragment() {
            return Some(provider);
        }
        let host = provider.host?;
        self.graph.module_by_id(host)
    }
}
