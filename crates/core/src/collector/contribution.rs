use indexmap::IndexSet;
use url::Url;
use wabscope_api::ModuleId;

/// What a single class-space module contributes, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContribution {
    pub module: ModuleId,
    descriptors: IndexSet<Url>,
    provider_files: IndexSet<Url>,
}

impl ModuleContribution {
    pub fn new(module: ModuleId) -> Self {
        Self {
            module,
            descriptors: IndexSet::new(),
            provider_files: IndexSet::new(),
        }
    }

    pub(crate) fn add_descriptor(&mut self, url: Url) {
        self.descriptors.insert(url);
    }

    pub(crate) fn add_provider_file(&mut self, url: Url) {
        self.provider_files.insert(url);
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Url> {
        self.descriptors.iter()
    }

    pub fn provider_files(&self) -> impl Iterator<Item = &Url> {
        self.provider_files.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty() && self.provider_files.is_empty()
    }
}

/// Per-module contributions in class-space order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contributions {
    modules: Vec<ModuleContribution>,
}

impl Contributions {
    pub fn new(modules: Vec<ModuleContribution>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &[ModuleContribution] {
        &self.modules
    }

    pub fn for_module(&self, id: ModuleId) -> Option<&ModuleContribution> {
        self.modules.iter().find(|m| m.module == id)
    }

    /// All descriptor URLs, merged in module order and unique by URL.
    pub fn descriptors(&self) -> Vec<Url> {
        let merged: IndexSet<&Url> = self.modules.iter().flat_map(|m| m.descriptors()).collect();
        merged.into_iter().cloned().collect()
    }

    /// All provider-file URLs paired with the contributing module.
    pub fn provider_files(&self) -> Vec<(ModuleId, Url)> {
        let mut seen = IndexSet::new();
        let mut files = Vec::new();
        for module in &self.modules {
            for url in module.provider_files() {
                if seen.insert(url) {
                    files.push((module.module, url.clone()));
                }
            }
        }
        files
    }
}
