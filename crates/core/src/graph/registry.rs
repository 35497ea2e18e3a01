//! In-memory module runtime.
//!
//! Provides thread-safe storage for modules, fragment attachments, wiring
//! edges and module content. Readers take consistent snapshots through
//! [`SnapshotProvider`].

use super::snapshot::{GraphSnapshot, SnapshotProvider};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use url::Url;
use wabscope_api::{
    ClassInfo, LookupError, LookupResult, ModuleId, ModuleInfo, ModuleKind, ModuleResources,
    ResourceEntry, WiringEdge, WiringGraph,
};

#[derive(Debug, Clone)]
struct StoredEntry {
    path: String,
    url: Url,
}

#[derive(Default)]
struct RegistryState {
    /// Install order
    modules: IndexMap<ModuleId, ModuleInfo>,
    /// (host, fragment) in attachment order
    attachments: Vec<(ModuleId, ModuleId)>,
    edges: Vec<WiringEdge>,
    entries: HashMap<ModuleId, Vec<StoredEntry>>,
    classes: HashMap<ModuleId, HashMap<String, ClassInfo>>,
    contents: HashMap<Url, String>,
    broken: HashSet<ModuleId>,
}

impl RegistryState {
    fn fragment_ids(&self, host: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.attachments
            .iter()
            .filter(move |(h, _)| *h == host)
            .map(|(_, f)| *f)
    }

    /// The module itself followed by its attached fragments.
    fn content_owners(&self, module: ModuleId) -> Vec<ModuleId> {
        let mut owners = vec![module];
        owners.extend(self.fragment_ids(module));
        owners
    }
}

/// Thread-safe in-memory module runtime
#[derive(Default)]
pub struct InMemoryModuleRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Install (or replace) a module.
    pub fn install(&self, module: ModuleInfo) {
        let mut state = self.write();
        state.modules.insert(module.id, module);
    }

    /// Remove a module together with its attachments, wiring and content.
    pub fn uninstall(&self, id: ModuleId) -> Option<ModuleInfo> {
        let mut state = self.write();
        let removed = state.modules.shift_remove(&id)?;

        let detached: Vec<ModuleId> = state.fragment_ids(id).collect();
        for fragment in detached {
            if let Some(info) = state.modules.get_mut(&fragment) {
                info.host = None;
            }
        }
        state.attachments.retain(|(h, f)| *h != id && *f != id);
        state
            .edges
            .retain(|e| e.consumer != id && e.provider != id && e.via_fragment != Some(id));
        if let Some(entries) = state.entries.remove(&id) {
            for entry in entries {
                state.contents.remove(&entry.url);
            }
        }
        state.classes.remove(&id);
        state.broken.remove(&id);
        Some(removed)
    }

    /// Attach an installed fragment to an installed host.
    ///
    /// Returns `false` when either module is missing, `host` is not a host,
    /// or `fragment` is not a fragment.
    pub fn attach_fragment(&self, host: ModuleId, fragment: ModuleId) -> bool {
        let mut state = self.write();
        let host_ok = state
            .modules
            .get(&host)
            .is_some_and(|m| m.kind == ModuleKind::Host);
        let fragment_ok = state
            .modules
            .get(&fragment)
            .is_some_and(|m| m.kind == ModuleKind::Fragment);
        if !host_ok || !fragment_ok {
            return false;
        }
        // A fragment has exactly one host
        state.attachments.retain(|(_, f)| *f != fragment);
        state.attachments.push((host, fragment));
        if let Some(info) = state.modules.get_mut(&fragment) {
            info.host = Some(host);
        }
        true
    }

    pub fn wire(&self, edge: WiringEdge) {
        let mut state = self.write();
        if !state.edges.contains(&edge) {
            state.edges.push(edge);
        }
    }

    /// Add a content entry to `module` and return its URL.
    pub fn add_entry(
        &self,
        module: ModuleId,
        path: &str,
        content: impl Into<String>,
    ) -> LookupResult<Url> {
        let path = path.trim_start_matches('/').to_string();
        let url = entry_url(module, &path)?;
        let mut state = self.write();
        if !state.modules.contains_key(&module) {
            return Err(LookupError::NoSuchModule(module));
        }
        let entries = state.entries.entry(module).or_default();
        entries.retain(|e| e.path != path);
        entries.push(StoredEntry {
            path,
            url: url.clone(),
        });
        state.contents.insert(url.clone(), content.into());
        Ok(url)
    }

    /// Add a compiled class to `module` under `root` (e.g. `WEB-INF/classes/`).
    pub fn add_class(&self, module: ModuleId, root: &str, class: ClassInfo) -> LookupResult<Url> {
        let root = normalize_dir(root);
        let path = format!("{}{}.class", root, class.name.replace('.', "/"));
        let url = self.add_entry(module, &path, String::new())?;
        let mut state = self.write();
        state
            .classes
            .entry(module)
            .or_default()
            .insert(class.name.clone(), class);
        Ok(url)
    }

    /// Make every resource lookup against `module` fail.
    pub fn mark_broken(&self, module: ModuleId) {
        self.write().broken.insert(module);
    }

    fn lookup(
        &self,
        module: ModuleId,
        path: &str,
        pattern: &str,
        recursive: bool,
    ) -> LookupResult<Vec<ResourceEntry>> {
        let matcher = glob_to_regex(pattern)?;
        let dir = normalize_dir(path);
        let state = self.read();

        if !state.modules.contains_key(&module) {
            return Err(LookupError::NoSuchModule(module));
        }
        if state.broken.contains(&module) {
            return Err(LookupError::Io(format!("module {} cannot be read", module)));
        }

        let mut found = Vec::new();
        for owner in state.content_owners(module) {
            let Some(entries) = state.entries.get(&owner) else {
                continue;
            };
            for entry in entries {
                let Some(rest) = entry.path.strip_prefix(&dir) else {
                    continue;
                };
                if rest.is_empty() || (!recursive && rest.contains('/')) {
                    continue;
                }
                let name = rest.rsplit('/').next().unwrap_or(rest);
                if matcher.is_match(name) {
                    found.push(ResourceEntry::new(owner, entry.path.clone(), entry.url.clone()));
                }
            }
        }
        Ok(found)
    }
}

impl SnapshotProvider for InMemoryModuleRegistry {
    fn snapshot(&self) -> GraphSnapshot {
        let state = self.read();
        GraphSnapshot::new(
            state.modules.values().cloned(),
            state.attachments.iter().copied(),
            state.edges.iter().cloned(),
        )
    }
}

impl WiringGraph for InMemoryModuleRegistry {
    fn module_by_id(&self, id: ModuleId) -> Option<ModuleInfo> {
        self.read().modules.get(&id).cloned()
    }

    fn fragments_of(&self, host: ModuleId) -> Vec<ModuleInfo> {
        let state = self.read();
        state
            .fragment_ids(host)
            .filter_map(|f| state.modules.get(&f).cloned())
            .collect()
    }

    fn wired_modules_of(&self, module: ModuleId) -> Vec<(ModuleInfo, WiringEdge)> {
        let state = self.read();
        state
            .edges
            .iter()
            .filter(|e| e.consumer == module)
            .filter_map(|e| {
                state
                    .modules
                    .get(&e.provider)
                    .map(|m| (m.clone(), e.clone()))
            })
            .collect()
    }
}

impl ModuleResources for InMemoryModuleRegistry {
    fn find_entries(
        &self,
        module: ModuleId,
        path: &str,
        pattern: &str,
        recursive: bool,
    ) -> LookupResult<Vec<ResourceEntry>> {
        self.lookup(module, path, pattern, recursive)
    }

    fn wiring_find_entries(
        &self,
        module: ModuleId,
        path: &str,
        pattern: &str,
        recursive: bool,
    ) -> LookupResult<Vec<ResourceEntry>> {
        self.lookup(module, path, pattern, recursive)
    }

    fn load_class(&self, module: ModuleId, name: &str) -> LookupResult<ClassInfo> {
        let state = self.read();
        if !state.modules.contains_key(&module) {
            return Err(LookupError::NoSuchModule(module));
        }
        state
            .content_owners(module)
            .into_iter()
            .find_map(|owner| state.classes.get(&owner).and_then(|c| c.get(name)).cloned())
            .ok_or_else(|| LookupError::ClassNotFound {
                module,
                name: name.to_string(),
            })
    }

    fn read_entry(&self, url: &Url) -> LookupResult<String> {
        self.read()
            .contents
            .get(url)
            .cloned()
            .ok_or_else(|| LookupError::Io(format!("no content at {}", url)))
    }
}

/// `bundle://<id>.0:0/<path>`
fn entry_url(module: ModuleId, path: &str) -> LookupResult<Url> {
    Url::parse(&format!("bundle://{}.0:0/{}", module, path))
        .map_err(|e| LookupError::Io(format!("invalid entry path {}: {}", path, e)))
}

/// `""`, `"/"` -> `""`; `"/META-INF"` -> `"META-INF/"`
fn normalize_dir(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

fn glob_to_regex(pattern: &str) -> LookupResult<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    Regex::new(&format!("^{}$", escaped))
        .map_err(|e| LookupError::Io(format!("invalid pattern {}: {}", pattern, e)))
}
