//! Read-only view over the module runtime.
//!
//! [`WiringGraph`] answers structural questions (modules, fragments, wiring)
//! and [`ModuleResources`] answers content questions (entries, classes).
//! Both are implemented by the module runtime; the engine never mutates them.

use crate::error::LookupResult;
use crate::models::{ClassInfo, ContentRoot, ModuleId, ModuleInfo, ResourceEntry, WiringEdge};
use url::Url;

pub trait WiringGraph: Send + Sync {
    fn module_by_id(&self, id: ModuleId) -> Option<ModuleInfo>;

    /// Fragments currently attached to `host`, in attachment order.
    fn fragments_of(&self, host: ModuleId) -> Vec<ModuleInfo>;

    /// Direct (one hop) wiring edges whose consumer is `module`, paired with
    /// the provider module. Order is the runtime's enumeration order.
    fn wired_modules_of(&self, module: ModuleId) -> Vec<(ModuleInfo, WiringEdge)>;

    fn content_entries(&self, module: ModuleId) -> Vec<ContentRoot> {
        self.module_by_id(module)
            .map(|m| m.content_roots)
            .unwrap_or_default()
    }
}

pub trait ModuleResources: Send + Sync {
    /// Direct named-path lookup. Issued against a host it also answers for
    /// every attached fragment (host entries first, then fragments in
    /// attachment order). `pattern` is a glob over the last path segment.
    fn find_entries(
        &self,
        module: ModuleId,
        path: &str,
        pattern: &str,
        recursive: bool,
    ) -> LookupResult<Vec<ResourceEntry>>;

    /// Bulk lookup through the module's wiring adapter. Covers the same
    /// content as [`ModuleResources::find_entries`].
    fn wiring_find_entries(
        &self,
        module: ModuleId,
        path: &str,
        pattern: &str,
        recursive: bool,
    ) -> LookupResult<Vec<ResourceEntry>>;

    /// Load a class through the classloader of `module` (a host).
    fn load_class(&self, module: ModuleId, name: &str) -> LookupResult<ClassInfo>;

    /// Read an entry as UTF-8 text.
    fn read_entry(&self, url: &Url) -> LookupResult<String>;
}
