use super::module::ModuleId;
use url::Url;

/// One entry returned by a module resource lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceEntry {
    /// Module whose content holds the entry. For lookups issued against a
    /// host this may be one of its attached fragments.
    pub module: ModuleId,
    /// Path of the entry inside the owning module, without leading `/`.
    pub path: String,
    pub url: Url,
}

impl ResourceEntry {
    pub fn new(module: ModuleId, path: impl Into<String>, url: Url) -> Self {
        Self {
            module,
            path: path.into(),
            url,
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}
