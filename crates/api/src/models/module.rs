use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric identity of an installed module.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ModuleId(pub u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ModuleId {
    fn from(id: u64) -> Self {
        ModuleId(id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Host,
    Fragment,
}

/// A classpath root inside a module.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "path", rename_all = "lowercase")]
pub enum ContentRoot {
    /// A directory inside the module, e.g. `WEB-INF/classes/` or `/`.
    Directory(String),
    /// An archive embedded in the module, e.g. `WEB-INF/lib/util.jar`.
    Archive(String),
}

impl ContentRoot {
    pub fn path(&self) -> &str {
        match self {
            ContentRoot::Directory(p) | ContentRoot::Archive(p) => p,
        }
    }
}

/// Metadata of one installed module as reported by the module runtime.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub id: ModuleId,
    pub symbolic_name: String,
    pub kind: ModuleKind,
    /// Host a fragment is attached to. Always `None` for hosts and for
    /// fragments that are not resolved yet.
    #[serde(default)]
    pub host: Option<ModuleId>,
    #[serde(default)]
    pub content_roots: Vec<ContentRoot>,
}

impl ModuleInfo {
    pub fn host(id: impl Into<ModuleId>, symbolic_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbolic_name: symbolic_name.into(),
            kind: ModuleKind::Host,
            host: None,
            content_roots: vec![ContentRoot::Directory("/".to_string())],
        }
    }

    pub fn fragment(id: impl Into<ModuleId>, symbolic_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbolic_name: symbolic_name.into(),
            kind: ModuleKind::Fragment,
            host: None,
            content_roots: vec![ContentRoot::Directory("/".to_string())],
        }
    }

    pub fn with_content_roots(mut self, roots: Vec<ContentRoot>) -> Self {
        self.content_roots = roots;
        self
    }

    pub fn is_fragment(&self) -> bool {
        self.kind == ModuleKind::Fragment
    }
}
