use super::module::ModuleId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum WiringKind {
    /// Package-level dependency (`Import-Package`).
    PackageImport,
    /// Whole-module dependency (`Require-Bundle`).
    ModuleRequire,
}

impl fmt::Display for WiringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WiringKind::PackageImport => f.write_str("package-import"),
            WiringKind::ModuleRequire => f.write_str("module-require"),
        }
    }
}

/// A directed dependency from a consumer module to a provider module.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct WiringEdge {
    pub consumer: ModuleId,
    pub provider: ModuleId,
    pub kind: WiringKind,
    /// Fragment that declared the requirement on behalf of `consumer`.
    /// The edge still behaves as the consumer host's own edge.
    #[serde(default)]
    pub via_fragment: Option<ModuleId>,
    /// Package name for [`WiringKind::PackageImport`] edges.
    #[serde(default)]
    pub package: Option<String>,
}

impl WiringEdge {
    pub fn package(consumer: ModuleId, provider: ModuleId, package: impl Into<String>) -> Self {
        Self {
            consumer,
            provider,
            kind: WiringKind::PackageImport,
            via_fragment: None,
            package: Some(package.into()),
        }
    }

    pub fn require(consumer: ModuleId, provider: ModuleId) -> Self {
        Self {
            consumer,
            provider,
            kind: WiringKind::ModuleRequire,
            via_fragment: None,
            package: None,
        }
    }

    pub fn via(mut self, fragment: ModuleId) -> Self {
        self.via_fragment = Some(fragment);
        self
    }
}
