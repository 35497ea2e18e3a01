use super::contribution::Contributions;
use crate::resolver::ClassSpace;
use indexmap::IndexMap;
use tracing::warn;
use url::Url;
use wabscope_api::{ModuleId, ModuleResources};

/// One provider class named in a provider file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDeclaration {
    pub class_name: String,
    /// Module whose provider file declared the class.
    pub module: ModuleId,
    /// Host whose classloader loads the class.
    pub loader: ModuleId,
    pub source: Url,
}

/// Parse a service-loader provider file: one class per line, `#` comments.
pub fn parse_provider_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let valid = !line.contains(char::is_whitespace);
            if !valid {
                warn!("ignoring malformed provider line: {:?}", line);
            }
            valid
        })
        .map(str::to_string)
        .collect()
}

/// Read every collected provider file and list the declared classes in
/// module order, then declaration order. A class declared twice is kept once.
pub fn read_provider_declarations(
    resources: &dyn ModuleResources,
    space: &ClassSpace,
    contributions: &Contributions,
) -> Vec<ProviderDeclaration> {
    let mut declarations: IndexMap<String, ProviderDeclaration> = IndexMap::new();

    for (module, url) in contributions.provider_files() {
        let content = match resources.read_entry(&url) {
            Ok(content) => content,
            Err(e) => {
                warn!(module = %module, "cannot read provider file {}: {}", url, e);
                continue;
            }
        };
        let loader = space.lookup_host(module).unwrap_or(module);
        for class_name in parse_provider_file(&content) {
            declarations
                .entry(class_name.clone())
                .or_insert_with(|| ProviderDeclaration {
                    class_name,
                    module,
                    loader,
                    source: url.clone(),
                });
        }
    }

    declarations.into_values().collect()
}
