//! Class enumeration for annotation and type scanning.

use super::{ResourceCollector, check_unit_present};
use crate::error::Result;
use crate::resolver::{ClassSpace, LookupGroup};
use tracing::{debug, warn};
use wabscope_api::{ClassSet, ContentRoot, ResourceEntry};

impl ResourceCollector<'_> {
    /// Classes reachable through the class space, unique by name, in module
    /// order. Unloadable classes are skipped.
    pub fn collect_classes(&self, space: &ClassSpace) -> Result<ClassSet> {
        let mut classes = ClassSet::new();

        for group in space.groups() {
            let roots = self.class_roots(space, &group);
            for root in &roots {
                let entries = self.query(&group, "class", || {
                    if group.is_unit {
                        self.resources
                            .find_entries(group.host, root, &self.config.class_pattern, true)
                    } else {
                        self.resources.wiring_find_entries(
                            group.host,
                            root,
                            &self.config.class_pattern,
                            true,
                        )
                    }
                })?;
                for entry in entries {
                    let Some(name) = class_name(&entry, &roots) else {
                        continue;
                    };
                    if classes.contains(&name) {
                        continue;
                    }
                    match self.resources.load_class(group.host, &name) {
                        Ok(class) => {
                            classes.insert(class);
                        }
                        Err(e) => {
                            check_unit_present(&group, &e)?;
                            warn!(module = %group.host, "skipping class {}: {}", name, e);
                        }
                    }
                }
            }
        }

        debug!(unit = %space.unit(), classes = classes.len(), "class scan complete");
        Ok(classes)
    }

    fn class_roots(&self, space: &ClassSpace, group: &LookupGroup) -> Vec<String> {
        let declared: Vec<ContentRoot> = space
            .get(group.host)
            .map(|entry| entry.content_roots.clone())
            .unwrap_or_default();

        if group.is_unit {
            let mut roots = vec![self.config.unit_class_root.clone()];
            roots.extend(declared.iter().filter_map(|root| match root {
                ContentRoot::Archive(path) => Some(path.clone()),
                ContentRoot::Directory(_) => None,
            }));
            roots.push(self.config.fragment_class_root.clone());
            roots
        } else if declared.is_empty() {
            vec!["/".to_string()]
        } else {
            declared.iter().map(|root| root.path().to_string()).collect()
        }
    }
}

/// `WEB-INF/classes/a/b/C.class` under root `WEB-INF/classes/` -> `a.b.C`.
/// The longest matching root wins.
fn class_name(entry: &ResourceEntry, roots: &[String]) -> Option<String> {
    let path = entry.path.trim_start_matches('/');
    let relative = roots
        .iter()
        .map(|root| root.trim_matches('/'))
        .filter_map(|root| {
            if root.is_empty() {
                Some((0, path))
            } else {
                path.strip_prefix(root)
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(|rest| (root.len(), rest))
            }
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, rest)| rest)?;

    let stem = relative.strip_suffix(".class")?;
    let simple = stem.rsplit('/').next().unwrap_or(stem);
    if simple == "module-info" || simple == "package-info" || stem.is_empty() {
        return None;
    }
    Some(stem.replace('/', "."))
}
