use wabscope_api::{ClassInfo, ClassSet};

/// A type an initializer declares interest in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeMarker {
    /// Matches classes assignable to the named type.
    Supertype(String),
    /// Matches classes carrying the named annotation.
    Annotation(String),
}

impl TypeMarker {
    pub fn supertype(name: impl Into<String>) -> Self {
        TypeMarker::Supertype(name.into())
    }

    pub fn annotation(name: impl Into<String>) -> Self {
        TypeMarker::Annotation(name.into())
    }

    pub fn matches(&self, class: &ClassInfo) -> bool {
        match self {
            TypeMarker::Supertype(name) => class.is_assignable_to(name),
            TypeMarker::Annotation(name) => class.has_annotation(name),
        }
    }
}

/// The "handles types" declaration of an initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializerContract {
    pub name: String,
    pub handles_types: Vec<TypeMarker>,
}

impl InitializerContract {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handles_types: Vec::new(),
        }
    }

    pub fn handles(mut self, marker: TypeMarker) -> Self {
        self.handles_types.push(marker);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.handles_types.is_empty()
    }

    /// Class set handed to the initializer.
    ///
    /// Unrestricted contracts receive everything. Otherwise only instantiable
    /// classes matching at least one marker are kept.
    pub fn filter(&self, classes: &ClassSet) -> ClassSet {
        if self.is_unrestricted() {
            return classes.clone();
        }
        classes.filter(|class| {
            class.is_instantiable() && self.handles_types.iter().any(|m| m.matches(class))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wabscope_api::ClassModifiers;

    fn classes() -> ClassSet {
        [
            ClassInfo::new("app.Echo").implementing("ws.Endpoint"),
            ClassInfo::new("app.Chat").annotated("ws.ServerEndpoint"),
            ClassInfo::new("app.Base")
                .implementing("ws.Endpoint")
                .with_modifiers(ClassModifiers {
                    is_abstract: true,
                    ..Default::default()
                }),
            ClassInfo::new("app.Util"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_unrestricted_contract_passes_everything() {
        let contract = InitializerContract::new("any");
        assert_eq!(contract.filter(&classes()).len(), 4);
    }

    #[test]
    fn test_markers_filter_and_skip_abstract() {
        let contract = InitializerContract::new("ws")
            .handles(TypeMarker::supertype("ws.Endpoint"))
            .handles(TypeMarker::annotation("ws.ServerEndpoint"));

        let filtered = contract.filter(&classes());
        let names: Vec<_> = filtered.names().collect();
        assert_eq!(names, vec!["app.Echo", "app.Chat"]);
    }
}
