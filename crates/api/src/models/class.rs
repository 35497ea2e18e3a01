use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassModifiers {
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub interface: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ClassModifiers {
    fn default() -> Self {
        Self {
            public: true,
            is_abstract: false,
            interface: false,
        }
    }
}

/// Metadata of a loaded class.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Fully qualified binary name, e.g. `org.example.Echo`.
    pub name: String,
    #[serde(default)]
    pub modifiers: ClassModifiers,
    /// Every type this class is assignable to (superclasses and interfaces,
    /// transitively). The class itself is implied.
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Fully qualified names of annotations present on the class.
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: ClassModifiers::default(),
            supertypes: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn implementing(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: ClassModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_assignable_to(&self, type_name: &str) -> bool {
        self.name == type_name || self.supertypes.iter().any(|s| s == type_name)
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }

    /// Public, concrete and not an interface.
    pub fn is_instantiable(&self) -> bool {
        self.modifiers.public && !self.modifiers.is_abstract && !self.modifiers.interface
    }

    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map(|(p, _)| p).unwrap_or("")
    }
}

/// Insertion-ordered set of classes, unique by class name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    classes: IndexMap<String, ClassInfo>,
}

impl ClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a class; returns `false` when a class with the same name was
    /// already present (the first one is kept).
    pub fn insert(&mut self, class: ClassInfo) -> bool {
        if self.classes.contains_key(&class.name) {
            return false;
        }
        self.classes.insert(class.name.clone(), class);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Classes matching `predicate`, in the same order.
    pub fn filter(&self, mut predicate: impl FnMut(&ClassInfo) -> bool) -> ClassSet {
        self.iter().filter(|c| predicate(c)).cloned().collect()
    }

    /// Add every class of `other` that is not present yet.
    pub fn extend_from(&mut self, other: &ClassSet) {
        for class in other.iter() {
            self.insert(class.clone());
        }
    }
}

impl FromIterator<ClassInfo> for ClassSet {
    fn from_iter<T: IntoIterator<Item = ClassInfo>>(iter: T) -> Self {
        let mut set = ClassSet::new();
        for class in iter {
            set.insert(class);
        }
        set
    }
}

impl IntoIterator for ClassSet {
    type Item = ClassInfo;
    type IntoIter = indexmap::map::IntoValues<String, ClassInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.into_values()
    }
}
