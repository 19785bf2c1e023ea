use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeStatus {
    /// Requested, text not computed yet. References seen now count as satisfied.
    Pending,
    Rendered,
    /// Not found in the project; emitted as written, never given a file.
    External,
}

#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub name: String,
    pub status: TypeStatus,
    /// Declaration text, `export ...` through the closing brace or semicolon.
    pub text: String,
    /// Named types the declaration itself references.
    pub references: IndexSet<String>,
    /// Module the declaration was found in.
    pub origin: Option<PathBuf>,
    failures: u32,
}

/// Arena of named types, in first-reference order.
#[derive(Debug, Default)]
pub struct TypeTable {
    entries: IndexMap<String, TypeDefinition>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.entries.get(name)
    }

    pub fn status(&self, name: &str) -> Option<TypeStatus> {
        self.entries.get(name).map(|d| d.status)
    }

    pub fn is_rendered(&self, name: &str) -> bool {
        self.status(name) == Some(TypeStatus::Rendered)
    }

    /// Mark `name` Pending if it needs resolving now. Returns false when it is
    /// already Pending or Rendered. External entries are retried.
    pub fn begin(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(def) if def.status == TypeStatus::External => {
                def.status = TypeStatus::Pending;
                true
            }
            Some(_) => false,
            None => {
                self.entries.insert(
                    name.to_string(),
                    TypeDefinition {
                        name: name.to_string(),
                        status: TypeStatus::Pending,
                        text: String::new(),
                        references: IndexSet::new(),
                        origin: None,
                        failures: 0,
                    },
                );
                true
            }
        }
    }

    pub fn finish(&mut self, name: &str, text: String, references: IndexSet<String>, origin: PathBuf) {
        if let Some(def) = self.entries.get_mut(name) {
            def.status = TypeStatus::Rendered;
            def.text = text;
            def.references = references;
            def.origin = Some(origin);
        }
    }

    /// Returns true the first time `name` fails to resolve.
    pub fn mark_external(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(def) => {
                def.status = TypeStatus::External;
                def.text = name.to_string();
                def.failures += 1;
                def.failures == 1
            }
            None => false,
        }
    }

    pub fn rendered(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.entries.values().filter(|d| d.status == TypeStatus::Rendered)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
