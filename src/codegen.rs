//! Generators over the shared fact base: deployment descriptor, type files,
//! client service, barrel and module files.
pub mod barrel;
pub mod client;
pub mod descriptor;
pub mod types;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::FunctionDescriptor;
use crate::resolve::TypeTable;

pub use descriptor::{BuildDefaults, DescriptorDocument};

/// One generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub contents: String,
}

impl OutputFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self { name: name.into(), contents: contents.into() }
    }
}

static HUMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z][a-z])").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());

/// File stem for a type name: `GetItemResponse` → `get-item-response`.
pub fn slug(name: &str) -> String {
    let humped = HUMP.replace_all(name, "-${1}");
    let split = DIGITS.replace_all(&humped, "-${1}");
    split.strip_prefix('-').unwrap_or(&split).to_lowercase()
}

pub fn import_line(name: &str) -> String {
    format!("import {{ {name} }} from './{}';\n", slug(name))
}

/// Rendered types referenced by any descriptor, deduplicated, first-seen order.
pub fn referenced_types<'a>(functions: &'a [FunctionDescriptor], types: &TypeTable) -> IndexSet<&'a str> {
    functions
        .iter()
        .flat_map(|f| f.references.iter())
        .map(String::as_str)
        .filter(|name| types.is_rendered(name))
        .collect()
}
