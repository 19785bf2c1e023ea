//! Deployment Descriptor Merger.
//!
//! Function entries are regenerated on every run; everything else in the
//! template is carried through untouched.
use std::mem;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::config::CompilerOptions;
use crate::error::{ConfigError, Error, Result};
use crate::ir::FunctionDescriptor;

const FUNCTION_TYPE: &str = "AWS::Serverless::Function";
const BUILD_METHOD: &str = "esbuild";
const DEFAULT_TARGET: &str = "es2020";

/// Build property defaults taken from the compiler configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildDefaults {
    pub target: Value,
    pub sourcemap: Value,
}

impl Default for BuildDefaults {
    fn default() -> Self {
        Self { target: Value::from(DEFAULT_TARGET), sourcemap: Value::Bool(false) }
    }
}

impl BuildDefaults {
    pub fn from_compiler_options(options: &CompilerOptions) -> Self {
        let fallback = Self::default();
        let convert = |value: Option<&serde_json::Value>, default: Value| {
            value.and_then(|v| serde_yaml::to_value(v).ok()).unwrap_or(default)
        };
        Self {
            target: convert(options.target.as_ref(), fallback.target),
            sourcemap: convert(options.source_map.as_ref(), fallback.sourcemap),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DescriptorDocument {
    pub path: PathBuf,
    pub root: Value,
}

impl DescriptorDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_str(path, &text)
    }

    pub fn from_str(path: &Path, text: &str) -> Result<Self> {
        let root = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(text).map_err(|source| Error::Descriptor { path: path.to_path_buf(), source })?
        };
        Ok(Self { path: path.to_path_buf(), root })
    }

    pub fn resources(&self) -> Option<&Mapping> {
        self.root.get("Resources").and_then(Value::as_mapping)
    }

    /// Replace every function entry with one entry per descriptor.
    /// `project_root` anchors the entry point paths.
    pub fn merge(
        &mut self,
        functions: &[FunctionDescriptor],
        project_root: &Path,
        defaults: &BuildDefaults,
    ) -> Result<()> {
        if self.root.is_null() {
            self.root = Value::Mapping(Mapping::new());
        }
        let path = self.path.clone();
        let Value::Mapping(root) = &mut self.root else {
            return Err(Error::DescriptorShape { path, message: "top level is not a mapping".to_string() });
        };

        let slot = root.entry(Value::from("Resources")).or_insert(Value::Null);
        let resources = match mem::replace(slot, Value::Null) {
            Value::Mapping(resources) => resources,
            other if !is_truthy(&other) => Mapping::new(),
            _ => {
                return Err(Error::DescriptorShape { path, message: "`Resources` is not a mapping".to_string() });
            }
        };

        let before = resources.len();
        let mut resources: Mapping = resources.into_iter().filter(|(_, entry)| !is_function(entry)).collect();
        debug!(removed = before - resources.len(), kept = resources.len(), "cleared function entries");

        for function in functions {
            let entry = function_entry(function, project_root, defaults);
            resources.insert(Value::from(function.name.as_str()), Value::Mapping(entry));
        }

        *slot = Value::Mapping(resources);
        Ok(())
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(|source| Error::Descriptor { path: self.path.clone(), source })
    }
}

fn function_entry(function: &FunctionDescriptor, project_root: &Path, defaults: &BuildDefaults) -> Mapping {
    let mut entry = match function.metadata.to_yaml() {
        Some(Value::Mapping(map)) => map,
        _ => Mapping::new(),
    };
    let rel = relative_path(&function.source_path, project_root);

    entry.insert(Value::from("Type"), Value::from(FUNCTION_TYPE));
    let mut metadata = take_mapping(&mut entry, "Metadata", Mapping::new);
    let mut properties = take_mapping(&mut entry, "Properties", || {
        let mut props = Mapping::new();
        props.insert(Value::from("Events"), Value::Mapping(Mapping::new()));
        props
    });
    let mut build = take_mapping(&mut metadata, "BuildProperties", Mapping::new);

    metadata.insert(Value::from("BuildMethod"), Value::from(BUILD_METHOD));
    build.insert(Value::from("EntryPoints"), Value::Sequence(vec![Value::from(rel.as_str())]));
    properties.insert(Value::from("Handler"), Value::from(handler_path(&rel, &function.handler_export)));

    fill_falsy(&mut build, "Minify", Value::Bool(false));
    fill_falsy(&mut build, "Target", defaults.target.clone());
    fill_falsy(&mut build, "Sourcemap", defaults.sourcemap.clone());

    metadata.insert(Value::from("BuildProperties"), Value::Mapping(build));
    entry.insert(Value::from("Metadata"), Value::Mapping(metadata));
    entry.insert(Value::from("Properties"), Value::Mapping(properties));
    entry
}

/// Pull `key` out as a mapping, leaving a placeholder in its slot so the key
/// keeps its position. Anything but a mapping is replaced by `default()`.
fn take_mapping(map: &mut Mapping, key: &str, default: impl FnOnce() -> Mapping) -> Mapping {
    let slot = map.entry(Value::from(key)).or_insert(Value::Null);
    match mem::replace(slot, Value::Null) {
        Value::Mapping(inner) => inner,
        _ => default(),
    }
}

fn fill_falsy(map: &mut Mapping, key: &str, value: Value) {
    if !map.get(key).is_some_and(is_truthy) {
        map.insert(Value::from(key), value);
    }
}

fn is_function(entry: &Value) -> bool {
    entry.get("Type").and_then(Value::as_str) == Some(FUNCTION_TYPE)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(_) => true,
    }
}

/// `/root/src/fn.ts` under `/root` → `src/fn.ts`, always `/`-separated.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `src/fn.ts` + `handler` → `src/fn.handler`.
pub fn handler_path(rel: &str, export: &str) -> String {
    match rel.strip_suffix("ts") {
        Some(stem) => format!("{stem}{export}"),
        None => rel.to_string(),
    }
}
